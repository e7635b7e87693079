use clap::Parser;
use dossier::web::{self, AppState};
use dossier::{ResearchConfig, Researcher, SessionStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Company research web form.
#[derive(Parser, Debug)]
#[command(name = "dossier", version, about)]
struct Cli {
    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    news_api_key: Option<String>,

    /// OpenAI key
    #[arg(long, env = "OPENAI_KEY", hide_env_values = true)]
    openai_key: Option<String>,

    /// Completion model
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
    model: String,

    /// Address to listen on
    #[arg(long, env = "DOSSIER_BIND", default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Directory exports are written to (defaults to the system temp dir)
    #[arg(long, env = "DOSSIER_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Seconds a session's report is kept
    #[arg(long, env = "DOSSIER_SESSION_TTL", default_value_t = 3600)]
    session_ttl: u64,

    /// User-Agent sent to the outbound services
    #[arg(long, env = "DOSSIER_USER_AGENT")]
    user_agent: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dossier=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dossier=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Keys may also come from a .env file in the working directory.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let mut config = ResearchConfig::new().model(cli.model);
    if let Some(user_agent) = cli.user_agent {
        config = config.user_agent(user_agent);
    }
    config.news_api_key = cli.news_api_key;
    config.openai_api_key = cli.openai_key;

    if config.news_api_key.is_none() {
        tracing::warn!("NEWSAPI_KEY not set; news lookups will return nothing");
    }
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_KEY not set; future plans will not be summarized");
    }

    let export_dir = cli
        .export_dir
        .unwrap_or_else(|| std::env::temp_dir().join("dossier"));
    std::fs::create_dir_all(&export_dir)?;

    let sessions = SessionStore::with_ttl(Duration::from_secs(cli.session_ttl));
    let state = AppState::new(Researcher::new(config), sessions, export_dir);
    web::serve(cli.bind, state).await?;
    Ok(())
}
