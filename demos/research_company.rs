//! Research one company from the command line and export the result.
//!
//! Prints page-scrape progress through the researcher's callbacks, then
//! writes report.csv and report.pdf into the current directory.
//!
//! Run with:
//!   NEWSAPI_KEY=your_key OPENAI_KEY=your_key cargo run --example research_company "Acme Corp"

use dossier::{ResearchConfig, ResearchEvent, Researcher, export_csv, export_pdf};
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("dossier=debug"))
        .init();

    let company = env::args().nth(1).unwrap_or_else(|| "Mozilla".to_string());

    let mut config = ResearchConfig::new();
    config.news_api_key = env::var("NEWSAPI_KEY").ok();
    config.openai_api_key = env::var("OPENAI_KEY").ok();

    let researcher = Researcher::new(config)
        .on_page_fetched(|e| {
            if let ResearchEvent::PageFetched { url, chars } = e {
                println!("  scraped {} ({} chars)", url, chars);
            }
        })
        .on_page_failed(|e| {
            if let ResearchEvent::PageFailed { url, message } = e {
                println!("  skipped {}: {}", url, message);
            }
        });

    println!("Researching {}...\n", company);
    let report = researcher.assemble(&company).await;

    println!("═══════════════════════════════════════════════════════════════");
    println!("Summary:      {}", report.summary);
    println!("Source:       {}", report.source_url.as_deref().unwrap_or("-"));
    println!("LinkedIn:     {}", report.linkedin);
    println!("Future plans: {}", report.future_plans);
    println!("News:");
    for article in &report.news {
        println!("  - {} ({})", article.title, article.url);
    }
    println!("═══════════════════════════════════════════════════════════════\n");

    let dir = Path::new(".");
    println!("Wrote {}", export_csv(Some(&report), dir)?.display());
    println!("Wrote {}", export_pdf(Some(&report), dir)?.display());

    Ok(())
}
