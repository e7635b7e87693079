//! HTTP front end: the research form and the download routes.

use crate::error::{Error, Result};
use crate::export::ExportFormat;
use crate::report::Report;
use crate::research::Researcher;
use crate::session::{SessionId, SessionStore};
use axum::{
    Form, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "dossier_session";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    researcher: Researcher,
    sessions: SessionStore,
    export_dir: PathBuf,
}

impl AppState {
    pub fn new(
        researcher: Researcher,
        sessions: SessionStore,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            researcher,
            sessions,
            export_dir: export_dir.into(),
        }
    }
}

#[derive(Deserialize)]
struct ResearchForm {
    #[serde(default)]
    company: String,
}

/// Create the application routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(research))
        .route("/download/pdf", get(download_pdf))
        .route("/download/csv", get(download_csv))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
///
/// Expired sessions are swept once per session lifetime in the background.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(sessions.ttl().max(Duration::from_secs(1)));
        loop {
            ticks.tick().await;
            let evicted = sessions.sweep();
            if evicted > 0 {
                tracing::debug!(evicted, "swept expired sessions");
            }
        }
    });

    axum::serve(listener, router(state)).await
}

/// GET / - the form plus any report stored for this session
async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let report = session_from(&headers).and_then(|s| state.sessions.get(&s));
    Html(render_page(report.as_ref()))
}

/// POST / - research the submitted company and store the report
async fn research(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ResearchForm>,
) -> Response {
    let session = session_from(&headers);
    let subject = form.company.trim();

    if subject.is_empty() {
        let report = session.and_then(|s| state.sessions.get(&s));
        return Html(render_page(report.as_ref())).into_response();
    }

    let session = session.unwrap_or_default();
    tracing::info!(%subject, %session, "researching");
    let report = state.researcher.assemble(subject).await;
    state.sessions.set(&session, report.clone());

    let cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        session,
        state.sessions.ttl().as_secs()
    );
    (
        [(header::SET_COOKIE, cookie)],
        Html(render_page(Some(&report))),
    )
        .into_response()
}

/// GET /download/pdf
async fn download_pdf(State(state): State<AppState>, headers: HeaderMap) -> Response {
    download(state, headers, ExportFormat::Pdf).await
}

/// GET /download/csv
async fn download_csv(State(state): State<AppState>, headers: HeaderMap) -> Response {
    download(state, headers, ExportFormat::Csv).await
}

/// Export into a private temporary directory under the export root and
/// answer with the file's bytes. The directory is removed before returning.
async fn download(state: AppState, headers: HeaderMap, format: ExportFormat) -> Response {
    let report = session_from(&headers).and_then(|s| state.sessions.get(&s));
    let export_dir = state.export_dir.clone();

    let exported = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let report = report.ok_or(Error::NoData)?;
        std::fs::create_dir_all(&export_dir)?;
        let dir = tempfile::Builder::new()
            .prefix("export-")
            .tempdir_in(&export_dir)?;
        let path = format.export(Some(&report), dir.path())?;
        let bytes = std::fs::read(&path)?;
        dir.close()?;
        Ok(bytes)
    })
    .await;

    match exported {
        Ok(Ok(bytes)) => (
            [
                (header::CONTENT_TYPE, format.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", format.file_name()),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(Error::NoData)) => {
            (StatusCode::BAD_REQUEST, Error::NoData.to_string()).into_response()
        }
        Ok(Err(e)) => internal_error(&e),
        Err(e) => internal_error(&e),
    }
}

fn internal_error(err: &dyn std::fmt::Display) -> Response {
    tracing::error!(error = %err, "export failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Export failed.").into_response()
}

/// The session named by the request's cookie, if it is well-formed.
fn session_from(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value))
}

// =============================================================================
// Rendering
// =============================================================================

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Company Research</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; line-height: 1.5; }
section { margin-top: 1.5rem; }
.muted { color: #666; font-size: 0.9rem; }
</style>
</head>
<body>
<h1>Company Research</h1>
<form method="post" action="/">
<input type="text" name="company" placeholder="Company name" required>
<button type="submit">Research</button>
</form>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

fn render_page(report: Option<&Report>) -> String {
    let mut page = String::from(PAGE_HEAD);
    if let Some(report) = report {
        page.push_str(&render_report(report));
    }
    page.push_str(PAGE_TAIL);
    page
}

fn render_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&format!("<h2>{}</h2>\n", escape(&report.subject)));

    out.push_str("<section>\n<h3>Summary</h3>\n");
    out.push_str(&format!("<p>{}</p>\n", escape(&report.summary)));
    if let Some(url) = report.source_url.as_deref() {
        out.push_str(&format!("<p class=\"muted\">Source: {}</p>\n", link(url, url)));
    }
    out.push_str("</section>\n");

    out.push_str("<section>\n<h3>Recent News</h3>\n");
    if report.news.is_empty() {
        out.push_str("<p>No recent news found.</p>\n");
    } else {
        out.push_str("<ul>\n");
        for article in &report.news {
            out.push_str(&format!(
                "<li>{} <span class=\"muted\">{} {}</span>",
                link(&article.url, &article.title),
                escape(&article.source.name),
                escape(&article.published_at),
            ));
            if let Some(description) = article.description.as_deref() {
                out.push_str(&format!("<br>{}", escape(description)));
            }
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</section>\n");

    out.push_str("<section>\n<h3>LinkedIn</h3>\n");
    out.push_str(&format!("<p>{}</p>\n", link(&report.linkedin, &report.linkedin)));
    out.push_str("</section>\n");

    out.push_str("<section>\n<h3>Future Plans</h3>\n");
    out.push_str(&format!("<p>{}</p>\n", escape(&report.future_plans)));
    out.push_str("</section>\n");

    out.push_str(
        "<section>\n<a href=\"/download/pdf\">Download PDF</a> | \
         <a href=\"/download/csv\">Download CSV</a>\n</section>\n",
    );
    out
}

/// An anchor for http(s) URLs; anything else renders as plain text.
fn link(url: &str, text: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            escape(url),
            escape(text)
        )
    } else {
        escape(text)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{CSV_FILE, PDF_FILE};
    use crate::report::{NO_SUMMARY, NewsArticle, SummaryResult};
    use crate::research::ResearchConfig;
    use crate::sources::{
        CompletionService, KnowledgeService, NewsService, PageFetcher, WebSearch,
    };
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    /// Every external service is unreachable.
    struct Down;

    impl KnowledgeService for Down {
        fn summary(&self, subject: &str, _: usize) -> Result<SummaryResult> {
            Err(Error::NotFound(subject.to_string()))
        }
    }

    impl NewsService for Down {
        fn articles(&self, _: &str, _: usize) -> Result<Vec<NewsArticle>> {
            Err(Error::Status(503))
        }
    }

    impl WebSearch for Down {
        fn search(&self, _: &str, _: usize) -> Result<Vec<String>> {
            Err(Error::Status(503))
        }
    }

    impl PageFetcher for Down {
        fn fetch(&self, _: &str) -> Result<String> {
            Err(Error::Status(503))
        }
    }

    impl CompletionService for Down {
        fn complete(&self, _: &str, _: u32) -> Result<String> {
            Err(Error::Status(503))
        }
    }

    fn app(export_dir: &std::path::Path) -> (Router, SessionStore) {
        let researcher = Researcher::new(ResearchConfig::new())
            .knowledge(Down)
            .news(Down)
            .search(Down)
            .fetcher(Down)
            .completion(Down);
        let sessions = SessionStore::new();
        let state = AppState::new(researcher, sessions.clone(), export_dir);
        (router(state), sessions)
    }

    async fn body_string(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn post_company(company: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("company={}", company)))
            .unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_download_without_report_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());

        for uri in ["/download/pdf", "/download/csv"] {
            let resp = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_string(resp).await, "No data available to download.");
        }

        assert!(!dir.path().join(CSV_FILE).exists());
        assert!(!dir.path().join(PDF_FILE).exists());
    }

    #[tokio::test]
    async fn test_unknown_session_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path());
        let cookie = format!("{}={}", SESSION_COOKIE, SessionId::new());

        let resp = app.oneshot(get("/download/csv", Some(&cookie))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_research_then_download() {
        let dir = tempfile::tempdir().unwrap();
        let (app, sessions) = app(dir.path());

        let resp = app.clone().oneshot(post_company("Acme+Corp")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let page = body_string(resp).await;
        assert!(page.contains("Acme Corp"));
        assert!(page.contains(NO_SUMMARY));
        assert_eq!(sessions.len(), 1);

        let resp = app.clone().oneshot(get("/download/csv", Some(&cookie))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"report.csv\""
        );
        let csv = body_string(resp).await;
        assert!(csv.starts_with("summary,url,news,linkedin,future_plans"));
        assert!(csv.contains("Could not perform future plans search."));

        let resp = app.clone().oneshot(get("/download/pdf", Some(&cookie))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");

        let resp = app.oneshot(get("/", Some(&cookie))).await.unwrap();
        assert!(body_string(resp).await.contains("Acme Corp"));

        // Nothing is left behind in the export root.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_session_cookie_expires_with_store() {
        let dir = tempfile::tempdir().unwrap();
        let (app, sessions) = app(dir.path());

        let resp = app.oneshot(post_company("Acme")).await.unwrap();
        let set_cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains(&format!("Max-Age={}", sessions.ttl().as_secs())));
        assert!(set_cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_expired_session_cannot_download() {
        let dir = tempfile::tempdir().unwrap();
        let researcher = Researcher::new(ResearchConfig::new())
            .knowledge(Down)
            .news(Down)
            .search(Down)
            .fetcher(Down)
            .completion(Down);
        let sessions = SessionStore::with_ttl(std::time::Duration::ZERO);
        let app = router(AppState::new(researcher, sessions.clone(), dir.path()));

        let resp = app.clone().oneshot(post_company("Acme")).await.unwrap();
        let set_cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        let resp = app.oneshot(get("/download/csv", Some(&cookie))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn test_blank_company_does_not_research() {
        let dir = tempfile::tempdir().unwrap();
        let (app, sessions) = app(dir.path());

        let resp = app.oneshot(post_company("+++")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_session_from_cookie_header() {
        let id = SessionId::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("theme=dark; {}={}", SESSION_COOKIE, id).parse().unwrap(),
        );
        assert_eq!(session_from(&headers), Some(id));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "dossier_session=garbage".parse().unwrap());
        assert_eq!(session_from(&headers), None);
    }

    #[test]
    fn test_render_escapes_and_links() {
        let report = Report::new(
            "<Acme>",
            SummaryResult::not_found(),
            Vec::new(),
            "Not found".to_string(),
            "a & b".to_string(),
        );
        let page = render_page(Some(&report));

        assert!(page.contains("&lt;Acme&gt;"));
        assert!(page.contains("a &amp; b"));
        assert!(page.contains("<p>Not found</p>"));
        assert!(page.contains("No recent news found."));
        assert_eq!(link("javascript:alert(1)", "x"), "x");
    }
}
