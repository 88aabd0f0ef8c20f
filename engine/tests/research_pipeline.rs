//! Research coordinator tests
//!
//! The completion API is mocked; papers are served by a local mock server.

use async_trait::async_trait;
use ideation_engine::config::ResearchConfig;
use ideation_engine::{CompletionClient, ResearchCoordinator, Result};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every prompt and answers with a canned reply
struct MockCompletions {
    prompts: Mutex<Vec<(String, String)>>,
}

impl MockCompletions {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CompletionClient for MockCompletions {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((system.to_string(), user.to_string()));
        }
        Ok(format!("reply #{}", self.calls()))
    }
}

fn coordinator(dir: &Path, url: Option<&str>) -> ResearchCoordinator<MockCompletions> {
    let url_file = dir.join("to_analyze.md");
    if let Some(url) = url {
        std::fs::write(&url_file, format!("\n{url}\n")).expect("write url file");
    }
    let cfg = ResearchConfig {
        url_file: url_file.display().to_string(),
        posts_dir: dir.join("posts").display().to_string(),
    };
    ResearchCoordinator::new(&cfg, Duration::from_secs(5), MockCompletions::new())
        .expect("coordinator")
}

#[test]
fn reads_first_non_empty_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let research = coordinator(dir.path(), Some("https://arxiv.org/pdf/2401.00001"));
    assert_eq!(
        research.read_url().expect("url"),
        "https://arxiv.org/pdf/2401.00001"
    );
}

#[tokio::test]
async fn missing_url_file_yields_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let research = coordinator(dir.path(), None);
    assert!(research.read_url().is_err());
    assert_eq!(research.process_paper().await, None);
}

#[tokio::test]
async fn non_pdf_is_rejected_before_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/papers/2401.00001"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a pdf</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("{}/papers/2401.00001", server.uri());
    let research = coordinator(dir.path(), Some(&url));

    let bytes = research.download_pdf(&url).await.expect("download");
    assert_eq!(bytes, b"<html>not a pdf</html>");

    assert_eq!(research.process_paper().await, None);
    assert!(!dir.path().join("posts").exists());
}

#[tokio::test]
async fn missing_paper_is_an_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let research = coordinator(dir.path(), None);

    let err = research
        .download_pdf(&format!("{}/papers/gone", server.uri()))
        .await
        .expect_err("404");
    assert!(err.category().recoverable());
    assert!(err.to_string().contains("HTTP 404"));
}

#[tokio::test]
async fn analysis_feeds_post_and_post_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let research = coordinator(dir.path(), None);
    let url = "https://arxiv.org/pdf/2401.00001";

    let analysis = research
        .analyze_paper("Agents that plan", url)
        .await
        .expect("analysis");
    let post = research.create_post(url, &analysis).await.expect("post");
    assert_eq!(analysis, "reply #1");
    assert_eq!(post, "reply #2");

    let written = research.write_post(url, &post).expect("write");
    assert_eq!(written, dir.path().join("posts").join("240100001.md"));
    assert_eq!(std::fs::read_to_string(&written).expect("read"), "reply #2");
}
