//! Research coordinator
//!
//! Downloads the paper named in the configured URL file, extracts its text,
//! asks the completion client for a literature content analysis and then for
//! a community post, and writes the post as markdown.

use crate::config::ResearchConfig;
use crate::errors::{IdeationError, Result};
use crate::llm::CompletionClient;
use crate::specification::safe_filename;
use std::path::PathBuf;
use std::time::Duration;

const PAPER_SOURCE: &str = "Paper source";

/// Characters of extracted text echoed into the debug log
const LOG_PREVIEW_CHARS: usize = 500;

const ANALYST_SYSTEM_PROMPT: &str = "You are an AI research analyst specializing in conducting thorough Literature Content Analysis of complex AI papers.";

const WRITER_SYSTEM_PROMPT: &str = "You are an AI research communicator specializing in creating engaging posts about AI research for online communities.";

/// User prompt asking for a literature content analysis of the paper at `url`
pub fn analysis_prompt(url: &str, text: &str) -> String {
    format!(
        r#"Perform a detailed Literature Content Analysis (LCA) of the following research paper from {url}.
Focus on:
1. Key findings and their significance
2. Methodologies used and their appropriateness
3. Theoretical framework and its application
4. Data collection and analysis techniques
5. Limitations of the study
6. Implications for AI development, especially in the context of autonomous systems
7. Novel approaches or breakthroughs introduced

Provide a comprehensive and critical analysis, highlighting strengths and potential areas for further research.

Paper content:
{text}"#
    )
}

/// User prompt turning an analysis into a community post
pub fn post_prompt(url: &str, analysis: &str) -> String {
    format!(
        r#"Based on the following detailed analysis of a research paper, create an engaging and informative post for the r/autonomousAIs community. The post should:

1. Start with a catchy title that summarizes the key finding or implication of the paper
2. Provide a brief introduction that sets the context for the research
3. Summarize the main points of the analysis in a way that's accessible to a general audience interested in AI
4. Highlight the implications for autonomous AI systems
5. Include thought-provoking questions or points for discussion
6. End with a call-to-action for community engagement

Make the post engaging, informative, and tailored to the interests of the r/autonomousAIs community. Use markdown formatting for better readability.

Analysis:
{analysis}

Paper URL: {url}"#
    )
}

/// File name for the post about `url`: its last path segment, sanitized
pub fn post_filename(url: &str) -> String {
    let segment = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let name = safe_filename(segment);
    if name.is_empty() {
        "post.md".to_string()
    } else {
        format!("{name}.md")
    }
}

pub struct ResearchCoordinator<C> {
    http: reqwest::Client,
    completions: C,
    url_file: PathBuf,
    posts_dir: PathBuf,
}

impl<C: CompletionClient> ResearchCoordinator<C> {
    pub fn new(cfg: &ResearchConfig, download_timeout: Duration, completions: C) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(download_timeout)
            .build()
            .map_err(|e| IdeationError::config_with_source("failed to build HTTP client", e))?;

        Ok(Self {
            http,
            completions,
            url_file: PathBuf::from(&cfg.url_file),
            posts_dir: PathBuf::from(&cfg.posts_dir),
        })
    }

    /// Run the whole pipeline; any failure is logged and yields `None`
    pub async fn process_paper(&self) -> Option<String> {
        match self.try_process_paper().await {
            Ok(post) => {
                tracing::info!("Paper processing completed");
                Some(post)
            }
            Err(e) => {
                tracing::error!(
                    category = e.category().as_str(),
                    error = %e,
                    "Error processing paper"
                );
                None
            }
        }
    }

    pub async fn try_process_paper(&self) -> Result<String> {
        let url = self.read_url()?;
        tracing::info!(url = %url, "Processing paper");

        let pdf = self.download_pdf(&url).await?;
        let text = extract_text_blocking(pdf).await?;
        let analysis = self.analyze_paper(&text, &url).await?;
        let post = self.create_post(&url, &analysis).await?;
        self.write_post(&url, &post)?;
        Ok(post)
    }

    /// First non-empty line of the URL file
    pub fn read_url(&self) -> Result<String> {
        let contents = std::fs::read_to_string(&self.url_file).map_err(|e| {
            IdeationError::config_with_source(
                format!("failed to read paper URL from {}", self.url_file.display()),
                e,
            )
        })?;

        contents
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| {
                IdeationError::config(format!("no paper URL in {}", self.url_file.display()))
            })
    }

    pub async fn download_pdf(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await.map_err(|e| {
            IdeationError::collaborator_with_source(PAPER_SOURCE, format!("GET {url} failed"), e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdeationError::collaborator(
                PAPER_SOURCE,
                format!("{url} returned HTTP {}", status.as_u16()),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| {
            IdeationError::collaborator_with_source(PAPER_SOURCE, "failed to read paper body", e)
        })?;
        Ok(bytes.to_vec())
    }

    pub async fn analyze_paper(&self, text: &str, url: &str) -> Result<String> {
        let preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
        tracing::debug!(url, preview = %preview, "Analyzer input");

        let analysis = self
            .completions
            .complete(ANALYST_SYSTEM_PROMPT, &analysis_prompt(url, text))
            .await?;

        tracing::debug!(chars = analysis.len(), "Analyzer output");
        Ok(analysis)
    }

    pub async fn create_post(&self, url: &str, analysis: &str) -> Result<String> {
        let post = self
            .completions
            .complete(WRITER_SYSTEM_PROMPT, &post_prompt(url, analysis))
            .await?;

        tracing::debug!(chars = post.len(), "Post writer output");
        Ok(post)
    }

    /// Write `post` under the posts directory; returns the file path
    pub fn write_post(&self, url: &str, post: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.posts_dir).map_err(|e| {
            IdeationError::export_with_source(
                format!("failed to create posts directory: {}", self.posts_dir.display()),
                e,
            )
        })?;

        let path = self.posts_dir.join(post_filename(url));
        std::fs::write(&path, post).map_err(|e| {
            IdeationError::export_with_source(
                format!("failed to write post to {}", path.display()),
                e,
            )
        })?;

        tracing::info!(path = %path.display(), "Wrote community post");
        Ok(path)
    }
}

/// Concatenated text of every page
pub fn extract_text(pdf: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(pdf).map_err(|e| {
        IdeationError::collaborator(PAPER_SOURCE, format!("failed to extract PDF text: {e}"))
    })
}

/// [`extract_text`] on the blocking pool; parsing large papers is CPU-bound
pub async fn extract_text_blocking(pdf: Vec<u8>) -> Result<String> {
    tokio::task::spawn_blocking(move || extract_text(&pdf))
        .await
        .map_err(|e| IdeationError::internal(format!("PDF extraction task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_filename() {
        assert_eq!(post_filename("https://arxiv.org/pdf/2401.00001v2"), "240100001v2.md");
        assert_eq!(post_filename("https://example.com/papers/agents/"), "agents.md");
        assert_eq!(post_filename("https://example.com/???"), "post.md");
    }

    #[test]
    fn test_prompts_carry_inputs() {
        let analysis = analysis_prompt("https://example.com/p.pdf", "BODY TEXT");
        assert!(analysis.contains("research paper from https://example.com/p.pdf."));
        assert!(analysis.ends_with("Paper content:\nBODY TEXT"));

        let post = post_prompt("https://example.com/p.pdf", "ANALYSIS");
        assert!(post.contains("Analysis:\nANALYSIS"));
        assert!(post.ends_with("Paper URL: https://example.com/p.pdf"));
    }

    #[test]
    fn test_extract_rejects_non_pdf() {
        let err = extract_text(b"definitely not a pdf").expect_err("should fail");
        assert!(err.category().recoverable());
    }

    #[tokio::test]
    async fn test_blocking_extract_keeps_error_category() {
        let err = extract_text_blocking(b"<html>not a pdf</html>".to_vec())
            .await
            .expect_err("should fail");
        assert!(matches!(err, IdeationError::CollaboratorUnavailable { .. }));
        assert!(err.to_string().contains("failed to extract PDF text"));
    }
}
