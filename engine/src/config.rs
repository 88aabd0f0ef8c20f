//! Ideation engine configuration loading
//!
//! Loads configuration from `~/.config/ideation/ideation.toml` (or `IDEATION_CONFIG` env).
//! Every field has a default, so an absent file yields a working engine.

use crate::errors::{IdeationError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration for the ideation engine
#[derive(Debug, Deserialize, Clone)]
pub struct IdeationConfig {
    /// Path to the knowledge base SQLite database
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Directory receiving exported specifications
    #[serde(default = "default_specs_dir")]
    pub specs_dir: String,

    /// Fixed RNG seed; unseeded (OS entropy) when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Idea generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Feedback refinement settings
    #[serde(default)]
    pub refinement: RefinementConfig,

    /// Ethical review settings
    #[serde(default)]
    pub review: ReviewConfig,

    /// Synergy query settings
    #[serde(default)]
    pub synergy: SynergyConfig,

    /// City simulator endpoints
    #[serde(default)]
    pub collaborators: CollaboratorsConfig,

    /// Chat completion API settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Continuous-improvement advisor settings
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Research coordinator settings
    #[serde(default)]
    pub research: ResearchConfig,
}

fn default_db_path() -> String {
    "knowledge_base.db".to_string()
}

fn default_specs_dir() -> String {
    "specs".to_string()
}

/// Idea generation configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Ideas produced per cycle
    #[serde(default = "default_ideas_per_cycle")]
    pub ideas_per_cycle: usize,

    /// Fresh ideas listed in the engine report
    #[serde(default = "default_report_ideas")]
    pub report_ideas: usize,
}

fn default_ideas_per_cycle() -> usize {
    5
}

fn default_report_ideas() -> usize {
    3
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            ideas_per_cycle: default_ideas_per_cycle(),
            report_ideas: default_report_ideas(),
        }
    }
}

/// Feedback refinement configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RefinementConfig {
    /// Panel feedback rounds per refinement
    #[serde(default = "default_rounds")]
    pub rounds: usize,
}

fn default_rounds() -> usize {
    3
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
        }
    }
}

/// Ethical review configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReviewConfig {
    /// Ethical score a concept must strictly exceed to be approved
    #[serde(default = "default_approval_threshold")]
    pub approval_threshold: f64,
}

fn default_approval_threshold() -> f64 {
    0.7
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            approval_threshold: default_approval_threshold(),
        }
    }
}

/// Synergy query configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SynergyConfig {
    /// Maximum synergy pairs returned
    #[serde(default = "default_synergy_limit")]
    pub limit: usize,

    /// Synergy pairs listed in the engine report
    #[serde(default = "default_report_synergies")]
    pub report_limit: usize,
}

fn default_synergy_limit() -> usize {
    10
}

fn default_report_synergies() -> usize {
    5
}

impl Default for SynergyConfig {
    fn default() -> Self {
        Self {
            limit: default_synergy_limit(),
            report_limit: default_report_synergies(),
        }
    }
}

/// City simulator endpoints; an absent URL means "not connected"
#[derive(Debug, Deserialize, Clone)]
pub struct CollaboratorsConfig {
    /// Cultural Evolution Simulator base URL
    #[serde(default)]
    pub cultural_evolution_url: Option<String>,

    /// Community Cohesion Network base URL
    #[serde(default)]
    pub community_cohesion_url: Option<String>,

    /// Cartographer of Light base URL
    #[serde(default)]
    pub cartographer_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_collaborator_timeout_secs")]
    pub call_timeout_secs: u64,
}

fn default_collaborator_timeout_secs() -> u64 {
    10
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            cultural_evolution_url: None,
            community_cohesion_url: None,
            cartographer_url: None,
            call_timeout_secs: default_collaborator_timeout_secs(),
        }
    }
}

impl CollaboratorsConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// Chat completion API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub call_timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_llm_model() -> String {
    "gpt-4".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            call_timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Continuous-improvement advisor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AdvisorConfig {
    /// Starting adaptive step size
    #[serde(default = "default_initial_step_size")]
    pub initial_step_size: f64,

    /// Ideas generated per clustering batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Number of k-means clusters
    #[serde(default = "default_clusters")]
    pub clusters: usize,

    /// Ideas folded into the concept vocabulary per cycle
    #[serde(default = "default_vocabulary_growth")]
    pub vocabulary_growth: usize,

    /// Vocabulary size above which least-used concepts are pruned
    #[serde(default = "default_max_vocabulary")]
    pub max_vocabulary: usize,

    /// Concepts removed per prune
    #[serde(default = "default_prune_count")]
    pub prune_count: usize,
}

fn default_initial_step_size() -> f64 {
    0.1
}
fn default_batch_size() -> usize {
    10
}
fn default_clusters() -> usize {
    3
}
fn default_vocabulary_growth() -> usize {
    5
}
fn default_max_vocabulary() -> usize {
    100
}
fn default_prune_count() -> usize {
    5
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            initial_step_size: default_initial_step_size(),
            batch_size: default_batch_size(),
            clusters: default_clusters(),
            vocabulary_growth: default_vocabulary_growth(),
            max_vocabulary: default_max_vocabulary(),
            prune_count: default_prune_count(),
        }
    }
}

/// Research coordinator configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ResearchConfig {
    /// File holding the paper URL to analyze
    #[serde(default = "default_url_file")]
    pub url_file: String,

    /// Directory receiving drafted community posts
    #[serde(default = "default_posts_dir")]
    pub posts_dir: String,
}

fn default_url_file() -> String {
    "to_analyze.md".to_string()
}
fn default_posts_dir() -> String {
    "posts".to_string()
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            url_file: default_url_file(),
            posts_dir: default_posts_dir(),
        }
    }
}

impl Default for IdeationConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            specs_dir: default_specs_dir(),
            seed: None,
            generation: GenerationConfig::default(),
            refinement: RefinementConfig::default(),
            review: ReviewConfig::default(),
            synergy: SynergyConfig::default(),
            collaborators: CollaboratorsConfig::default(),
            llm: LlmConfig::default(),
            advisor: AdvisorConfig::default(),
            research: ResearchConfig::default(),
        }
    }
}

impl IdeationConfig {
    /// Environment variable for config path override
    pub const ENV_CONFIG_PATH: &'static str = "IDEATION_CONFIG";

    /// Default config filename
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "ideation.toml";

    /// Load configuration from file
    ///
    /// Resolution order:
    /// 1. `IDEATION_CONFIG` environment variable
    /// 2. `~/.config/ideation/ideation.toml`
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::resolve_config_path();

        if !path.exists() {
            tracing::info!(
                path = %path.display(),
                "Ideation config not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            IdeationError::config_with_source(
                format!("failed to read config at {}", path.display()),
                e,
            )
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: IdeationConfig = toml::from_str(contents)
            .map_err(|e| IdeationError::config_with_source("failed to parse config", e))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve the configuration file path
    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("ideation")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.advisor.clusters == 0 {
            return Err(IdeationError::config("advisor.clusters must be at least 1"));
        }

        if self.advisor.initial_step_size <= 0.0 {
            return Err(IdeationError::config(
                "advisor.initial_step_size must be positive",
            ));
        }

        if !(0.0..=1.0).contains(&self.review.approval_threshold) {
            tracing::warn!(
                threshold = self.review.approval_threshold,
                "Approval threshold outside [0, 1]; every review will share one status"
            );
        }

        if self.refinement.rounds != default_rounds() {
            tracing::warn!(
                rounds = self.refinement.rounds,
                "Refinement rounds differ from the standard three"
            );
        }

        Ok(())
    }

    /// Get the resolved database path (expanding ~ if needed)
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_home(&self.db_path)
    }

    /// Get the resolved specs directory (expanding ~ if needed)
    pub fn resolved_specs_dir(&self) -> PathBuf {
        expand_home(&self.specs_dir)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = IdeationConfig::default();
        assert_eq!(cfg.db_path, "knowledge_base.db");
        assert_eq!(cfg.refinement.rounds, 3);
        assert_eq!(cfg.synergy.limit, 10);
        assert_eq!(cfg.review.approval_threshold, 0.7);
        assert!(cfg.seed.is_none());
        assert!(cfg.collaborators.cartographer_url.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            db_path = "/tmp/kb.db"
            seed = 7
        "#;

        let cfg = IdeationConfig::parse(toml).expect("should parse");
        assert_eq!(cfg.db_path, "/tmp/kb.db");
        assert_eq!(cfg.seed, Some(7));
        // Defaults should be applied
        assert_eq!(cfg.advisor.clusters, 3);
        assert_eq!(cfg.llm.model, "gpt-4");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            db_path = "~/.config/ideation/kb.db"
            specs_dir = "out/specs"

            [generation]
            ideas_per_cycle = 8
            report_ideas = 2

            [refinement]
            rounds = 3

            [review]
            approval_threshold = 0.6

            [synergy]
            limit = 20
            report_limit = 3

            [collaborators]
            cultural_evolution_url = "http://cultural-evolution-simulator.com"
            community_cohesion_url = "http://community-cohesion-network.com"
            cartographer_url = "http://cartographer-of-light.com"
            call_timeout_secs = 3

            [llm]
            base_url = "http://localhost:8080/v1"
            model = "local-model"
            api_key_env = "LOCAL_KEY"
            call_timeout_secs = 30

            [advisor]
            initial_step_size = 0.2
            batch_size = 12
            clusters = 4

            [research]
            url_file = "paper.md"
            posts_dir = "drafts"
        "#;

        let cfg = IdeationConfig::parse(toml).expect("should parse");
        assert_eq!(cfg.generation.ideas_per_cycle, 8);
        assert_eq!(cfg.synergy.limit, 20);
        assert_eq!(
            cfg.collaborators.cartographer_url.as_deref(),
            Some("http://cartographer-of-light.com")
        );
        assert_eq!(cfg.collaborators.call_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.llm.model, "local-model");
        assert_eq!(cfg.advisor.clusters, 4);
        assert_eq!(cfg.research.posts_dir, "drafts");
        assert!(cfg.resolved_db_path().ends_with(".config/ideation/kb.db"));
    }

    #[test]
    fn test_zero_clusters_rejected() {
        let toml = r#"
            [advisor]
            clusters = 0
        "#;
        let err = IdeationConfig::parse(toml).expect_err("should reject");
        assert_eq!(err.category(), crate::ErrorCategory::ConfigError);
    }
}
