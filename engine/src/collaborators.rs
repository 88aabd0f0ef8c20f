//! City simulator clients
//!
//! The Cultural Evolution Simulator, Community Cohesion Network and
//! Cartographer of Light are reached over HTTP with JSON payloads. Every
//! failure (not connected, network error, timeout, non-200, unexpected
//! shape) surfaces as [`IdeationError::CollaboratorUnavailable`]; the engine
//! degrades those to "no data".

use crate::config::CollaboratorsConfig;
use crate::errors::{IdeationError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const CULTURAL_EVOLUTION_SIMULATOR: &str = "Cultural Evolution Simulator";
pub const COMMUNITY_COHESION_NETWORK: &str = "Community Cohesion Network";
pub const CARTOGRAPHER_OF_LIGHT: &str = "Cartographer of Light";

// ─────────────────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────────────────

/// `GET {cartographer}/layout`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLayout {
    pub areas: Vec<String>,
}

/// `POST {simulator}/assess_impact`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalImpact {
    pub impact_score: f64,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl CulturalImpact {
    /// Details as display text; strings are shown without quotes
    pub fn details_text(&self) -> String {
        match &self.details {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// `POST {network}/get_feedback`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityFeedback {
    pub feedback_score: f64,
    #[serde(default)]
    pub concerns: Vec<String>,
}

/// `POST {cartographer}/analyze_spatial_impact`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialImpact {
    pub impact_score: f64,
    #[serde(default)]
    pub affected_areas: Vec<String>,
}

#[derive(Debug, Serialize)]
struct IdeaSubmission<'a> {
    idea: &'a str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client trait
// ─────────────────────────────────────────────────────────────────────────────

/// Access to the three city simulators
#[async_trait]
pub trait CityLightClient: Send + Sync {
    /// `GET {simulator}/trends`
    async fn cultural_trends(&self) -> Result<Vec<String>>;

    /// `GET {network}/needs`
    async fn community_needs(&self) -> Result<Vec<String>>;

    /// `GET {cartographer}/layout`
    async fn city_layout(&self) -> Result<CityLayout>;

    async fn assess_cultural_impact(&self, idea: &str) -> Result<CulturalImpact>;

    async fn community_feedback(&self, idea: &str) -> Result<CommunityFeedback>;

    async fn spatial_impact(&self, idea: &str) -> Result<SpatialImpact>;
}

/// reqwest-backed [`CityLightClient`]
#[derive(Debug, Clone)]
pub struct HttpCityLightClient {
    client: reqwest::Client,
    cultural_evolution: Option<String>,
    community_cohesion: Option<String>,
    cartographer: Option<String>,
}

impl HttpCityLightClient {
    /// Build a client with the configured endpoints and per-request timeout
    pub fn new(cfg: &CollaboratorsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.call_timeout())
            .build()
            .map_err(|e| IdeationError::config_with_source("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            cultural_evolution: cfg.cultural_evolution_url.clone(),
            community_cohesion: cfg.community_cohesion_url.clone(),
            cartographer: cfg.cartographer_url.clone(),
        })
    }

    pub fn connect_to_cultural_evolution_simulator(&mut self, endpoint: impl Into<String>) {
        self.cultural_evolution = Some(endpoint.into());
    }

    pub fn connect_to_community_cohesion_network(&mut self, endpoint: impl Into<String>) {
        self.community_cohesion = Some(endpoint.into());
    }

    pub fn connect_to_cartographer_of_light(&mut self, endpoint: impl Into<String>) {
        self.cartographer = Some(endpoint.into());
    }

    /// Whether all three simulators have an endpoint
    pub fn fully_connected(&self) -> bool {
        self.cultural_evolution.is_some()
            && self.community_cohesion.is_some()
            && self.cartographer.is_some()
    }

    fn endpoint(name: &'static str, base: Option<&String>, path: &str) -> Result<String> {
        let base = base.ok_or_else(|| IdeationError::collaborator(name, "not connected"))?;
        Ok(format!("{}/{path}", base.trim_end_matches('/')))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        name: &'static str,
        base: Option<&String>,
        path: &str,
    ) -> Result<T> {
        let url = Self::endpoint(name, base, path)?;
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                IdeationError::collaborator_with_source(name, format!("GET {url} failed"), e)
            })?;
        Self::decode(name, &url, response).await
    }

    async fn post_idea<T: DeserializeOwned>(
        &self,
        name: &'static str,
        base: Option<&String>,
        path: &str,
        idea: &str,
    ) -> Result<T> {
        let url = Self::endpoint(name, base, path)?;
        let response = self
            .client
            .post(&url)
            .json(&IdeaSubmission { idea })
            .send()
            .await
            .map_err(|e| {
                IdeationError::collaborator_with_source(name, format!("POST {url} failed"), e)
            })?;
        Self::decode(name, &url, response).await
    }

    async fn decode<T: DeserializeOwned>(
        name: &'static str,
        url: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(IdeationError::collaborator(
                name,
                format!("{url} returned HTTP {}", status.as_u16()),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            IdeationError::collaborator_with_source(
                name,
                format!("unexpected payload from {url}"),
                e,
            )
        })
    }
}

#[async_trait]
impl CityLightClient for HttpCityLightClient {
    async fn cultural_trends(&self) -> Result<Vec<String>> {
        self.get_json(
            CULTURAL_EVOLUTION_SIMULATOR,
            self.cultural_evolution.as_ref(),
            "trends",
        )
        .await
    }

    async fn community_needs(&self) -> Result<Vec<String>> {
        self.get_json(
            COMMUNITY_COHESION_NETWORK,
            self.community_cohesion.as_ref(),
            "needs",
        )
        .await
    }

    async fn city_layout(&self) -> Result<CityLayout> {
        self.get_json(CARTOGRAPHER_OF_LIGHT, self.cartographer.as_ref(), "layout")
            .await
    }

    async fn assess_cultural_impact(&self, idea: &str) -> Result<CulturalImpact> {
        self.post_idea(
            CULTURAL_EVOLUTION_SIMULATOR,
            self.cultural_evolution.as_ref(),
            "assess_impact",
            idea,
        )
        .await
    }

    async fn community_feedback(&self, idea: &str) -> Result<CommunityFeedback> {
        self.post_idea(
            COMMUNITY_COHESION_NETWORK,
            self.community_cohesion.as_ref(),
            "get_feedback",
            idea,
        )
        .await
    }

    async fn spatial_impact(&self, idea: &str) -> Result<SpatialImpact> {
        self.post_idea(
            CARTOGRAPHER_OF_LIGHT,
            self.cartographer.as_ref(),
            "analyze_spatial_impact",
            idea,
        )
        .await
    }
}

/// Log a collaborator failure and turn it into "no data"
pub fn degrade<T>(operation: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.category().recoverable() => {
            tracing::warn!(
                operation,
                category = e.category().as_str(),
                error = %e,
                "Collaborator unavailable, continuing without data"
            );
            None
        }
        Err(e) => {
            tracing::error!(operation, error = %e, "Collaborator call failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconnected_client_is_unavailable() {
        let client = HttpCityLightClient::new(&CollaboratorsConfig::default()).expect("client");
        assert!(!client.fully_connected());

        let err = client.cultural_trends().await.expect_err("not connected");
        assert!(matches!(
            err,
            IdeationError::CollaboratorUnavailable {
                collaborator: CULTURAL_EVOLUTION_SIMULATOR,
                ..
            }
        ));
        assert!(err.category().recoverable());
    }

    #[test]
    fn test_connect_sets_endpoints() {
        let mut client = HttpCityLightClient::new(&CollaboratorsConfig::default()).expect("client");
        client.connect_to_cultural_evolution_simulator("http://cultural-evolution-simulator.com");
        client.connect_to_community_cohesion_network("http://community-cohesion-network.com");
        client.connect_to_cartographer_of_light("http://cartographer-of-light.com/");
        assert!(client.fully_connected());
        let layout = HttpCityLightClient::endpoint(
            CARTOGRAPHER_OF_LIGHT,
            client.cartographer.as_ref(),
            "layout",
        )
        .expect("endpoint");
        assert_eq!(layout, "http://cartographer-of-light.com/layout");
    }

    #[test]
    fn test_payload_shapes() {
        let impact: CulturalImpact =
            serde_json::from_str(r#"{"impact_score": 0.8, "details": "Strong uptake"}"#)
                .expect("parse");
        assert_eq!(impact.details_text(), "Strong uptake");

        let feedback: CommunityFeedback =
            serde_json::from_str(r#"{"feedback_score": 0.4, "concerns": ["noise", "cost"]}"#)
                .expect("parse");
        assert_eq!(feedback.concerns, vec!["noise", "cost"]);

        let missing = serde_json::from_str::<SpatialImpact>(r#"{"affected_areas": []}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_degrade() {
        assert_eq!(degrade("trends", Ok(3)), Some(3));
        let err: Result<i32> = Err(IdeationError::collaborator(CARTOGRAPHER_OF_LIGHT, "HTTP 500"));
        assert_eq!(degrade("layout", err), None);
    }
}
