//! HTTP client tests against a local mock server
//!
//! Covers the city simulator client and the chat completion client:
//! - Well-formed responses decode into their payload types
//! - Non-200 statuses and unexpected shapes surface as unavailable
//!   collaborators

use ideation_engine::config::{CollaboratorsConfig, LlmConfig};
use ideation_engine::{
    ChatCompletionClient, CityLightClient, CompletionClient, ErrorCategory, HttpCityLightClient,
    IdeationConfig, IdeationEngine, IdeationError,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn connected_client(server: &MockServer) -> HttpCityLightClient {
    let mut client = HttpCityLightClient::new(&CollaboratorsConfig::default()).expect("client");
    client.connect_to_cultural_evolution_simulator(server.uri());
    client.connect_to_community_cohesion_network(server.uri());
    client.connect_to_cartographer_of_light(server.uri());
    client
}

// ─────────────────────────────────────────────────────────────────────────────
// City simulators
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetches_trends_needs_and_layout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["open data", "festivals"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/needs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["transit"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/layout"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"areas": ["harbor", "old town"]})),
        )
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    assert_eq!(
        client.cultural_trends().await.expect("trends"),
        vec!["open data", "festivals"]
    );
    assert_eq!(client.community_needs().await.expect("needs"), vec!["transit"]);
    assert_eq!(
        client.city_layout().await.expect("layout").areas,
        vec!["harbor", "old town"]
    );
}

#[tokio::test]
async fn submits_idea_for_assessment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assess_impact"))
        .and(body_json(json!({"idea": "Solar canopies"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"impact_score": 0.9, "details": {"support": "high"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze_spatial_impact"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"impact_score": 0.3, "affected_areas": ["harbor"]})),
        )
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let impact = client
        .assess_cultural_impact("Solar canopies")
        .await
        .expect("impact");
    assert_eq!(impact.impact_score, 0.9);
    assert_eq!(impact.details_text(), r#"{"support":"high"}"#);

    let spatial = client.spatial_impact("Solar canopies").await.expect("spatial");
    assert_eq!(spatial.affected_areas, vec!["harbor"]);
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/needs"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let err = client.community_needs().await.expect_err("500 should fail");
    assert!(matches!(err, IdeationError::CollaboratorUnavailable { .. }));
    assert_eq!(err.category(), ErrorCategory::ExternalCollaboratorUnavailable);
    assert!(err.to_string().contains("HTTP 500"));
}

#[tokio::test]
async fn unexpected_shape_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/layout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"regions": ["harbor"]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/get_feedback"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = connected_client(&server).await;
    let err = client.city_layout().await.expect_err("missing areas");
    assert!(err.category().recoverable());
    let err = client.community_feedback("idea").await.expect_err("not json");
    assert!(err.category().recoverable());
}

#[tokio::test]
async fn engine_degrades_against_partial_outage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trends"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["open data"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/needs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["transit"])))
        .mount(&server)
        .await;
    // No /layout mock: wiremock answers 404

    let cfg = IdeationConfig {
        seed: Some(3),
        ..IdeationConfig::default()
    };
    let mut engine = IdeationEngine::in_memory(cfg).expect("engine");
    engine.connect_to_cultural_evolution_simulator(server.uri());
    engine.connect_to_community_cohesion_network(server.uri());
    engine.connect_to_cartographer_of_light(server.uri());

    let client = engine.collaborators().clone();
    let ideas = engine.generate_integrated_ideas(&client).await.expect("ideas");
    assert!(ideas.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat completions
// ─────────────────────────────────────────────────────────────────────────────

fn llm_config(server: &MockServer) -> LlmConfig {
    LlmConfig {
        base_url: format!("{}/v1", server.uri()),
        ..LlmConfig::default()
    }
}

#[tokio::test]
async fn completion_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "An analysis"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatCompletionClient::with_api_key(&llm_config(&server), Some("test-key".into()))
        .expect("client");
    let content = client.complete("system", "user").await.expect("completion");
    assert_eq!(content, "An analysis");
}

#[tokio::test]
async fn empty_completion_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::with_api_key(&llm_config(&server), None).expect("client");
    let err = client.complete("system", "user").await.expect_err("empty");
    assert!(err.to_string().contains("empty response"));
}

#[tokio::test]
async fn rate_limited_completion_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = ChatCompletionClient::with_api_key(&llm_config(&server), None).expect("client");
    let err = client.complete("system", "user").await.expect_err("429");
    assert!(err.to_string().contains("HTTP 429 - slow down"));
}
