//! Integration tests for the infrastructure adapters
//!
//! Each adapter talks to a wiremock server standing in for its provider.
//! The last section drives a full conversation turn through all three.

use std::sync::Arc;

use ai_core::InferenceConfig;
use application::{
    ApplicationError, ConversationSession, GeoLocationPort, InferencePort, LlmIntentExtractor,
    LocationResolver, ProviderError, TurnOutcome, WeatherCondition, WeatherDispatcher,
    WeatherPort,
};
use chrono::{NaiveDate, NaiveDateTime};
use domain::{GeoLocation, LocationSource};
use infrastructure::{GeoIpAdapter, OpenAiInferenceAdapter, WeatherAdapter};
use integration_geoip::GeoIpConfig;
use integration_weather::WeatherConfig;
use secrecy::SecretString;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

const WEATHER_KEY: &str = "om-test";
const LLM_KEY: &str = "gsk-test";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monday 2024-06-10, noon
fn now() -> NaiveDateTime {
    date(2024, 6, 10).and_hms_opt(12, 0, 0).unwrap()
}

fn weather_adapter(server: &MockServer) -> WeatherAdapter {
    let config = WeatherConfig {
        base_url: server.uri(),
        archive_url: format!("{}/archive-api", server.uri()),
        geocoding_url: format!("{}/geo", server.uri()),
        timeout_secs: 5,
        ..Default::default()
    };
    WeatherAdapter::new(config, &SecretString::from(WEATHER_KEY)).unwrap()
}

fn geoip_adapter(server: &MockServer) -> GeoIpAdapter {
    let config = GeoIpConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    };
    GeoIpAdapter::new(config).unwrap()
}

fn inference_adapter(server: &MockServer) -> OpenAiInferenceAdapter {
    let config = InferenceConfig {
        base_url: format!("{}/openai/v1", server.uri()),
        default_model: "test-model".to_string(),
        timeout_ms: 5000,
        ..Default::default()
    };
    OpenAiInferenceAdapter::new(config, &SecretString::from(LLM_KEY)).unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_718_000_000,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 90, "completion_tokens": 20, "total_tokens": 110}
    })
}

fn london_places() -> serde_json::Value {
    serde_json::json!({
        "results": [
            {
                "name": "London",
                "latitude": 42.98339,
                "longitude": -81.23304,
                "country_code": "CA",
                "country": "Canada",
                "admin1": "Ontario",
                "population": 346_765
            },
            {
                "name": "London",
                "latitude": 51.50853,
                "longitude": -0.12574,
                "country_code": "GB",
                "country": "United Kingdom",
                "admin1": "England",
                "population": 7_556_900
            }
        ]
    })
}

fn one_day(day: &str, code: u8) -> serde_json::Value {
    serde_json::json!({
        "latitude": 51.5,
        "longitude": -0.12,
        "daily": {
            "time": [day],
            "weather_code": [code],
            "temperature_2m_max": [21.4],
            "temperature_2m_min": [12.9],
            "precipitation_sum": [3.2],
            "precipitation_probability_max": [70],
            "wind_speed_10m_max": [18.0]
        }
    })
}

// =============================================================================
// Weather adapter
// =============================================================================

#[tokio::test]
async fn weather_current_maps_conditions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("apikey", WEATHER_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 40.71,
            "longitude": -74.01,
            "current": {
                "time": "2024-06-10T12:00",
                "temperature_2m": 24.3,
                "relative_humidity_2m": 61,
                "apparent_temperature": 25.1,
                "weather_code": 61,
                "wind_speed_10m": 9.4,
                "wind_direction_10m": 180,
                "surface_pressure": 1009.8
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let current = weather_adapter(&server)
        .current(&GeoLocation::new_york())
        .await
        .unwrap();

    assert_eq!(current.condition, WeatherCondition::LightRain);
    assert_eq!(current.humidity, 61);
    assert_eq!(current.wind_direction, Some(180));
    assert!((current.temperature - 24.3).abs() < f64::EPSILON);
}

#[tokio::test]
async fn weather_rate_limit_maps_to_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = weather_adapter(&server)
        .current(&GeoLocation::london())
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::RateLimited);
}

#[tokio::test]
async fn weather_server_error_is_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = weather_adapter(&server)
        .current(&GeoLocation::london())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::NetworkFailure(_)));
}

#[tokio::test]
async fn geocode_keeps_provider_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .and(query_param("name", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_places()))
        .mount(&server)
        .await;

    let places = weather_adapter(&server).geocode("London").await.unwrap();

    assert_eq!(places.len(), 2);
    assert_eq!(places[0].country.as_deref(), Some("Canada"));
    assert_eq!(places[1].population, Some(7_556_900));
}

#[tokio::test]
async fn historical_before_archive_start_is_not_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = weather_adapter(&server)
        .historical(&GeoLocation::london(), date(1901, 1, 1), date(2024, 6, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::NotAvailable(_)));
}

// =============================================================================
// Geolocation adapter
// =============================================================================

#[tokio::test]
async fn geoip_locate_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "81.2.69.160",
            "city": "London",
            "region": "England",
            "country": "GB",
            "loc": "51.5085,-0.1257"
        })))
        .mount(&server)
        .await;

    let location = geoip_adapter(&server).locate().await.unwrap();

    assert_eq!(location.city.as_deref(), Some("London"));
    assert_eq!(location.country.as_deref(), Some("GB"));
    assert!((location.coordinates.latitude() - 51.5085).abs() < 1e-9);
}

#[tokio::test]
async fn geoip_bogon_is_unknown_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ip": "10.0.0.1", "bogon": true})),
        )
        .mount(&server)
        .await;

    let err = geoip_adapter(&server).locate().await.unwrap_err();

    assert!(matches!(err, ProviderError::UnknownLocation(_)));
}

// =============================================================================
// Inference adapter
// =============================================================================

#[tokio::test]
async fn inference_sends_system_prompt_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", format!("Bearer {LLM_KEY}").as_str()))
        .and(body_string_contains("You classify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let result = inference_adapter(&server)
        .generate_with_system("You classify things.", "hello")
        .await
        .unwrap();

    assert_eq!(result.content, "ok");
    assert_eq!(result.model, "test-model");
    assert_eq!(result.tokens_used, Some(110));
}

#[tokio::test]
async fn inference_rejected_key_is_configuration_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = inference_adapter(&server)
        .generate_with_system("sys", "hello")
        .await
        .unwrap_err();

    assert!(matches!(err, ApplicationError::Configuration(_)));
}

// =============================================================================
// Full turn
// =============================================================================

async fn mount_llm_reply(server: &MockServer, utterance: &str, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(body_string_contains(utterance))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(reply)))
        .expect(1)
        .mount(server)
        .await;
}

fn session(server: &MockServer) -> ConversationSession {
    let weather: Arc<dyn WeatherPort> = Arc::new(weather_adapter(server));
    let geolocation: Arc<dyn GeoLocationPort> = Arc::new(geoip_adapter(server));
    let inference: Arc<dyn InferencePort> = Arc::new(inference_adapter(server));

    let extractor = Arc::new(LlmIntentExtractor::new(inference));
    let locations = LocationResolver::new(Arc::clone(&weather), geolocation);
    ConversationSession::new(extractor, WeatherDispatcher::new(weather, locations))
}

#[tokio::test]
async fn forecast_then_follow_up_reuses_city() {
    let server = MockServer::start().await;

    mount_llm_reply(
        &server,
        "Input: Will it rain in London tomorrow",
        r#"{"intent":"forecast","city":"London","date":"tomorrow"}"#,
    )
    .await;
    mount_llm_reply(
        &server,
        "Input: And the day after tomorrow",
        "```json\n{\"intent\":\"forecast\",\"city\":null,\"date\":\"day after tomorrow\"}\n```",
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .and(query_param("name", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_places()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("start_date", "2024-06-11"))
        .and(query_param("latitude", "51.50853"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_day("2024-06-11", 61)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("start_date", "2024-06-12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_day("2024-06-12", 0)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session(&server);

    let TurnOutcome::Reply(first) = session.respond("Will it rain in London tomorrow?", now()).await
    else {
        panic!("expected a reply");
    };
    assert!(first.success, "{}", first.message);
    assert!(first.message.contains("London, United Kingdom"));
    assert!(first.message.contains("tomorrow"));
    assert!(first.message.contains("large area"));

    let remembered = session.state().last_location().unwrap();
    assert_eq!(remembered.source(), LocationSource::Geocoded);
    assert_eq!(remembered.population(), Some(7_556_900));

    let TurnOutcome::Reply(second) = session.respond("And the day after tomorrow?", now()).await
    else {
        panic!("expected a reply");
    };
    assert!(second.success, "{}", second.message);
    assert!(second.message.contains("in 2 days"));
}

#[tokio::test]
async fn failed_provider_turn_keeps_state_empty() {
    let server = MockServer::start().await;

    mount_llm_reply(
        &server,
        "Input: weather in Paris",
        r#"{"intent":"current","city":"Paris","date":null}"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{
                "name": "Paris",
                "latitude": 48.85341,
                "longitude": 2.3488,
                "country": "France",
                "population": 2_138_551
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut session = session(&server);

    let TurnOutcome::Reply(reply) = session.respond("weather in Paris", now()).await else {
        panic!("expected a reply");
    };
    assert!(!reply.success);
    assert!(reply.message.contains("Could not fetch weather data"));
    assert!(session.state().last_location().is_none());
}
