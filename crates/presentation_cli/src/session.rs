//! Wiring of adapters into a conversation session

use std::sync::Arc;

use application::{
    ApplicationError, ConversationSession, GeoLocationPort, InferencePort, LlmIntentExtractor,
    LocationResolver, WeatherDispatcher, WeatherPort,
};
use infrastructure::{
    AppConfig, Credentials, GeoIpAdapter, OpenAiInferenceAdapter, WeatherAdapter,
};
use tracing::info;

/// Build a session backed by the configured providers
pub fn build(
    config: &AppConfig,
    credentials: &Credentials,
) -> Result<ConversationSession, ApplicationError> {
    let weather: Arc<dyn WeatherPort> = Arc::new(WeatherAdapter::new(
        config.weather.clone(),
        &credentials.weather_api_key,
    )?);
    let geolocation: Arc<dyn GeoLocationPort> =
        Arc::new(GeoIpAdapter::new(config.geoip.clone())?);
    let inference: Arc<dyn InferencePort> = Arc::new(OpenAiInferenceAdapter::new(
        config.inference.clone(),
        &credentials.llm_api_key,
    )?);

    info!(model = %inference.current_model(), "Session ready");

    let extractor = Arc::new(LlmIntentExtractor::new(inference));
    let locations = LocationResolver::new(Arc::clone(&weather), geolocation);
    let dispatcher = WeatherDispatcher::new(weather, locations);

    Ok(ConversationSession::new(extractor, dispatcher))
}
