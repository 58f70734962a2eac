//! Get Weather Lambda - Fetches current weather and forwards it for dinner planning.
//!
//! This Lambda:
//! 1. Resolves the OpenWeatherMap API key and URL template at cold start
//! 2. Fetches the current weather for the requested (or default) city
//! 3. Publishes the trimmed payload to SQS when a queue is configured
//! 4. Returns a short summary naming the city

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use shared::{
    get_parameter, get_secret, ApiKeySource, Config, SubWeatherData, Units, WeatherClient,
    WeatherData, WeatherEvent, WeatherPublisher,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct AppState {
    weather: WeatherClient,
    publisher: Option<WeatherPublisher>,
    default_city: String,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let aws_config = shared::aws_config(&config.region).await;

        let api_key = match &config.api_key {
            ApiKeySource::Literal(key) => {
                info!("Using API key from environment");
                key.clone()
            }
            ApiKeySource::Secret(secret_id) => {
                let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);
                get_secret(&secrets_client, secret_id).await?
            }
        };

        let ssm_client = aws_sdk_ssm::Client::new(&aws_config);
        let url_template = get_parameter(&ssm_client, &config.weather_url_param, false).await?;

        let publisher = config.queue_name.clone().map(|queue_name| {
            WeatherPublisher::new(aws_sdk_sqs::Client::new(&aws_config), queue_name)
        });

        Ok(Self {
            weather: WeatherClient::new(reqwest::Client::new(), url_template, api_key),
            publisher,
            default_city: config.default_city,
        })
    }
}

fn summary(data: &WeatherData) -> String {
    format!("City: {}", data.name)
}

/// Trim the response, hand it to `publish` when a queue is configured, and
/// summarise the result.
async fn report<P, Fut>(
    data: &WeatherData,
    units: Units,
    publish: Option<P>,
) -> shared::Result<String>
where
    P: FnOnce(SubWeatherData) -> Fut,
    Fut: Future<Output = shared::Result<String>>,
{
    let sub_weather = SubWeatherData::new(data, units);
    info!(weather = ?sub_weather, "Extracted weather details");

    match publish {
        Some(publish) => {
            let message_id = publish(sub_weather).await?;
            info!(message_id = %message_id, "Weather forwarded for dinner suggestions");
        }
        None => info!("No queue configured, skipping publish"),
    }

    Ok(summary(data))
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<Value>) -> Result<String, Error> {
    let request = WeatherEvent::from(event.payload);
    let city = request.city_or(&state.default_city);
    info!(city = %city, "Processing weather request");

    let data = state.weather.current(city).await.map_err(|e| {
        error!(city = %city, upstream = e.is_upstream(), error = %e, "Failed to fetch weather");
        e
    })?;

    let publish = state
        .publisher
        .as_ref()
        .map(|publisher| {
            move |sub: SubWeatherData| async move { publisher.publish(&sub).await }
        });

    Ok(report(&data, state.weather.units(), publish).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = state.clone();
        async move { handler(state, event).await }
    }))
    .await
}
