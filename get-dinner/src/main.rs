//! Get Dinner Lambda - Suggests a meal for each weather report on the queue.
//!
//! This Lambda is triggered by SQS and:
//! 1. Decodes each message body as a trimmed weather payload
//! 2. Requests a dinner suggestion that suits the weather
//! 3. Reports failed messages back to SQS for redelivery

use aws_lambda_events::event::sqs::{BatchItemFailure, SqsBatchResponse, SqsEvent, SqsMessage};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{get_parameter, MealClient, MealConfig, MealSuggestion, SubWeatherData};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct AppState {
    meals: MealClient,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = MealConfig::from_env()?;
        let aws_config = shared::aws_config(&config.region).await;
        let ssm_client = aws_sdk_ssm::Client::new(&aws_config);

        let api_key = get_parameter(&ssm_client, &config.api_key_param, true).await?;
        let url = get_parameter(&ssm_client, &config.url_param, false).await?;

        Ok(Self {
            meals: MealClient::new(reqwest::Client::new(), url, api_key, config.model),
        })
    }
}

fn decode_weather(message: &SqsMessage) -> shared::Result<SubWeatherData> {
    let body = message
        .body
        .as_deref()
        .ok_or_else(|| shared::Error::Internal("Message has no body".to_string()))?;
    Ok(serde_json::from_str(body)?)
}

/// Run `suggest` over every record, collecting the ids of those that fail.
///
/// A failed record without a message id cannot be redelivered on its own, so
/// it fails the whole batch once every other record has been attempted.
async fn process_batch<F, Fut>(event: &SqsEvent, suggest: F) -> shared::Result<SqsBatchResponse>
where
    F: Fn(SubWeatherData) -> Fut,
    Fut: Future<Output = shared::Result<MealSuggestion>>,
{
    let mut batch_item_failures = Vec::new();
    let mut unidentified = 0usize;

    for record in &event.records {
        let message_id = record.message_id.as_deref().unwrap_or("<missing>");

        let outcome = match decode_weather(record) {
            Ok(weather) => {
                let city = weather.name.clone();
                suggest(weather).await.map(|meal| (city, meal))
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok((city, meal)) => {
                info!(
                    message_id = %message_id,
                    city = %city,
                    meal = %meal.meal,
                    country_of_origin = %meal.country_of_origin,
                    ingredients = meal.ingredients.len(),
                    "Meal suggested"
                );
            }
            Err(e) => {
                error!(message_id = %message_id, error = %e, "Failed to process weather message");
                match &record.message_id {
                    Some(id) => batch_item_failures.push(BatchItemFailure {
                        item_identifier: id.clone(),
                    }),
                    None => unidentified += 1,
                }
            }
        }
    }

    if unidentified > 0 {
        return Err(shared::Error::Internal(format!(
            "{} failed message(s) without a message id",
            unidentified
        )));
    }

    Ok(SqsBatchResponse {
        batch_item_failures,
    })
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<SqsEvent>,
) -> Result<SqsBatchResponse, Error> {
    info!(records = event.payload.records.len(), "Processing dinner event");

    let response = process_batch(&event.payload, |weather| {
        let state = state.clone();
        async move { state.meals.suggest(&weather).await }
    })
    .await?;

    info!(
        failures = response.batch_item_failures.len(),
        "Dinner batch complete"
    );

    Ok(response)
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
