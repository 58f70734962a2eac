//! Meal suggestion client backed by a chat-completion API.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::weather::SubWeatherData;
use crate::{Error, Result};

/// One ingredient line of a suggested meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
}

/// A dinner suggestion for the current weather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSuggestion {
    pub meal: String,
    #[serde(default)]
    pub country_of_origin: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub cooking_instructions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request body for the completion endpoint.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Build the prompt describing the weather and the expected answer shape.
pub fn meal_prompt(weather: &SubWeatherData) -> String {
    let conditions = weather
        .weather
        .iter()
        .map(|c| c.description.as_str())
        .filter(|d| !d.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let conditions = if conditions.is_empty() {
        "unknown conditions".to_string()
    } else {
        conditions
    };

    let units = weather.units;

    format!(
        "The weather in {city} is currently {temp:.1}{deg} (feels like {feels:.1}{deg}) \
         with {conditions}, {humidity}% humidity, {wind:.1} {speed} wind and {clouds}% cloud \
         cover. Suggest one dinner that suits this weather. Reply only with JSON of the form \
         {{\"meal\": string, \"country_of_origin\": string, \
         \"ingredients\": [{{\"name\": string, \"amount\": string}}], \
         \"cooking_instructions\": [string]}}.",
        city = weather.name,
        temp = weather.main.temp,
        feels = weather.main.feels_like,
        deg = units.temperature(),
        conditions = conditions,
        humidity = weather.main.humidity,
        wind = weather.wind.speed,
        speed = units.wind_speed(),
        clouds = weather.clouds.all,
    )
}

/// Decode the assistant's reply, tolerating a surrounding Markdown code fence.
pub fn parse_suggestion(content: &str) -> Result<MealSuggestion> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    Ok(serde_json::from_str(unfenced.trim())?)
}

/// Turn a raw completion status and body into a meal suggestion.
pub fn decode_completion(status: StatusCode, body: &str) -> Result<MealSuggestion> {
    if !status.is_success() {
        error!(status = status.as_u16(), "Meal suggestion request failed");
        return Err(Error::Status {
            status: status.as_u16(),
            reason: status.to_string(),
        });
    }

    let completion: CompletionResponse = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "Deserializing completion response failed");
        Error::Serialization(e)
    })?;

    let content = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| Error::Internal("Completion returned no choices".to_string()))?;

    parse_suggestion(&content)
}

/// Client for requesting meal suggestions.
#[derive(Debug, Clone)]
pub struct MealClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl MealClient {
    /// Create a new meal client.
    pub fn new(http: reqwest::Client, url: String, api_key: String, model: String) -> Self {
        Self {
            http,
            url,
            api_key,
            model,
        }
    }

    /// Ask for a dinner suggestion that fits the given weather.
    pub async fn suggest(&self, weather: &SubWeatherData) -> Result<MealSuggestion> {
        let prompt = meal_prompt(weather);
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        info!(city = %weather.name, model = %self.model, "Requesting meal suggestion");

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        decode_completion(status, &body)
    }
}
