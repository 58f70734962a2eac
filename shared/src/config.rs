//! Configuration management for Lambda functions.

use std::env;

use crate::{Error, Result};

/// Region used when neither `REGION` nor `AWS_REGION` is set.
pub const DEFAULT_REGION: &str = "af-south-1";

/// City queried when the invoking event does not name one.
pub const DEFAULT_CITY: &str = "Cape Town";

/// Completion model used when `CHATGPT_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Where the OpenWeatherMap API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    /// Secrets Manager secret id
    Secret(String),
    /// Literal key taken from the environment
    Literal(String),
}

/// Weather function configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source of the OpenWeatherMap API key
    pub api_key: ApiKeySource,
    /// Parameter Store name holding the weather URL template
    pub weather_url_param: String,
    /// AWS region
    pub region: String,
    /// Queue that receives trimmed weather payloads, if any
    pub queue_name: Option<String>,
    /// City used for events without one
    pub default_city: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = match non_empty(&lookup, "WEATHER_API_KEY") {
            Some(key) => ApiKeySource::Literal(key),
            None => ApiKeySource::Secret(required(&lookup, "SECRET_KEY")?),
        };

        Ok(Self {
            api_key,
            weather_url_param: required(&lookup, "OPEN_WEATHER_URL_KEY")?,
            region: region(&lookup),
            queue_name: non_empty(&lookup, "SQS_QUEUE_NAME"),
            default_city: non_empty(&lookup, "DEFAULT_CITY")
                .unwrap_or_else(|| DEFAULT_CITY.to_string()),
        })
    }
}

/// Dinner function configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct MealConfig {
    /// Parameter Store name of the completion API key (stored encrypted)
    pub api_key_param: String,
    /// Parameter Store name of the completion endpoint URL
    pub url_param: String,
    /// Model name sent with each completion request
    pub model: String,
    /// AWS region
    pub region: String,
}

impl MealConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key_param: required(&lookup, "CHATGPT_API_KEY_PARAM")?,
            url_param: required(&lookup, "CHATGPT_URL_PARAM")?,
            model: non_empty(&lookup, "CHATGPT_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            region: region(&lookup),
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or_else(|| Error::Config(format!("{} not set", key)))
}

fn region<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, "REGION")
        .or_else(|| non_empty(lookup, "AWS_REGION"))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}
