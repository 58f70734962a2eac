//! Shared library for the weather and dinner Lambda functions.
//!
//! This crate provides configuration, AWS lookups, the weather and meal
//! clients, and the event types used by both functions.

pub mod config;
pub mod error;
pub mod meals;
pub mod models;
pub mod parameters;
pub mod queue;
pub mod secrets;
pub mod weather;

#[cfg(test)]
mod test_support;

pub use config::{ApiKeySource, Config, MealConfig};
pub use error::{Error, Result};
pub use meals::{Ingredient, MealClient, MealSuggestion};
pub use models::WeatherEvent;
pub use parameters::get_parameter;
pub use queue::WeatherPublisher;
pub use secrets::get_secret;
pub use weather::{SubWeatherData, Units, WeatherClient, WeatherData};

/// Load the AWS SDK configuration for the given region.
pub async fn aws_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}
