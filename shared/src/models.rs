//! Shared event models.

use serde::Deserialize;
use serde_json::Value;

/// Invocation payload for the weather function.
///
/// Scheduled triggers send `null` or `{}`, so the payload is read leniently
/// through `From<Value>` rather than strict deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeatherEvent {
    #[serde(default)]
    pub city: Option<String>,
}

impl From<Value> for WeatherEvent {
    fn from(payload: Value) -> Self {
        let city = match payload {
            Value::Object(fields) => fields.get("city").and_then(Value::as_str).map(str::to_string),
            Value::String(city) => Some(city),
            _ => None,
        };
        Self { city }
    }
}

impl WeatherEvent {
    /// The requested city, or `default` when none (or a blank one) was given.
    pub fn city_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
            .unwrap_or(default)
    }
}
