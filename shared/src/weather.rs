//! OpenWeatherMap current-weather client and response types.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{Error, Result};

/// Placeholder marking each substitution point in the URL template.
const PLACEHOLDER: &str = "%s";

/// Measurement system selected by the template's `units=` query parameter.
///
/// OpenWeatherMap answers in `standard` (Kelvin) when the parameter is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Standard,
    Metric,
    Imperial,
}

impl Units {
    /// Read the `units` query parameter from a URL template.
    pub fn from_template(template: &str) -> Self {
        let query = match template.split_once('?') {
            Some((_, query)) => query,
            None => return Units::Standard,
        };

        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| key.eq_ignore_ascii_case("units"))
            .map(|(_, value)| match value.to_ascii_lowercase().as_str() {
                "metric" => Units::Metric,
                "imperial" => Units::Imperial,
                _ => Units::Standard,
            })
            .unwrap_or(Units::Standard)
    }

    pub fn temperature(&self) -> &'static str {
        match self {
            Units::Standard => "K",
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_speed(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            _ => "m/s",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

/// One weather condition entry (`weather[]` in the API response).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Main {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
    pub deg: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clouds {
    pub all: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sys {
    #[serde(rename = "type")]
    pub kind: i64,
    pub id: i64,
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Full current-weather response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherData {
    pub coord: Coord,
    pub weather: Vec<Condition>,
    pub base: String,
    pub main: Main,
    pub visibility: i64,
    pub wind: Wind,
    pub clouds: Clouds,
    pub dt: i64,
    pub sys: Sys,
    pub timezone: i64,
    pub id: i64,
    pub name: String,
    pub cod: i64,
}

/// The subset of a weather response forwarded to the dinner queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubWeatherData {
    pub weather: Vec<Condition>,
    pub main: Main,
    pub wind: Wind,
    pub clouds: Clouds,
    pub name: String,
    pub units: Units,
}

impl SubWeatherData {
    pub fn new(data: &WeatherData, units: Units) -> Self {
        Self {
            weather: data.weather.clone(),
            main: data.main.clone(),
            wind: data.wind.clone(),
            clouds: data.clouds.clone(),
            name: data.name.clone(),
            units,
        }
    }
}

/// Fill the URL template's first two `%s` slots with the city and API key.
pub fn request_url(template: &str, city: &str, api_key: &str) -> Result<String> {
    let mut parts = template.splitn(3, PLACEHOLDER);
    let (head, middle, tail) = match (parts.next(), parts.next(), parts.next()) {
        (Some(head), Some(middle), Some(tail)) => (head, middle, tail),
        _ => {
            return Err(Error::Config(format!(
                "Weather URL template needs two {} placeholders",
                PLACEHOLDER
            )))
        }
    };

    Ok(format!(
        "{}{}{}{}{}",
        head,
        urlencoding::encode(city),
        middle,
        api_key,
        tail
    ))
}

/// Turn a raw HTTP status and body into weather data.
pub fn decode_response(status: StatusCode, body: &str) -> Result<WeatherData> {
    if status != StatusCode::OK {
        error!(
            status = status.as_u16(),
            reason = status.canonical_reason().unwrap_or("unknown"),
            "Non-200 response from Open Weather Map"
        );
        return Err(Error::Status {
            status: status.as_u16(),
            reason: status.to_string(),
        });
    }

    serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "Deserializing Open Weather Map response failed");
        Error::Serialization(e)
    })
}

/// Client for the OpenWeatherMap current-weather endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    url_template: String,
    api_key: String,
    units: Units,
}

impl WeatherClient {
    /// Create a new weather client.
    pub fn new(http: reqwest::Client, url_template: String, api_key: String) -> Self {
        let units = Units::from_template(&url_template);
        Self {
            http,
            url_template,
            api_key,
            units,
        }
    }

    /// Units the responses are reported in.
    pub fn units(&self) -> Units {
        self.units
    }

    /// Fetch the current weather for a city.
    pub async fn current(&self, city: &str) -> Result<WeatherData> {
        let url = request_url(&self.url_template, city, &self.api_key)?;

        info!(city = %city, "Making HTTP request to Open Weather Map");

        let response = self.http.get(&url).send().await.map_err(|e| {
            error!(error = %e, "Request to Open Weather Map failed");
            Error::Http(e.without_url())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let data = decode_response(status, &body)?;
        info!(city = %data.name, "Decoded Open Weather Map response");

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_addr, http_client, serve_once};

    const TEMPLATE: &str =
        "https://api.openweathermap.org/data/2.5/weather?q=%s&units=metric&APPID=%s";

    const CAPE_TOWN: &str = r#"{
        "coord": {"lon": 18.4232, "lat": -33.9258},
        "weather": [
            {"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}
        ],
        "base": "stations",
        "main": {
            "temp": 17.5, "feels_like": 17.1, "temp_min": 16.2, "temp_max": 18.9,
            "pressure": 1016, "humidity": 72
        },
        "visibility": 10000,
        "wind": {"speed": 5.14, "deg": 160},
        "clouds": {"all": 20},
        "dt": 1700000000,
        "sys": {
            "type": 2, "id": 2073005, "country": "ZA",
            "sunrise": 1699990000, "sunset": 1700040000
        },
        "timezone": 7200,
        "id": 3369157,
        "name": "Cape Town",
        "cod": 200
    }"#;

    fn local_template(addr: std::net::SocketAddr) -> String {
        format!("http://{}/data/2.5/weather?q=%s&units=metric&APPID=%s", addr)
    }

    #[test]
    fn test_request_url_encodes_city() {
        let url = request_url(TEMPLATE, "Cape Town", "abc123").unwrap();
        assert_eq!(
            url,
            "https://api.openweathermap.org/data/2.5/weather\
             ?q=Cape%20Town&units=metric&APPID=abc123"
        );
    }

    #[test]
    fn test_request_url_leaves_extra_placeholders() {
        let url = request_url("q=%s&k=%s&x=%s", "Paris", "k1").unwrap();
        assert_eq!(url, "q=Paris&k=k1&x=%s");
    }

    #[test]
    fn test_request_url_requires_two_placeholders() {
        let err = request_url("https://example.com/?q=%s", "Paris", "k1").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_units_from_template() {
        assert_eq!(Units::from_template(TEMPLATE), Units::Metric);
        assert_eq!(
            Units::from_template("https://x/?q=%s&units=Imperial&APPID=%s"),
            Units::Imperial
        );
        assert_eq!(Units::from_template("https://x/?q=%s&APPID=%s"), Units::Standard);
        assert_eq!(Units::from_template("https://x/weather"), Units::Standard);
        assert_eq!(Units::Imperial.temperature(), "°F");
        assert_eq!(Units::Imperial.wind_speed(), "mph");
        assert_eq!(Units::Standard.temperature(), "K");
    }

    #[test]
    fn test_decode_full_response() {
        let data = decode_response(StatusCode::OK, CAPE_TOWN).unwrap();
        assert_eq!(data.name, "Cape Town");
        assert_eq!(data.sys.kind, 2);
        assert_eq!(data.sys.country, "ZA");
        assert_eq!(data.main.humidity, 72);
        assert_eq!(data.weather[0].description, "few clouds");
        assert_eq!(data.cod, 200);
    }

    #[test]
    fn test_decode_tolerates_missing_fields() {
        let body = r#"{"weather": [], "main": {"temp": 3.0}, "name": "Oslo"}"#;
        let data = decode_response(StatusCode::OK, body).unwrap();
        assert_eq!(data.name, "Oslo");
        assert_eq!(data.main.temp, 3.0);
        assert_eq!(data.sys.kind, 0);
        assert_eq!(data.visibility, 0);
    }

    #[test]
    fn test_decode_non_200() {
        let err = decode_response(
            StatusCode::UNAUTHORIZED,
            r#"{"cod":401,"message":"Invalid API key"}"#,
        )
        .unwrap_err();
        match err {
            Error::Status { status, reason } => {
                assert_eq!(status, 401);
                assert_eq!(reason, "401 Unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_invalid_body() {
        let err = decode_response(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_sub_weather_trims_payload() {
        let data = decode_response(StatusCode::OK, CAPE_TOWN).unwrap();
        let sub = SubWeatherData::new(&data, Units::Metric);
        assert_eq!(sub.name, "Cape Town");
        assert_eq!(sub.wind.deg, 160);
        assert_eq!(sub.clouds.all, 20);

        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 6);
        assert_eq!(json["units"], "metric");
        assert!(json.get("coord").is_none());
        assert!(json.get("sys").is_none());
    }

    #[tokio::test]
    async fn test_current_fetches_and_decodes() {
        let (addr, request) = serve_once("200 OK", CAPE_TOWN).await;
        let client = WeatherClient::new(
            http_client(),
            local_template(addr),
            "abc123".to_string(),
        );
        assert_eq!(client.units(), Units::Metric);

        let data = client.current("Cape Town").await.unwrap();
        assert_eq!(data.name, "Cape Town");

        let request = request.await.unwrap();
        assert!(request
            .starts_with("GET /data/2.5/weather?q=Cape%20Town&units=metric&APPID=abc123 HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_current_maps_non_200_to_status() {
        let (addr, _request) =
            serve_once("404 Not Found", r#"{"cod":"404","message":"city not found"}"#).await;
        let client = WeatherClient::new(http_client(), local_template(addr), "k".into());

        let err = client.current("Atlantis").await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_current_maps_connection_failure_to_http() {
        let addr = closed_addr().await;
        let client = WeatherClient::new(http_client(), local_template(addr), "k".into());

        let err = client.current("Cape Town").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(err.is_upstream());
    }
}
