use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ProviderConfig, WeatherProviderKind};
use crate::upstream::{http_client, ProviderError};

pub mod demo;
pub mod openweathermap;
pub mod weatherapi;

pub use demo::DemoWeatherProvider;
pub use openweathermap::OpenWeatherMapProvider;
pub use weatherapi::WeatherApiProvider;

/// Current conditions at one place, shaped after OpenWeatherMap's
/// current-weather document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub name: String,
    pub coord: Coord,
    pub weather: Vec<Condition>,
    pub main: Readings,
    pub wind: Wind,
    pub clouds: Clouds,
    pub sys: Sys,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<u32>,
    pub dt: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Readings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i32,
    pub humidity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wind {
    pub speed: f64, // m/s
    pub deg: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clouds {
    pub all: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sys {
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
}

impl WeatherReport {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `query` is a city name, optionally followed by `,CC`.
    async fn current_by_city(&self, query: &str) -> Result<WeatherReport, ProviderError>;

    async fn current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherReport, ProviderError>;
}

/// Build the configured weather provider.
///
/// OpenWeatherMap refuses to start without a key. WeatherAPI without a key
/// degrades to the demo provider.
pub fn provider_from_config(config: &ProviderConfig) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider: Arc<dyn WeatherProvider> = match config.weather_provider {
        WeatherProviderKind::OpenWeatherMap => {
            let api_key = config.openweathermap_api_key.clone().ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider 'openweathermap'.\n\
                     Hint: set OPENWEATHERMAP_API_KEY or choose WEATHER_PROVIDER=weatherapi."
                )
            })?;
            Arc::new(OpenWeatherMapProvider::new(
                http_client(config.timeout_secs)?,
                config.openweathermap_base_url.clone(),
                api_key,
            ))
        }
        WeatherProviderKind::WeatherApi => match config.weatherapi_key.clone() {
            Some(api_key) => Arc::new(WeatherApiProvider::new(
                http_client(config.timeout_secs)?,
                config.weatherapi_base_url.clone(),
                api_key,
            )),
            None => {
                warn!("WEATHERAPI_KEY not set, serving synthetic demo weather");
                Arc::new(DemoWeatherProvider)
            }
        },
    };
    info!(provider = provider.name(), "weather provider selected");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: WeatherProviderKind) -> ProviderConfig {
        ProviderConfig {
            weather_provider: kind,
            openweathermap_api_key: None,
            openweathermap_base_url: "http://localhost:1".into(),
            weatherapi_key: None,
            weatherapi_base_url: "http://localhost:1".into(),
            countries_base_url: "http://localhost:1".into(),
            timeout_secs: 1,
            country_cache_ttl_minutes: 30,
            lookup_concurrency: 4,
        }
    }

    #[test]
    fn openweathermap_requires_a_key() {
        let err = provider_from_config(&config(WeatherProviderKind::OpenWeatherMap))
            .err()
            .expect("missing key must fail");
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn openweathermap_with_key_is_selected() {
        let mut cfg = config(WeatherProviderKind::OpenWeatherMap);
        cfg.openweathermap_api_key = Some("KEY".into());
        let provider = provider_from_config(&cfg).unwrap();
        assert_eq!(provider.name(), "openweathermap");
    }

    #[test]
    fn weatherapi_without_key_falls_back_to_demo() {
        let provider = provider_from_config(&config(WeatherProviderKind::WeatherApi)).unwrap();
        assert_eq!(provider.name(), "demo");

        let mut cfg = config(WeatherProviderKind::WeatherApi);
        cfg.weatherapi_key = Some("KEY".into());
        assert_eq!(provider_from_config(&cfg).unwrap().name(), "weatherapi");
    }
}
