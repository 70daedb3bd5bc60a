use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{Clouds, Condition, Coord, Readings, Sys, WeatherProvider, WeatherReport, Wind};
use crate::translation;
use crate::upstream::{fetch_json_with, ProviderError};

const NAME: &str = "weatherapi";

/// WeatherAPI answers 400 (error code 1006) for locations it cannot resolve.
const NO_MATCH: [StatusCode; 2] = [StatusCode::NOT_FOUND, StatusCode::BAD_REQUEST];

/// weatherapi.com `current.json`, normalized to metric units and
/// OpenWeatherMap icon codes, with Portuguese labels.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    http: Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiProvider {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn fetch(&self, query: &str) -> Result<WeatherReport, ProviderError> {
        let request = self
            .http
            .get(format!("{}/current.json", self.base_url))
            .query(&[("key", self.api_key.as_str()), ("q", query), ("aqi", "no")]);

        let parsed: WaResponse = fetch_json_with(request, NAME, &NO_MATCH).await?;
        debug!(location = %parsed.location.name, "weatherapi report received");
        Ok(parsed.into())
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(skip(self))]
    async fn current_by_city(&self, query: &str) -> Result<WeatherReport, ProviderError> {
        self.fetch(query).await
    }

    #[instrument(skip(self))]
    async fn current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherReport, ProviderError> {
        self.fetch(&format!("{lat},{lon}")).await
    }
}

/// WeatherAPI condition code to the closest OpenWeatherMap icon.
pub fn icon_for_code(code: i64) -> &'static str {
    match code {
        1000 => "01d",
        1003 => "02d",
        1006 => "03d",
        1009 => "04d",
        1180..=1201 => "09d",
        1210..=1225 => "13d",
        1273..=1282 => "11d",
        _ => "01d",
    }
}

fn kph_to_mps(kph: f64) -> f64 {
    kph / 3.6
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WaCondition {
    #[serde(default)]
    text: String,
    #[serde(default)]
    code: i64,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    #[serde(default)]
    wind_kph: f64,
    #[serde(default)]
    wind_degree: i32,
    gust_kph: Option<f64>,
    #[serde(default)]
    pressure_mb: f64,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    cloud: u8,
    vis_km: Option<f64>,
    #[serde(default)]
    last_updated_epoch: i64,
    #[serde(default)]
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl From<WaResponse> for WeatherReport {
    fn from(r: WaResponse) -> Self {
        let current = r.current;
        let label = translation::weather_condition(&current.condition.text);
        Self {
            name: r.location.name,
            coord: Coord {
                lat: r.location.lat,
                lon: r.location.lon,
            },
            weather: vec![Condition {
                id: current.condition.code,
                main: label.clone(),
                description: label,
                icon: icon_for_code(current.condition.code).to_string(),
            }],
            main: Readings {
                temp: current.temp_c,
                feels_like: current.feelslike_c,
                // only a point reading is available
                temp_min: current.temp_c,
                temp_max: current.temp_c,
                pressure: current.pressure_mb.round() as i32,
                humidity: current.humidity,
            },
            wind: Wind {
                speed: kph_to_mps(current.wind_kph),
                deg: current.wind_degree,
                gust: current.gust_kph.map(kph_to_mps),
            },
            clouds: Clouds { all: current.cloud },
            sys: Sys {
                country: translation::country_name(&r.location.country),
                sunrise: None,
                sunset: None,
            },
            visibility: current.vis_km.map(|km| (km * 1000.0).round() as u32),
            dt: current.last_updated_epoch,
            timezone: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAO_PAULO: &str = r#"{
        "location": {"name": "Sao Paulo", "region": "Sao Paulo", "country": "Brazil",
                     "lat": -23.53, "lon": -46.62, "tz_id": "America/Sao_Paulo"},
        "current": {"last_updated_epoch": 1718000000, "temp_c": 24.0, "feelslike_c": 25.1,
                    "wind_kph": 18.0, "wind_degree": 140, "pressure_mb": 1016.4,
                    "humidity": 61, "cloud": 25, "vis_km": 10.0, "gust_kph": 21.6,
                    "condition": {"text": "Partly cloudy", "icon": "//cdn/116.png", "code": 1003}}
    }"#;

    #[test]
    fn maps_units_icons_and_labels() {
        let parsed: WaResponse = serde_json::from_str(SAO_PAULO).unwrap();
        let report = WeatherReport::from(parsed);

        assert_eq!(report.name, "Sao Paulo");
        assert_eq!(report.sys.country, "Brasil");
        assert!((report.wind.speed - 5.0).abs() < 1e-9);
        assert!((report.wind.gust.unwrap() - 6.0).abs() < 1e-9);
        assert_eq!(report.main.pressure, 1016);
        assert_eq!(report.visibility, Some(10_000));

        let condition = report.primary_condition().unwrap();
        assert_eq!(condition.description, "parcialmente nublado");
        assert_eq!(condition.icon, "02d");
    }

    #[test]
    fn icon_table() {
        assert_eq!(icon_for_code(1000), "01d");
        assert_eq!(icon_for_code(1009), "04d");
        assert_eq!(icon_for_code(1195), "09d");
        assert_eq!(icon_for_code(1213), "13d");
        assert_eq!(icon_for_code(1276), "11d");
        assert_eq!(icon_for_code(1135), "01d");
    }
}
