use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{Clouds, Condition, Coord, Readings, Sys, WeatherProvider, WeatherReport, Wind};
use crate::upstream::{fetch_json, ProviderError};

const NAME: &str = "openweathermap";

#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMapProvider {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn fetch(&self, params: &[(&str, String)]) -> Result<WeatherReport, ProviderError> {
        let request = self
            .http
            .get(format!("{}/weather", self.base_url))
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")]);

        let parsed: OwCurrentResponse = fetch_json(request, NAME).await?;
        debug!(location = %parsed.name, "openweathermap report received");
        Ok(parsed.into())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(skip(self))]
    async fn current_by_city(&self, query: &str) -> Result<WeatherReport, ProviderError> {
        self.fetch(&[("q", query.to_string())]).await
    }

    #[instrument(skip(self))]
    async fn current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherReport, ProviderError> {
        self.fetch(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            .await
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i64,
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: i32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: i32,
    gust: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    #[serde(default)]
    sys: OwSys,
    visibility: Option<u32>,
    dt: i64,
    timezone: Option<i32>,
}

impl From<OwCurrentResponse> for WeatherReport {
    fn from(r: OwCurrentResponse) -> Self {
        Self {
            name: r.name,
            coord: Coord {
                lat: r.coord.lat,
                lon: r.coord.lon,
            },
            weather: r
                .weather
                .into_iter()
                .map(|w| Condition {
                    id: w.id,
                    main: w.main,
                    description: w.description,
                    icon: w.icon,
                })
                .collect(),
            main: Readings {
                temp: r.main.temp,
                feels_like: r.main.feels_like,
                temp_min: r.main.temp_min,
                temp_max: r.main.temp_max,
                pressure: r.main.pressure,
                humidity: r.main.humidity,
            },
            wind: Wind {
                speed: r.wind.speed,
                deg: r.wind.deg,
                gust: r.wind.gust,
            },
            clouds: Clouds { all: r.clouds.all },
            sys: Sys {
                country: r.sys.country,
                sunrise: r.sys.sunrise,
                sunset: r.sys.sunset,
            },
            visibility: r.visibility,
            dt: r.dt,
            timezone: r.timezone,
        }
    }
}
