use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use time::OffsetDateTime;

use super::{Clouds, Condition, Coord, Readings, Sys, WeatherProvider, WeatherReport, Wind};
use crate::upstream::ProviderError;

const TEMPERATURES: &[f64] = &[15.5, 20.2, 25.8, 30.1, 18.7, 22.3, 28.5];
const CONDITIONS: &[(&str, &str, &str)] = &[
    ("Clear", "céu limpo", "01d"),
    ("Clouds", "nublado", "03d"),
    ("Clouds", "parcialmente nublado", "02d"),
    ("Rain", "chuva", "09d"),
    ("Clear", "ensolarado", "01d"),
];

/// Synthetic weather for development without an API key.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoWeatherProvider;

impl DemoWeatherProvider {
    fn report(location: &str, coord: Coord) -> WeatherReport {
        let mut rng = rand::thread_rng();
        let temp = *TEMPERATURES.choose(&mut rng).unwrap_or(&20.0);
        let (main, description, icon) = *CONDITIONS
            .choose(&mut rng)
            .unwrap_or(&("Clear", "céu limpo", "01d"));
        let now = OffsetDateTime::now_utc().unix_timestamp();

        WeatherReport {
            name: location.to_string(),
            coord,
            weather: vec![Condition {
                id: rng.gen_range(800..804),
                main: main.to_string(),
                description: description.to_string(),
                icon: icon.to_string(),
            }],
            main: Readings {
                temp,
                feels_like: temp + rng.gen_range(-2.0..2.0),
                temp_min: temp - 5.0,
                temp_max: temp + 5.0,
                pressure: 1013,
                humidity: rng.gen_range(40..80),
            },
            wind: Wind {
                speed: rng.gen_range(5..20) as f64,
                deg: rng.gen_range(0..360),
                gust: None,
            },
            clouds: Clouds {
                all: rng.gen_range(0..100),
            },
            sys: Sys {
                country: "BR".to_string(),
                sunrise: Some(now - 12 * 3600),
                sunset: Some(now),
            },
            visibility: None,
            dt: now,
            timezone: Some(-10800),
        }
    }
}

#[async_trait]
impl WeatherProvider for DemoWeatherProvider {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn current_by_city(&self, query: &str) -> Result<WeatherReport, ProviderError> {
        let city = query.split(',').next().unwrap_or_default().trim();
        if city.is_empty() {
            return Err(ProviderError::NotFound);
        }
        // Brasília
        Ok(Self::report(city, Coord { lat: -15.7801, lon: -47.9292 }))
    }

    async fn current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherReport, ProviderError> {
        Ok(Self::report(&format!("{lat},{lon}"), Coord { lat, lon }))
    }
}
