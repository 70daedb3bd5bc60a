use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::provider::WeatherReport;
use super::repo_types::WeatherFavorite;
use crate::error::{AppError, ValidationErrors};

/// Body of `POST /api/weather/favorites`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddWeatherFavoriteRequest {
    pub city_name: String,
    pub country_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AddWeatherFavoriteRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        if self.city_name.trim().is_empty() {
            errors.add("cityName", "City name is required");
        }
        let code = self.country_code.trim();
        if code.is_empty() {
            errors.add("countryCode", "Country code is required");
        } else if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.add("countryCode", "Country code must have 2 letters");
        }
        check_coordinates(&mut errors, self.latitude, self.longitude);
        errors.into_result()
    }
}

fn check_coordinates(errors: &mut ValidationErrors, lat: Option<f64>, lon: Option<f64>) {
    if lat.is_some_and(|v| !(-90.0..=90.0).contains(&v)) {
        errors.add("latitude", "Latitude must be between -90 and 90");
    }
    if lon.is_some_and(|v| !(-180.0..=180.0).contains(&v)) {
        errors.add("longitude", "Longitude must be between -180 and 180");
    }
}

/// Query of `GET /api/weather/coordinates`.
#[derive(Debug, Default, Deserialize)]
pub struct CoordinatesQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl CoordinatesQuery {
    /// Both coordinates, in range.
    pub fn validate(&self) -> Result<(f64, f64), AppError> {
        let mut errors = ValidationErrors::new();
        if self.lat.is_none() {
            errors.add("lat", "Latitude is required");
        }
        if self.lon.is_none() {
            errors.add("lon", "Longitude is required");
        }
        check_coordinates(&mut errors, self.lat, self.lon);
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if errors.is_empty() => Ok((lat, lon)),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

/// Condensed live weather attached to a listed favorite.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: f64,
}

impl From<&WeatherReport> for CurrentWeather {
    fn from(report: &WeatherReport) -> Self {
        let condition = report.primary_condition();
        Self {
            temperature: report.main.temp,
            feels_like: report.main.feels_like,
            description: condition.map(|c| c.description.clone()).unwrap_or_default(),
            icon: condition.map(|c| c.icon.clone()).unwrap_or_default(),
            humidity: report.main.humidity,
            wind_speed: report.wind.speed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherFavoriteResponse {
    pub id: Uuid,
    pub city_name: String,
    pub country_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weather: Option<CurrentWeather>,
}

impl WeatherFavoriteResponse {
    pub fn new(favorite: WeatherFavorite, current_weather: Option<CurrentWeather>) -> Self {
        Self {
            id: favorite.id,
            city_name: favorite.city_name,
            country_code: favorite.country_code,
            latitude: favorite.latitude,
            longitude: favorite.longitude,
            added_at: favorite.added_at,
            current_weather,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favorite_request_needs_city_and_two_letter_code() {
        let ok = AddWeatherFavoriteRequest {
            city_name: "Paris".into(),
            country_code: "fr".into(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = AddWeatherFavoriteRequest {
            city_name: " ".into(),
            country_code: "FRA".into(),
            latitude: Some(91.0),
            ..Default::default()
        };
        let Err(AppError::Validation(errors)) = bad.validate() else {
            panic!("expected validation error");
        };
        assert!(errors.field("cityName").is_some());
        assert_eq!(
            errors.field("countryCode").unwrap(),
            ["Country code must have 2 letters"]
        );
        assert!(errors.field("latitude").is_some());
    }

    #[test]
    fn coordinates_query_requires_both_in_range() {
        let q = CoordinatesQuery {
            lat: Some(-23.5),
            lon: Some(-46.6),
        };
        assert_eq!(q.validate().unwrap(), (-23.5, -46.6));

        assert!(CoordinatesQuery {
            lat: Some(10.0),
            lon: None
        }
        .validate()
        .is_err());
        assert!(CoordinatesQuery {
            lat: Some(10.0),
            lon: Some(200.0)
        }
        .validate()
        .is_err());
    }
}
