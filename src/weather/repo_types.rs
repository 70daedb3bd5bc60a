use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::favorites::Favorite;

/// A city saved by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherFavorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub city_name: String,
    pub country_code: String, // ISO 3166-1 alpha-2
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
}

impl WeatherFavorite {
    pub fn new(
        user_id: Uuid,
        city_name: impl Into<String>,
        country_code: impl Into<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            city_name: city_name.into().trim().to_string(),
            country_code: country_code.into().trim().to_uppercase(),
            latitude,
            longitude,
            added_at: OffsetDateTime::now_utc(),
        }
    }

    /// Query string understood by the weather providers.
    pub fn location_query(&self) -> String {
        format!("{},{}", self.city_name, self.country_code)
    }
}

impl Favorite for WeatherFavorite {
    const KIND: &'static str = "WeatherFavorite";

    fn id(&self) -> Uuid {
        self.id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn added_at(&self) -> OffsetDateTime {
        self.added_at
    }

    fn same_key(&self, other: &Self) -> bool {
        self.city_name.to_lowercase() == other.city_name.to_lowercase()
            && self.country_code.eq_ignore_ascii_case(&other.country_code)
    }
}
