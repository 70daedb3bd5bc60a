use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::provider::Country;
use super::repo_types::CountryFavorite;
use crate::error::{AppError, ValidationErrors};

/// Body of `POST /api/countries/favorites`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddCountryFavoriteRequest {
    pub country_code: String,
    pub country_name: String,
    pub region: String,
}

impl AddCountryFavoriteRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        let code = self.country_code.trim();
        if code.is_empty() {
            errors.add("countryCode", "Country code is required");
        } else if !(2..=3).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic())
        {
            errors.add("countryCode", "Country code must have 2 or 3 letters");
        }
        if self.country_name.trim().is_empty() {
            errors.add("countryName", "Country name is required");
        }
        errors.into_result()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

/// Live country facts attached to a listed favorite.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountryInfo {
    pub name: String,
    pub capital: String,
    pub region: String,
    pub subregion: String,
    pub population: u64,
    pub area: f64,
    pub flag: String,
    pub languages: Vec<String>,
    pub currencies: Vec<String>,
}

impl From<&Country> for CountryInfo {
    fn from(country: &Country) -> Self {
        Self {
            name: country.name.common.clone(),
            capital: country.capital.first().cloned().unwrap_or_default(),
            region: country.region.clone(),
            subregion: country.subregion.clone(),
            population: country.population,
            area: country.area,
            flag: country.flags.svg.clone(),
            languages: country.languages.values().cloned().collect(),
            currencies: country.currencies.values().map(|c| c.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryFavoriteResponse {
    pub id: Uuid,
    pub country_code: String,
    pub country_name: String,
    pub region: String,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_info: Option<CountryInfo>,
}

impl CountryFavoriteResponse {
    pub fn new(favorite: CountryFavorite, country_info: Option<CountryInfo>) -> Self {
        Self {
            id: favorite.id,
            country_code: favorite.country_code,
            country_name: favorite.country_name,
            region: favorite.region,
            added_at: favorite.added_at,
            country_info,
        }
    }
}
