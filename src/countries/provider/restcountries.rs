use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::{Country, CountryProvider};
use crate::translation;
use crate::upstream::{fetch_json, ProviderError};

const NAME: &str = "restcountries";

/// `/all` refuses more than ten fields. These cover code lookup, name search
/// and favorite enrichment; the remaining `Country` fields default.
const DATASET_FIELDS: [&str; 10] = [
    "name",
    "cca2",
    "cca3",
    "capital",
    "region",
    "subregion",
    "languages",
    "currencies",
    "population",
    "flags",
];

/// Client for restcountries.com v3.1. Country names come back in Portuguese
/// where a translation is known.
#[derive(Debug, Clone)]
pub struct RestCountriesClient {
    http: Client,
    base_url: String,
}

impl RestCountriesClient {
    pub fn new(http: Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_list(&self, path: &str) -> Result<Vec<Country>, ProviderError> {
        let request = self.http.get(format!("{}{path}", self.base_url));
        let countries: Vec<Country> = fetch_json(request, NAME).await?;
        debug!(path, count = countries.len(), "restcountries response");
        Ok(countries.into_iter().map(localize).collect())
    }
}

pub fn localize(mut country: Country) -> Country {
    country.name.common = translation::country_name(&country.name.common);
    country.name.official = translation::country_name(&country.name.official);
    country
}

/// Only ASCII letters are valid in alpha-2/alpha-3 codes.
fn is_country_code(code: &str) -> bool {
    (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic())
}

#[async_trait]
impl CountryProvider for RestCountriesClient {
    #[instrument(skip(self))]
    async fn by_code(&self, code: &str) -> Result<Country, ProviderError> {
        let code = code.trim();
        if !is_country_code(code) {
            return Err(ProviderError::NotFound);
        }
        self.get_list(&format!("/alpha/{code}"))
            .await?
            .into_iter()
            .next()
            .ok_or(ProviderError::NotFound)
    }

    #[instrument(skip(self))]
    async fn search_by_name(&self, name: &str) -> Result<Vec<Country>, ProviderError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Unavailable(format!("{NAME}: bad base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Unavailable(format!("{NAME}: bad base url")))?
            .push("name")
            .push(name);

        match fetch_json::<Vec<Country>>(self.http.get(url), NAME).await {
            Ok(countries) => Ok(countries.into_iter().map(localize).collect()),
            Err(ProviderError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn all(&self) -> Result<Vec<Country>, ProviderError> {
        self.get_list(&format!("/all?fields={}", DATASET_FIELDS.join(",")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRAZIL: &str = r#"[{
        "name": {"common": "Brazil", "official": "Federative Republic of Brazil",
                 "nativeName": {"por": {"official": "República Federativa do Brasil", "common": "Brasil"}}},
        "tld": [".br"], "cca2": "BR", "ccn3": "076", "cca3": "BRA",
        "currencies": {"BRL": {"name": "Brazilian real", "symbol": "R$"}},
        "capital": ["Brasília"], "region": "Americas", "subregion": "South America",
        "languages": {"por": "Portuguese"}, "latlng": [-10.0, -55.0],
        "area": 8515767.0, "population": 212559409, "flag": "🇧🇷",
        "timezones": ["UTC-05:00", "UTC-04:00", "UTC-03:00", "UTC-02:00"],
        "continents": ["South America"],
        "flags": {"png": "https://flagcdn.com/w320/br.png", "svg": "https://flagcdn.com/br.svg",
                  "alt": "The flag of Brazil"}
    }]"#;

    #[test]
    fn parses_and_localizes_country() {
        let parsed: Vec<Country> = serde_json::from_str(BRAZIL).unwrap();
        let brazil = localize(parsed.into_iter().next().unwrap());

        assert_eq!(brazil.name.common, "Brasil");
        assert_eq!(brazil.name.official, "Federative Republic of Brazil");
        assert_eq!(brazil.capital, ["Brasília"]);
        assert_eq!(brazil.currencies["BRL"].name, "Brazilian real");
        assert_eq!(brazil.flags.svg, "https://flagcdn.com/br.svg");
        assert_eq!(brazil.population, 212_559_409);
        assert!(brazil.has_code("bra"));
    }

    #[test]
    fn missing_fields_default() {
        let parsed: Vec<Country> = serde_json::from_str(r#"[{"cca2": "AQ"}]"#).unwrap();
        assert_eq!(parsed[0].cca2, "AQ");
        assert!(parsed[0].capital.is_empty());
    }

    #[test]
    fn dataset_request_stays_within_the_field_limit() {
        assert!(DATASET_FIELDS.len() <= 10);
        for needed in ["name", "cca2", "cca3", "capital", "currencies", "flags"] {
            assert!(DATASET_FIELDS.contains(&needed), "{needed} missing");
        }
    }

    #[test]
    fn code_shape() {
        assert!(is_country_code("BR"));
        assert!(is_country_code("bra"));
        assert!(!is_country_code("B"));
        assert!(!is_country_code("../all"));
    }
}
