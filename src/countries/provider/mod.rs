use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::upstream::ProviderError;

pub mod cache;
pub mod restcountries;

pub use cache::CachedCountryProvider;
pub use restcountries::RestCountriesClient;

/// A country as served by REST Countries v3.1, reduced to the fields the API
/// exposes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Country {
    pub name: CountryName,
    pub cca2: String,
    pub cca3: String,
    pub capital: Vec<String>,
    pub region: String,
    pub subregion: String,
    pub languages: BTreeMap<String, String>,
    pub currencies: BTreeMap<String, Currency>,
    pub population: u64,
    pub area: f64,
    pub flag: String,
    pub flags: Flags,
    pub latlng: Vec<f64>,
    pub timezones: Vec<String>,
    pub continents: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CountryName {
    pub common: String,
    pub official: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Currency {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Flags {
    pub png: String,
    pub svg: String,
    pub alt: String,
}

impl Country {
    /// Matches alpha-2 or alpha-3, ignoring case.
    pub fn has_code(&self, code: &str) -> bool {
        self.cca2.eq_ignore_ascii_case(code) || self.cca3.eq_ignore_ascii_case(code)
    }

    /// Substring match on common or official name, ignoring case.
    pub fn name_contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.common.to_lowercase().contains(&needle)
            || self.name.official.to_lowercase().contains(&needle)
    }
}

#[async_trait]
pub trait CountryProvider: Send + Sync {
    async fn by_code(&self, code: &str) -> Result<Country, ProviderError>;
    async fn search_by_name(&self, name: &str) -> Result<Vec<Country>, ProviderError>;
    async fn all(&self) -> Result<Vec<Country>, ProviderError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    pub fn country(cca2: &str, cca3: &str, common: &str, region: &str) -> Country {
        Country {
            name: CountryName {
                common: common.into(),
                official: format!("Republic of {common}"),
            },
            cca2: cca2.into(),
            cca3: cca3.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    /// In-memory upstream that counts calls and can be switched off.
    #[derive(Default)]
    pub struct FakeUpstream {
        pub countries: Vec<Country>,
        pub all_calls: AtomicUsize,
        pub direct_calls: AtomicUsize,
        pub down: AtomicBool,
    }

    impl FakeUpstream {
        pub fn with(countries: Vec<Country>) -> Self {
            Self {
                countries,
                ..Default::default()
            }
        }

        pub fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), ProviderError> {
            if self.down.load(Ordering::SeqCst) {
                Err(ProviderError::Unavailable("fake upstream down".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CountryProvider for FakeUpstream {
        async fn by_code(&self, code: &str) -> Result<Country, ProviderError> {
            self.direct_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.countries
                .iter()
                .find(|c| c.has_code(code))
                .cloned()
                .ok_or(ProviderError::NotFound)
        }

        async fn search_by_name(&self, name: &str) -> Result<Vec<Country>, ProviderError> {
            self.direct_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self
                .countries
                .iter()
                .filter(|c| c.name_contains(name))
                .cloned()
                .collect())
        }

        async fn all(&self) -> Result<Vec<Country>, ProviderError> {
            self.all_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.countries.clone())
        }
    }
}
