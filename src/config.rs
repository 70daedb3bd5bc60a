use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Where users and favorites are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StorageBackend {
    Memory,
    DynamoDb,
}

impl StorageBackend {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "inmemory" => Ok(Self::Memory),
            "dynamodb" | "dynamo" => Ok(Self::DynamoDb),
            other => bail!("unknown STORAGE_BACKEND '{other}' (expected memory or dynamodb)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DynamoConfig {
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub users_table: String,
    pub weather_favorites_table: String,
    pub country_favorites_table: String,
}

/// Which weather backend answers weather lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WeatherProviderKind {
    OpenWeatherMap,
    WeatherApi,
}

impl WeatherProviderKind {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "openweathermap" | "openweather" => Ok(Self::OpenWeatherMap),
            "weatherapi" => Ok(Self::WeatherApi),
            other => bail!(
                "unknown WEATHER_PROVIDER '{other}' (expected openweathermap or weatherapi)"
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub weather_provider: WeatherProviderKind,
    pub openweathermap_api_key: Option<String>,
    pub openweathermap_base_url: String,
    pub weatherapi_key: Option<String>,
    pub weatherapi_base_url: String,
    pub countries_base_url: String,
    pub timeout_secs: u64,
    pub country_cache_ttl_minutes: u64,
    pub lookup_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub storage: StorageBackend,
    pub dynamo: DynamoConfig,
    pub providers: ProviderConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let jwt = JwtConfig {
            secret,
            issuer: env_or("JWT_ISSUER", "GloboClima"),
            audience: env_or("JWT_AUDIENCE", "GloboClima"),
            ttl_minutes: env_positive("JWT_TTL_MINUTES", 60)?,
        };

        let storage = StorageBackend::parse(&env_or("STORAGE_BACKEND", "memory"))?;

        let dynamo = DynamoConfig {
            region: env_or("AWS_REGION", "us-east-1"),
            endpoint: env_opt("DYNAMODB_ENDPOINT"),
            access_key: env_opt("AWS_ACCESS_KEY_ID"),
            secret_key: env_opt("AWS_SECRET_ACCESS_KEY"),
            users_table: env_or("DYNAMODB_USERS_TABLE", "GloboClima-Users"),
            weather_favorites_table: env_or(
                "DYNAMODB_WEATHER_FAVORITES_TABLE",
                "GloboClima-WeatherFavorites",
            ),
            country_favorites_table: env_or(
                "DYNAMODB_COUNTRY_FAVORITES_TABLE",
                "GloboClima-CountryFavorites",
            ),
        };

        let providers = ProviderConfig {
            weather_provider: WeatherProviderKind::parse(&env_or(
                "WEATHER_PROVIDER",
                "weatherapi",
            ))?,
            openweathermap_api_key: env_opt("OPENWEATHERMAP_API_KEY"),
            openweathermap_base_url: env_or(
                "OPENWEATHERMAP_BASE_URL",
                "https://api.openweathermap.org/data/2.5",
            ),
            weatherapi_key: env_opt("WEATHERAPI_KEY"),
            weatherapi_base_url: env_or("WEATHERAPI_BASE_URL", "https://api.weatherapi.com/v1"),
            countries_base_url: env_or("COUNTRIES_BASE_URL", "https://restcountries.com/v3.1"),
            timeout_secs: env_parse("PROVIDER_TIMEOUT_SECS", 10)?,
            country_cache_ttl_minutes: env_parse("COUNTRY_CACHE_TTL_MINUTES", 30)?,
            lookup_concurrency: env_parse("FAVORITES_LOOKUP_CONCURRENCY", 8)?,
        };

        Ok(Self {
            jwt,
            storage,
            dynamo,
            providers,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

/// Unset and blank variables are both treated as absent.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value '{raw}' for {key}: {e}")),
        None => Ok(default),
    }
}

/// Like `env_parse`, but zero and negative values are startup errors.
fn env_positive(key: &str, default: i64) -> anyhow::Result<i64> {
    let value = env_parse(key, default)?;
    if value < 1 {
        bail!("{key} must be at least 1, got {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_parses_known_values() {
        assert_eq!(StorageBackend::parse("memory").unwrap(), StorageBackend::Memory);
        assert_eq!(StorageBackend::parse(" DynamoDB ").unwrap(), StorageBackend::DynamoDb);
        assert!(StorageBackend::parse("postgres").is_err());
    }

    #[test]
    fn weather_provider_parses_known_values() {
        assert_eq!(
            WeatherProviderKind::parse("OpenWeatherMap").unwrap(),
            WeatherProviderKind::OpenWeatherMap
        );
        assert_eq!(
            WeatherProviderKind::parse("weatherapi").unwrap(),
            WeatherProviderKind::WeatherApi
        );
        let err = WeatherProviderKind::parse("accuweather").unwrap_err();
        assert!(err.to_string().contains("unknown WEATHER_PROVIDER"));
    }

    #[test]
    fn env_parse_falls_back_and_rejects_garbage() {
        std::env::set_var("GLOBOCLIMA_TEST_PARSE_OK", "42");
        std::env::set_var("GLOBOCLIMA_TEST_PARSE_BAD", "forty-two");
        assert_eq!(env_parse::<u64>("GLOBOCLIMA_TEST_PARSE_OK", 1).unwrap(), 42);
        assert_eq!(env_parse::<u64>("GLOBOCLIMA_TEST_PARSE_MISSING", 7).unwrap(), 7);
        assert!(env_parse::<u64>("GLOBOCLIMA_TEST_PARSE_BAD", 1).is_err());
    }

    #[test]
    fn token_lifetime_must_be_positive() {
        std::env::set_var("GLOBOCLIMA_TEST_TTL_ZERO", "0");
        std::env::set_var("GLOBOCLIMA_TEST_TTL_NEGATIVE", "-5");
        std::env::set_var("GLOBOCLIMA_TEST_TTL_OK", "15");
        assert!(env_positive("GLOBOCLIMA_TEST_TTL_ZERO", 60).is_err());
        let err = env_positive("GLOBOCLIMA_TEST_TTL_NEGATIVE", 60).unwrap_err();
        assert!(err.to_string().contains("must be at least 1"));
        assert_eq!(env_positive("GLOBOCLIMA_TEST_TTL_OK", 60).unwrap(), 15);
        assert_eq!(env_positive("GLOBOCLIMA_TEST_TTL_UNSET", 60).unwrap(), 60);
    }
}
