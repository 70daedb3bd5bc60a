use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::auth::{jwt::JwtKeys, repo::UserRepository, services::AuthService};
use crate::config::{AppConfig, StorageBackend};
use crate::countries::{
    provider::{CachedCountryProvider, CountryProvider, RestCountriesClient},
    repo_types::CountryFavorite,
    services::CountryService,
};
use crate::favorites::{FavoriteStore, Favorites};
use crate::storage::{
    dynamodb, DynamoDbFavoriteStore, DynamoDbUserRepository, InMemoryFavoriteStore,
    InMemoryUserRepository,
};
use crate::upstream::http_client;
use crate::weather::{
    provider::{provider_from_config, WeatherProvider},
    repo_types::WeatherFavorite,
    services::WeatherService,
};

#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtKeys,
    pub auth: Arc<AuthService>,
    pub weather: Arc<WeatherService>,
    pub countries: Arc<CountryService>,
}

/// Repositories for one storage backend.
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub weather_favorites: Arc<dyn FavoriteStore<WeatherFavorite>>,
    pub country_favorites: Arc<dyn FavoriteStore<CountryFavorite>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            weather_favorites: Arc::new(InMemoryFavoriteStore::<WeatherFavorite>::new()),
            country_favorites: Arc::new(InMemoryFavoriteStore::<CountryFavorite>::new()),
        }
    }

    async fn from_config(config: &AppConfig) -> Self {
        match config.storage {
            StorageBackend::Memory => {
                info!("using in-memory storage");
                Self::in_memory()
            }
            StorageBackend::DynamoDb => {
                let client = dynamodb::connect(&config.dynamo).await;
                let tables = &config.dynamo;
                Self {
                    users: Arc::new(DynamoDbUserRepository::new(
                        client.clone(),
                        &tables.users_table,
                    )),
                    weather_favorites: Arc::new(DynamoDbFavoriteStore::<WeatherFavorite>::new(
                        client.clone(),
                        &tables.weather_favorites_table,
                    )),
                    country_favorites: Arc::new(DynamoDbFavoriteStore::<CountryFavorite>::new(
                        client,
                        &tables.country_favorites_table,
                    )),
                }
            }
        }
    }
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let stores = Stores::from_config(&config).await;

        let weather_provider = provider_from_config(&config.providers)?;
        let registry = RestCountriesClient::new(
            http_client(config.providers.timeout_secs)?,
            config.providers.countries_base_url.clone(),
        );
        let country_provider = Arc::new(CachedCountryProvider::new(
            Arc::new(registry),
            Duration::from_secs(config.providers.country_cache_ttl_minutes * 60),
        ));

        Ok(Self::from_parts(
            &config,
            stores,
            weather_provider,
            country_provider,
        ))
    }

    pub fn from_parts(
        config: &AppConfig,
        stores: Stores,
        weather_provider: Arc<dyn WeatherProvider>,
        country_provider: Arc<dyn CountryProvider>,
    ) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        let concurrency = config.providers.lookup_concurrency;

        Self {
            auth: Arc::new(AuthService::new(stores.users, jwt.clone())),
            weather: Arc::new(WeatherService::new(
                weather_provider,
                Favorites::new(stores.weather_favorites, concurrency),
            )),
            countries: Arc::new(CountryService::new(
                country_provider,
                Favorites::new(stores.country_favorites, concurrency),
            )),
            jwt,
        }
    }

    /// In-memory stores, demo weather and a fixed country list.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{
            DynamoConfig, JwtConfig, ProviderConfig, WeatherProviderKind,
        };
        use crate::countries::provider::testing::{country, FakeUpstream};
        use crate::weather::provider::DemoWeatherProvider;

        let config = AppConfig {
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "GloboClima".into(),
                audience: "GloboClima".into(),
                ttl_minutes: 60,
            },
            storage: StorageBackend::Memory,
            dynamo: DynamoConfig {
                region: "us-east-1".into(),
                endpoint: None,
                access_key: None,
                secret_key: None,
                users_table: "GloboClima-Users".into(),
                weather_favorites_table: "GloboClima-WeatherFavorites".into(),
                country_favorites_table: "GloboClima-CountryFavorites".into(),
            },
            providers: ProviderConfig {
                weather_provider: WeatherProviderKind::WeatherApi,
                openweathermap_api_key: None,
                openweathermap_base_url: "http://localhost:1".into(),
                weatherapi_key: None,
                weatherapi_base_url: "http://localhost:1".into(),
                countries_base_url: "http://localhost:1".into(),
                timeout_secs: 1,
                country_cache_ttl_minutes: 30,
                lookup_concurrency: 4,
            },
        };

        let countries = Arc::new(FakeUpstream::with(vec![
            country("BR", "BRA", "Brasil", "Americas"),
            country("FR", "FRA", "França", "Europe"),
        ]));

        Self::from_parts(
            &config,
            Stores::in_memory(),
            Arc::new(DemoWeatherProvider),
            Arc::new(CachedCountryProvider::new(countries, Duration::from_secs(600))),
        )
    }
}
