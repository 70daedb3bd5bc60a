use std::sync::Arc;

use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{AddWeatherFavoriteRequest, CurrentWeather, WeatherFavoriteResponse};
use super::provider::{WeatherProvider, WeatherReport};
use super::repo_types::WeatherFavorite;
use crate::error::AppError;
use crate::favorites::Favorites;
use crate::upstream::ProviderError;

pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    favorites: Favorites<WeatherFavorite>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, favorites: Favorites<WeatherFavorite>) -> Self {
        Self {
            provider,
            favorites,
        }
    }

    #[instrument(skip(self))]
    pub async fn current_by_city(&self, city: &str) -> Result<WeatherReport, AppError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AppError::not_found("City not found"));
        }
        self.provider
            .current_by_city(city)
            .await
            .map_err(|e| not_found(e, "City not found"))
    }

    #[instrument(skip(self))]
    pub async fn current_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherReport, AppError> {
        self.provider
            .current_by_coordinates(lat, lon)
            .await
            .map_err(|e| not_found(e, "Location not found"))
    }

    pub async fn list_favorites(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WeatherFavoriteResponse>, AppError> {
        let provider = self.provider.clone();
        let listed = self
            .favorites
            .list_enriched(user_id, move |favorite| {
                let provider = provider.clone();
                async move {
                    match provider.current_by_city(&favorite.location_query()).await {
                        Ok(report) => Some(CurrentWeather::from(&report)),
                        Err(e) => {
                            warn!(
                                favorite_id = %favorite.id,
                                error = %e,
                                "weather enrichment skipped"
                            );
                            None
                        }
                    }
                }
            })
            .await?;

        Ok(listed
            .into_iter()
            .map(|(favorite, weather)| WeatherFavoriteResponse::new(favorite, weather))
            .collect())
    }

    pub async fn add_favorite(
        &self,
        user_id: Uuid,
        req: AddWeatherFavoriteRequest,
    ) -> Result<WeatherFavoriteResponse, AppError> {
        let candidate = WeatherFavorite::new(
            user_id,
            req.city_name,
            req.country_code,
            req.latitude,
            req.longitude,
        );
        match self.favorites.add(candidate).await? {
            Some(created) => Ok(WeatherFavoriteResponse::new(created, None)),
            None => Err(AppError::bad_request("City already in favorites")),
        }
    }

    pub async fn remove_favorite(&self, user_id: Uuid, favorite_id: Uuid) -> Result<(), AppError> {
        if self.favorites.remove(user_id, favorite_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Favorite not found"))
        }
    }
}

fn not_found(err: ProviderError, message: &str) -> AppError {
    if let ProviderError::Unavailable(reason) = &err {
        warn!(%reason, "weather provider unavailable");
    }
    AppError::not_found(message)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::storage::InMemoryFavoriteStore;
    use crate::weather::provider::DemoWeatherProvider;

    /// Knows every city except Atlantis.
    struct NoAtlantis;

    #[async_trait]
    impl WeatherProvider for NoAtlantis {
        fn name(&self) -> &'static str {
            "no-atlantis"
        }

        async fn current_by_city(&self, query: &str) -> Result<WeatherReport, ProviderError> {
            if query.starts_with("Atlantis") {
                return Err(ProviderError::Unavailable("timeout".into()));
            }
            DemoWeatherProvider.current_by_city(query).await
        }

        async fn current_by_coordinates(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<WeatherReport, ProviderError> {
            Err(ProviderError::NotFound)
        }
    }

    fn service() -> WeatherService {
        let store = Arc::new(InMemoryFavoriteStore::<WeatherFavorite>::new());
        WeatherService::new(Arc::new(NoAtlantis), Favorites::new(store, 2))
    }

    fn req(city: &str, cc: &str) -> AddWeatherFavoriteRequest {
        AddWeatherFavoriteRequest {
            city_name: city.into(),
            country_code: cc.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_city_is_rejected() {
        let svc = service();
        let user = Uuid::new_v4();
        svc.add_favorite(user, req("Paris", "FR")).await.unwrap();
        let err = svc.add_favorite(user, req("PARIS", "fr")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "City already in favorites"));
    }

    #[tokio::test]
    async fn listing_keeps_items_whose_lookup_failed() {
        let svc = service();
        let user = Uuid::new_v4();
        svc.add_favorite(user, req("Paris", "FR")).await.unwrap();
        svc.add_favorite(user, req("Atlantis", "GR")).await.unwrap();

        let listed = svc.list_favorites(user).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].city_name, "Paris");
        assert!(listed[0].current_weather.is_some());
        assert_eq!(listed[1].city_name, "Atlantis");
        assert!(listed[1].current_weather.is_none());
    }

    #[tokio::test]
    async fn provider_failures_surface_as_not_found() {
        let svc = service();
        assert!(matches!(
            svc.current_by_city("Atlantis").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.current_by_city("   ").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.current_by_coordinates(0.0, 0.0).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn removing_someone_elses_favorite_is_not_found() {
        let svc = service();
        let owner = Uuid::new_v4();
        let created = svc.add_favorite(owner, req("Lima", "PE")).await.unwrap();

        let err = svc
            .remove_favorite(Uuid::new_v4(), created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(svc.list_favorites(owner).await.unwrap().len(), 1);

        svc.remove_favorite(owner, created.id).await.unwrap();
        assert!(svc.list_favorites(owner).await.unwrap().is_empty());
    }
}
