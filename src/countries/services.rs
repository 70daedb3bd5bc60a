use std::sync::Arc;

use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{AddCountryFavoriteRequest, CountryFavoriteResponse, CountryInfo};
use super::provider::{Country, CountryProvider};
use super::repo_types::CountryFavorite;
use crate::error::AppError;
use crate::favorites::Favorites;
use crate::upstream::ProviderError;

pub struct CountryService {
    provider: Arc<dyn CountryProvider>,
    favorites: Favorites<CountryFavorite>,
}

impl CountryService {
    pub fn new(provider: Arc<dyn CountryProvider>, favorites: Favorites<CountryFavorite>) -> Self {
        Self {
            provider,
            favorites,
        }
    }

    #[instrument(skip(self))]
    pub async fn by_code(&self, code: &str) -> Result<Country, AppError> {
        self.provider.by_code(code).await.map_err(|e| {
            if let ProviderError::Unavailable(reason) = &e {
                warn!(%reason, "country provider unavailable");
            }
            AppError::not_found("Country not found")
        })
    }

    /// Lists degrade to empty when the registry cannot be reached.
    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> Vec<Country> {
        self.provider
            .search_by_name(name)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "country search failed");
                Vec::new()
            })
    }

    pub async fn all(&self) -> Vec<Country> {
        self.provider.all().await.unwrap_or_else(|e| {
            warn!(error = %e, "country listing failed");
            Vec::new()
        })
    }

    pub async fn list_favorites(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CountryFavoriteResponse>, AppError> {
        let provider = self.provider.clone();
        let listed = self
            .favorites
            .list_enriched(user_id, move |favorite| {
                let provider = provider.clone();
                async move {
                    provider
                        .by_code(&favorite.country_code)
                        .await
                        .map(|country| CountryInfo::from(&country))
                        .map_err(|e| {
                            warn!(
                                favorite_id = %favorite.id,
                                error = %e,
                                "country enrichment skipped"
                            );
                        })
                        .ok()
                }
            })
            .await?;

        Ok(listed
            .into_iter()
            .map(|(favorite, info)| CountryFavoriteResponse::new(favorite, info))
            .collect())
    }

    pub async fn add_favorite(
        &self,
        user_id: Uuid,
        req: AddCountryFavoriteRequest,
    ) -> Result<CountryFavoriteResponse, AppError> {
        let candidate =
            CountryFavorite::new(user_id, req.country_code, req.country_name, req.region);
        match self.favorites.add(candidate).await? {
            Some(created) => Ok(CountryFavoriteResponse::new(created, None)),
            None => Err(AppError::bad_request("Country already in favorites")),
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
