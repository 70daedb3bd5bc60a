//! Favorites use case shared by the weather and country lists.
//!
//! A favorite either exists or it does not: it is created once after a
//! per-user uniqueness check and removed after an ownership check. Reads are
//! enriched with a live provider lookup per item.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::storage::{RepositoryError, Result};

/// A user-owned saved reference.
pub trait Favorite: Clone + Send + Sync + 'static {
    /// Entity name used in logs and storage errors.
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn user_id(&self) -> Uuid;
    fn added_at(&self) -> OffsetDateTime;

    /// Whether both records name the same thing, case-insensitively.
    /// Ownership is not part of the key.
    fn same_key(&self, other: &Self) -> bool;
}

/// Favorites keyed by id with a secondary index on user id.
#[async_trait]
pub trait FavoriteStore<F: Favorite>: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<F>>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<F>>;
    async fn create(&self, favorite: &F) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// True when the candidate's owner already has a favorite with its key.
    async fn exists(&self, candidate: &F) -> Result<bool> {
        Ok(self
            .list_by_user(candidate.user_id())
            .await?
            .iter()
            .any(|f| f.same_key(candidate)))
    }
}

pub struct Favorites<F: Favorite> {
    store: Arc<dyn FavoriteStore<F>>,
    lookup_concurrency: usize,
}

impl<F: Favorite> Clone for Favorites<F> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            lookup_concurrency: self.lookup_concurrency,
        }
    }
}

impl<F: Favorite> Favorites<F> {
    pub fn new(store: Arc<dyn FavoriteStore<F>>, lookup_concurrency: usize) -> Self {
        Self {
            store,
            lookup_concurrency: lookup_concurrency.max(1),
        }
    }

    /// Persist `candidate` unless its owner already has one with the same key.
    /// `Ok(None)` means "already a favorite". The store has the last word:
    /// a create it refuses as a duplicate also yields `Ok(None)`.
    pub async fn add(&self, candidate: F) -> Result<Option<F>> {
        if self.store.exists(&candidate).await? {
            debug!(kind = F::KIND, user_id = %candidate.user_id(), "favorite already present");
            return Ok(None);
        }
        match self.store.create(&candidate).await {
            Ok(()) => {}
            Err(RepositoryError::AlreadyExists { .. }) => {
                debug!(
                    kind = F::KIND,
                    user_id = %candidate.user_id(),
                    "favorite added concurrently"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
        info!(
            kind = F::KIND,
            user_id = %candidate.user_id(),
            favorite_id = %candidate.id(),
            "favorite added"
        );
        Ok(Some(candidate))
    }

    /// All of the user's favorites in store order, each paired with the result
    /// of `lookup`. Lookups run concurrently, at most `lookup_concurrency` at a
    /// time; a `None` only drops that item's enrichment.
    pub async fn list_enriched<E, L, Fut>(
        &self,
        user_id: Uuid,
        lookup: L,
    ) -> Result<Vec<(F, Option<E>)>>
    where
        L: Fn(F) -> Fut,
        Fut: Future<Output = Option<E>>,
    {
        let favorites = self.store.list_by_user(user_id).await?;
        let pending = favorites.into_iter().map(|favorite| {
            let enrichment = lookup(favorite.clone());
            async move { (favorite, enrichment.await) }
        });

        Ok(stream::iter(pending)
            .buffered(self.lookup_concurrency)
            .collect()
            .await)
    }

    /// Delete a favorite the user owns. Missing and foreign-owned favorites
    /// both come back as `false`.
    pub async fn remove(&self, user_id: Uuid, favorite_id: Uuid) -> Result<bool> {
        match self.store.get_by_id(favorite_id).await? {
            Some(favorite) if favorite.user_id() == user_id => {
                self.store.delete(favorite_id).await?;
                info!(kind = F::KIND, %user_id, %favorite_id, "favorite removed");
                Ok(true)
            }
            _ => {
                debug!(kind = F::KIND, %user_id, %favorite_id, "favorite not found for user");
                Ok(false)
            }
        }
    }
}
