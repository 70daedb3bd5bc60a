//! In-memory repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::UserRepository;
use crate::auth::repo_types::{normalize_email, User};
use crate::favorites::{Favorite, FavoriteStore};
use crate::storage::{RepositoryError, Result};

#[derive(Debug, Default)]
struct UserTables {
    by_id: HashMap<Uuid, User>,
    // normalized email -> id of the record that currently owns it
    by_email: HashMap<String, Uuid>,
}

/// Credential store backed by process memory.
///
/// Both maps sit behind one lock so the email uniqueness check and the
/// insert happen atomically.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<UserTables>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.by_id.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_email
            .get(&normalize_email(email))
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        let email = normalize_email(&user.email);

        if tables.by_id.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.id.to_string(),
            });
        }
        let taken = tables
            .by_email
            .get(&email)
            .and_then(|id| tables.by_id.get(id))
            .is_some_and(|existing| existing.is_active);
        if taken {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: email,
            });
        }

        tables.by_email.insert(email, user.id);
        tables.by_id.insert(user.id, user.clone());
        Ok(())
    }

    #[cfg(test)]
    async fn update(&self, user: &User) -> Result<User> {
        let mut tables = self.tables.write().await;
        let Some(previous) = tables.by_id.get(&user.id).cloned() else {
            return Err(RepositoryError::NotFound {
                entity_type: "User",
                id: user.id.to_string(),
            });
        };

        let mut updated = user.clone();
        updated.email = normalize_email(&user.email);
        updated.updated_at = Some(time::OffsetDateTime::now_utc());

        if previous.email != updated.email {
            if tables.by_email.get(&previous.email) == Some(&user.id) {
                tables.by_email.remove(&previous.email);
            }
            tables.by_email.insert(updated.email.clone(), user.id);
        }
        tables.by_id.insert(user.id, updated.clone());
        Ok(updated)
    }

    #[cfg(test)]
    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.by_id.remove(&id) else {
            return Err(RepositoryError::NotFound {
                entity_type: "User",
                id: id.to_string(),
            });
        };
        if tables.by_email.get(&user.email) == Some(&id) {
            tables.by_email.remove(&user.email);
        }
        Ok(())
    }
}

/// Favorite store backed by process memory. Listing returns insertion order.
#[derive(Debug)]
pub struct InMemoryFavoriteStore<F> {
    records: Arc<RwLock<Vec<F>>>,
}

impl<F> Clone for InMemoryFavoriteStore<F> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<F> Default for InMemoryFavoriteStore<F> {
    fn default() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<F> InMemoryFavoriteStore<F> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<F: Favorite> FavoriteStore<F> for InMemoryFavoriteStore<F> {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<F>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|f| f.id() == id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<F>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|f| f.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, favorite: &F) -> Result<()> {
        let mut records = self.records.write().await;
        // key uniqueness is re-checked under the write lock
        let taken = records.iter().any(|f| {
            f.id() == favorite.id()
                || (f.user_id() == favorite.user_id() && f.same_key(favorite))
        });
        if taken {
            return Err(RepositoryError::AlreadyExists {
                entity_type: F::KIND,
                id: favorite.id().to_string(),
            });
        }
        records.push(favorite.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|f| f.id() != id);
        if records.len() == before {
            return Err(RepositoryError::NotFound {
                entity_type: F::KIND,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::repo_types::CountryFavorite;

    fn user(email: &str) -> User {
        User::new(email, "hash".into(), "Ada", "Lovelace")
    }

    #[tokio::test]
    async fn email_lookup_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        let ada = user("Ada@Example.com");
        repo.create(&ada).await.unwrap();

        let found = repo.get_by_email("ADA@example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, ada.id);
        assert_eq!(found.email, "ada@example.com");
        assert!(repo.exists(" ada@example.com ").await.unwrap());
    }

    #[tokio::test]
    async fn second_active_user_with_same_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(&user("a@x.com")).await.unwrap();
        let err = repo.create(&user("A@X.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn inactive_user_releases_email() {
        let repo = InMemoryUserRepository::new();
        let mut old = user("a@x.com");
        repo.create(&old).await.unwrap();
        old.is_active = false;
        let stored = repo.update(&old).await.unwrap();
        assert!(stored.updated_at.is_some());
        assert!(!repo.exists("a@x.com").await.unwrap());

        let fresh = user("a@x.com");
        repo.create(&fresh).await.unwrap();
        let found = repo.get_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, fresh.id);
    }

    #[tokio::test]
    async fn update_moves_email_index_and_delete_clears_it() {
        let repo = InMemoryUserRepository::new();
        let mut ada = user("ada@x.com");
        repo.create(&ada).await.unwrap();

        ada.email = "Countess@X.com".into();
        repo.update(&ada).await.unwrap();
        assert!(repo.get_by_email("ada@x.com").await.unwrap().is_none());
        assert!(repo.get_by_email("countess@x.com").await.unwrap().is_some());

        repo.delete(ada.id).await.unwrap();
        assert!(repo.get_by_id(ada.id).await.unwrap().is_none());
        assert!(repo.get_by_email("countess@x.com").await.unwrap().is_none());
        assert!(matches!(
            repo.delete(ada.id).await.unwrap_err(),
            RepositoryError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn favorites_are_scoped_to_their_owner() {
        let store = InMemoryFavoriteStore::<CountryFavorite>::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store
            .create(&CountryFavorite::new(a, "br", "Brasil", "Americas"))
            .await
            .unwrap();
        store
            .create(&CountryFavorite::new(b, "JP", "Japão", "Asia"))
            .await
            .unwrap();

        let listed = store.list_by_user(a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].country_code, "BR");

        let same_key = CountryFavorite::new(a, "BR", "Brazil", "");
        assert!(store.exists(&same_key).await.unwrap());
        let other = CountryFavorite::new(b, "BR", "Brazil", "");
        assert!(!store.exists(&other).await.unwrap());
    }

    #[tokio::test]
    async fn create_refuses_a_second_favorite_with_the_same_key() {
        let store = InMemoryFavoriteStore::<CountryFavorite>::new();
        let user = Uuid::new_v4();
        store
            .create(&CountryFavorite::new(user, "BR", "Brasil", "Americas"))
            .await
            .unwrap();

        let err = store
            .create(&CountryFavorite::new(user, "br", "Brazil", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { .. }));
        assert_eq!(store.list_by_user(user).await.unwrap().len(), 1);
    }
}
