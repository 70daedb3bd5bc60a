use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::storage::Result;

/// Credential store: users keyed by id, with a secondary lookup by email.
///
/// Emails are compared in normalized form. `create` refuses a second
/// *active* user for the same email with `RepositoryError::AlreadyExists`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Returns the active user for the email if there is one, otherwise any
    /// inactive record that still carries it.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn create(&self, user: &User) -> Result<()>;

    /// Replaces the stored record and stamps `updated_at`.
    #[cfg(test)]
    async fn update(&self, user: &User) -> Result<User>;

    #[cfg(test)]
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn exists(&self, email: &str) -> Result<bool> {
        Ok(self
            .get_by_email(email)
            .await?
            .is_some_and(|u| u.is_active))
    }
}
