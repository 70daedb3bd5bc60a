//! Key-value persistence for users and favorites.
//!
//! Two backends implement the repository traits (`auth::repo::UserRepository`
//! and `favorites::FavoriteStore`):
//!
//! - `inmemory`: process-local maps, used in development and tests
//! - `dynamodb`: one DynamoDB table per record kind, looked up by `Id` with a
//!   secondary index on email (users) or user id (favorites)

pub mod dynamodb;
pub mod inmemory;

pub use dynamodb::{DynamoDbFavoriteStore, DynamoDbUserRepository};
pub use inmemory::{InMemoryFavoriteStore, InMemoryUserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: &'static str, id: String },
    #[error("{entity_type} {id} already exists")]
    AlreadyExists { entity_type: &'static str, id: String },
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("malformed record: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
