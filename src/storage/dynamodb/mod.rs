//! DynamoDB-backed repositories.

pub mod conversions;
pub mod error;
pub mod repository;

pub use repository::{connect, DynamoDbFavoriteStore, DynamoDbUserRepository};
