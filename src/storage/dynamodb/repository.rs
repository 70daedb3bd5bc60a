use std::marker::PhantomData;

use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};
use uuid::Uuid;

use super::conversions::{DynamoRecord, Item, EMAIL, ID, USER_ID};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_query_error,
};
use crate::auth::repo::UserRepository;
use crate::auth::repo_types::{normalize_email, User};
use crate::config::DynamoConfig;
use crate::favorites::{Favorite, FavoriteStore};
use crate::storage::{RepositoryError, Result};

const EMAIL_INDEX: &str = "email-index";
const USER_ID_INDEX: &str = "userId-index";

/// Build a DynamoDB client from the shared AWS config chain.
///
/// Static credentials and a custom endpoint (DynamoDB Local) are applied only
/// when configured; otherwise the default provider chain decides.
pub async fn connect(config: &DynamoConfig) -> Client {
    let mut loader = defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None,
            None,
            "static",
        ));
    }
    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint.clone());
    }

    let shared = loader.load().await;
    info!(region = %config.region, endpoint = ?config.endpoint, "dynamodb client ready");
    Client::new(&shared)
}

fn key(id: Uuid) -> (String, AttributeValue) {
    (ID.to_string(), AttributeValue::S(id.to_string()))
}

async fn get_item<T: DynamoRecord>(
    client: &Client,
    table: &str,
    id: Uuid,
    entity_type: &'static str,
) -> Result<Option<T>> {
    let (name, value) = key(id);
    let result = client
        .get_item()
        .table_name(table)
        .key(name, value)
        .send()
        .await
        .map_err(|e| map_get_item_error(e, entity_type))?;

    result.item.as_ref().map(T::from_item).transpose()
}

/// Query a secondary index by a single string key, following pagination.
async fn query_index(
    client: &Client,
    table: &str,
    index: &str,
    attribute: &str,
    value: &str,
    entity_type: &'static str,
) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    let mut start_key = None;

    loop {
        let result = client
            .query()
            .table_name(table)
            .index_name(index)
            .key_condition_expression("#k = :v")
            .expression_attribute_names("#k", attribute)
            .expression_attribute_values(":v", AttributeValue::S(value.to_string()))
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(|e| map_query_error(e, entity_type))?;

        items.extend(result.items.unwrap_or_default());
        match result.last_evaluated_key {
            Some(next) if !next.is_empty() => start_key = Some(next),
            _ => break,
        }
    }

    Ok(items)
}

async fn delete_item(
    client: &Client,
    table: &str,
    id: Uuid,
    entity_type: &'static str,
) -> Result<()> {
    let (name, value) = key(id);
    client
        .delete_item()
        .table_name(table)
        .key(name, value)
        .condition_expression("attribute_exists(Id)")
        .send()
        .await
        .map_err(|e| map_delete_item_error(e, entity_type, id.to_string()))?;
    Ok(())
}

#[derive(Clone)]
pub struct DynamoDbUserRepository {
    client: Client,
    table_name: String,
}

impl DynamoDbUserRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    async fn put(&self, user: &User, condition: &str, expect_existing: bool) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(user.to_item()?))
            .condition_expression(condition)
            .send()
            .await
            .map_err(|e| map_put_item_error(e, "User", user.id.to_string(), expect_existing))?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for DynamoDbUserRepository {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        get_item(&self.client, &self.table_name, id, "User").await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        let items = query_index(&self.client, &self.table_name, EMAIL_INDEX, EMAIL, &email, "User")
            .await?;

        let mut users = items
            .iter()
            .map(User::from_item)
            .collect::<Result<Vec<_>>>()?;
        // an active record wins over any deactivated ones sharing the email
        users.sort_by_key(|u| !u.is_active);
        Ok(users.into_iter().next())
    }

    async fn create(&self, user: &User) -> Result<()> {
        // The index lookup and the put are separate calls; two concurrent
        // registrations for one email can both pass this check.
        if self.exists(&user.email).await? {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: normalize_email(&user.email),
            });
        }
        self.put(user, "attribute_not_exists(Id)", false).await?;
        debug!(user_id = %user.id, "user stored");
        Ok(())
    }

    #[cfg(test)]
    async fn update(&self, user: &User) -> Result<User> {
        let mut updated = user.clone();
        updated.email = normalize_email(&user.email);
        updated.updated_at = Some(time::OffsetDateTime::now_utc());
        self.put(&updated, "attribute_exists(Id)", true).await?;
        Ok(updated)
    }

    #[cfg(test)]
    async fn delete(&self, id: Uuid) -> Result<()> {
        delete_item(&self.client, &self.table_name, id, "User").await
    }
}

/// One table per favorite kind, keyed by `Id` with a `userId-index`.
pub struct DynamoDbFavoriteStore<F> {
    client: Client,
    table_name: String,
    _record: PhantomData<fn() -> F>,
}

impl<F> Clone for DynamoDbFavoriteStore<F> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            table_name: self.table_name.clone(),
            _record: PhantomData,
        }
    }
}

impl<F> DynamoDbFavoriteStore<F> {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<F: Favorite + DynamoRecord> FavoriteStore<F> for DynamoDbFavoriteStore<F> {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<F>> {
        get_item(&self.client, &self.table_name, id, F::KIND).await
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<F>> {
        let items = query_index(
            &self.client,
            &self.table_name,
            USER_ID_INDEX,
            USER_ID,
            &user_id.to_string(),
            F::KIND,
        )
        .await?;

        let mut favorites = items
            .iter()
            .map(F::from_item)
            .collect::<Result<Vec<_>>>()?;
        // index order is unspecified
        favorites.sort_by_key(|f| f.added_at());
        Ok(favorites)
    }

    async fn create(&self, favorite: &F) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(favorite.to_item()?))
            .condition_expression("attribute_not_exists(Id)")
            .send()
            .await
            .map_err(|e| map_put_item_error(e, F::KIND, favorite.id().to_string(), false))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        delete_item(&self.client, &self.table_name, id, F::KIND).await
    }
}
