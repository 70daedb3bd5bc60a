//! Maps AWS SDK errors onto `RepositoryError`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;

use crate::storage::RepositoryError;

/// Requests that never reached DynamoDB.
fn transport_error<E, R>(err: &SdkError<E, R>) -> Option<RepositoryError> {
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => Some(
            RepositoryError::ConnectionFailed("DynamoDB is unreachable".to_string()),
        ),
        _ => None,
    }
}

pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    entity_type: &'static str,
) -> RepositoryError {
    if let Some(e) = transport_error(&err) {
        return e;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(format!("{entity_type} table not found"))
        }
        GetItemError::ProvisionedThroughputExceededException(_)
        | GetItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        err => RepositoryError::QueryFailed(format!("GetItem failed: {err:?}")),
    }
}

pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
    entity_type: &'static str,
) -> RepositoryError {
    if let Some(e) = transport_error(&err) {
        return e;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(format!("{entity_type} table or index not found"))
        }
        QueryError::ProvisionedThroughputExceededException(_)
        | QueryError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        err => RepositoryError::QueryFailed(format!("Query failed: {err:?}")),
    }
}

/// `expect_existing` selects what a failed condition means: the put was an
/// update of a missing item (`NotFound`) or an insert over an existing one
/// (`AlreadyExists`).
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    entity_type: &'static str,
    id: impl Into<String>,
    expect_existing: bool,
) -> RepositoryError {
    if let Some(e) = transport_error(&err) {
        return e;
    }
    let id = id.into();
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) if expect_existing => {
            RepositoryError::NotFound { entity_type, id }
        }
        PutItemError::ConditionalCheckFailedException(_) => {
            RepositoryError::AlreadyExists { entity_type, id }
        }
        PutItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(format!("{entity_type} table not found"))
        }
        PutItemError::ProvisionedThroughputExceededException(_)
        | PutItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        err => RepositoryError::QueryFailed(format!("PutItem failed: {err:?}")),
    }
}

pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    if let Some(e) = transport_error(&err) {
        return e;
    }
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(_) => RepositoryError::NotFound {
            entity_type,
            id: id.into(),
        },
        DeleteItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(format!("{entity_type} table not found"))
        }
        DeleteItemError::ProvisionedThroughputExceededException(_)
        | DeleteItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed("Throughput exceeded, please retry".to_string())
        }
        err => RepositoryError::QueryFailed(format!("DeleteItem failed: {err:?}")),
    }
}
