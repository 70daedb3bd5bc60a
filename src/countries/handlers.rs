use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{AddCountryFavoriteRequest, CountryFavoriteResponse, SearchQuery};
use super::provider::Country;
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppJson},
    state::AppState,
};

pub fn country_routes() -> Router<AppState> {
    Router::new()
        .route("/countries", get(list_all))
        .route("/countries/search", get(search))
        .route("/countries/favorites", get(list_favorites).post(add_favorite))
        .route("/countries/favorites/:id", delete(remove_favorite))
        .route("/countries/:code", get(by_code))
}

#[instrument(skip(state))]
pub async fn list_all(State(state): State<AppState>) -> Json<Vec<Country>> {
    Json(state.countries.all().await)
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Country>> {
    Json(state.countries.search(&query.name).await)
}

#[instrument(skip(state))]
pub async fn by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Country>, AppError> {
    Ok(Json(state.countries.by_code(&code).await?))
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<CountryFavoriteResponse>>, AppError> {
    Ok(Json(state.countries.list_favorites(user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<AddCountryFavoriteRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let created = state.countries.add_favorite(user_id, payload).await?;
    let location = format!("/api/countries/favorites/{}", created.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(created)))
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.countries.remove_favorite(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
