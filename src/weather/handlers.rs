use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{AddWeatherFavoriteRequest, CoordinatesQuery, WeatherFavoriteResponse};
use super::provider::WeatherReport;
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppJson},
    state::AppState,
};

pub fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/weather/coordinates", get(by_coordinates))
        .route("/weather/favorites", get(list_favorites).post(add_favorite))
        .route("/weather/favorites/:id", delete(remove_favorite))
        .route("/weather/:city", get(by_city))
}

#[instrument(skip(state))]
pub async fn by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherReport>, AppError> {
    Ok(Json(state.weather.current_by_city(&city).await?))
}

#[instrument(skip(state))]
pub async fn by_coordinates(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<WeatherReport>, AppError> {
    let (lat, lon) = query.validate()?;
    Ok(Json(state.weather.current_by_coordinates(lat, lon).await?))
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<WeatherFavoriteResponse>>, AppError> {
    Ok(Json(state.weather.list_favorites(user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<AddWeatherFavoriteRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let created = state.weather.add_favorite(user_id, payload).await?;
    let location = format!("/api/weather/favorites/{}", created.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(created)))
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.weather.remove_favorite(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
