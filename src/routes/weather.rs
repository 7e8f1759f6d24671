use crate::error::{AppError, Result};
use crate::models::weather::{WeatherCoordinatesQuery, WeatherForecast, WeatherLocationQuery};
use crate::models::Coordinates;
use crate::services::weatherbit::WeatherbitClient;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

fn client(state: &AppState) -> Result<&WeatherbitClient> {
    state.weather_client.as_ref().ok_or_else(|| {
        AppError::ProviderUnavailable("WEATHERBIT_API_KEY is not configured".to_string())
    })
}

/// GET /data/weather/coordinates?lat=&lng=
pub async fn forecast_by_coordinates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherCoordinatesQuery>,
) -> Result<Json<WeatherForecast>> {
    let coordinates = Coordinates::new(query.lat, query.lng).map_err(AppError::InvalidInput)?;
    let forecast = client(&state)?
        .forecast_by_coordinates(&coordinates)
        .await?;
    Ok(Json(forecast))
}

/// GET /data/weather/location?city=&country=&days=
pub async fn forecast_by_location(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherLocationQuery>,
) -> Result<Json<WeatherForecast>> {
    query.validate().map_err(AppError::InvalidInput)?;
    let forecast = client(&state)?
        .forecast_by_city(&query.city, &query.country, query.days)
        .await?;
    Ok(Json(forecast))
}
