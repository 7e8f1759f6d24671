pub mod debug;
pub mod trip;
pub mod weather;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/trips", post(trip::create_trip))
        .route("/data/weather/coordinates", get(weather::forecast_by_coordinates))
        .route("/data/weather/location", get(weather::forecast_by_location))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
