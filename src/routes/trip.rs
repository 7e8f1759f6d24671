use crate::error::Result;
use crate::models::{Itinerary, TripRequest};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// POST /trips
/// Generate an itinerary between two points for the given time window
pub async fn create_trip(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TripRequest>,
) -> Result<(StatusCode, Json<Itinerary>)> {
    tracing::info!(
        start_lat = request.start_location.lat,
        start_lng = request.start_location.lng,
        end_lat = request.end_location.lat,
        end_lng = request.end_location.lng,
        "Trip request: ({:.4}, {:.4}) -> ({:.4}, {:.4})",
        request.start_location.lat,
        request.start_location.lng,
        request.end_location.lat,
        request.end_location.lng
    );

    let itinerary = state.trip_generator.generate_trip(&request).await?;
    Ok((StatusCode::CREATED, Json(itinerary)))
}
