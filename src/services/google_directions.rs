use crate::error::{AppError, Result};
use crate::models::{DirectionsResult, RouteRequest};
use async_trait::async_trait;
use reqwest::Client;

const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn route(&self, request: &RouteRequest) -> Result<DirectionsResult>;
}

#[derive(Clone)]
pub struct GoogleDirectionsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleDirectionsClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DIRECTIONS_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        GoogleDirectionsClient {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    fn query_params(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("key", self.api_key.clone()),
            ("origin", request.origin.to_query_value()),
            ("destination", request.destination.to_query_value()),
            ("units", request.unit.google_name().to_string()),
        ];

        if !request.travel_modes.is_empty() {
            let modes = request
                .travel_modes
                .iter()
                .map(|m| m.google_name())
                .collect::<Vec<_>>()
                .join("|");
            params.push(("mode", modes));
        }
        if let Some(waypoints) = request.waypoints_query_value() {
            params.push(("waypoints", waypoints));
        }
        params
    }
}

#[async_trait]
impl DirectionsProvider for GoogleDirectionsClient {
    async fn route(&self, request: &RouteRequest) -> Result<DirectionsResult> {
        request.validate().map_err(AppError::InvalidInput)?;

        tracing::debug!(
            waypoints = request.waypoints.len(),
            origin = %request.origin.to_query_value(),
            destination = %request.destination.to_query_value(),
            "Directions request with {} waypoints",
            request.waypoints.len()
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(request))
            .send()
            .await
            .map_err(|e| AppError::ProviderDegraded(format!("Directions request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                waypoints = request.waypoints.len(),
                "Directions API HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::ProviderDegraded(format!(
                "Directions HTTP {}: {}",
                status, error_text
            )));
        }

        let directions: DirectionsResult = response.json().await.map_err(|e| {
            AppError::ProviderDegraded(format!("Failed to parse directions response: {}", e))
        })?;

        check_status(directions)
    }
}

/// Google reports failures (`MAX_WAYPOINTS_EXCEEDED`, `NOT_FOUND`, ...) inside
/// a 200 response.
fn check_status(directions: DirectionsResult) -> Result<DirectionsResult> {
    match directions.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(directions),
        status => Err(AppError::ProviderDegraded(format!(
            "Directions status {}: {}",
            status,
            directions.error_message.as_deref().unwrap_or("")
        ))),
    }
}
