use crate::constants::{MAX_PRICE_LEVEL, MIN_PRICE_LEVEL};
use crate::error::{AppError, Result};
use crate::models::{BusinessStatus, Coordinates, Place};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const NEARBY_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// One page request against a nearby-search provider.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearch {
    pub center: Coordinates,
    pub radius_m: f64,
    pub query_by_price: bool,
    pub min_price: u8,
    pub max_price: u8,
    /// When set, the provider returns the continuation of an earlier query
    /// and ignores the other parameters.
    pub page_token: Option<String>,
}

impl NearbySearch {
    pub fn new(center: Coordinates, radius_m: f64, query_by_price: bool) -> Self {
        NearbySearch {
            center,
            radius_m,
            query_by_price,
            min_price: MIN_PRICE_LEVEL,
            max_price: MAX_PRICE_LEVEL,
            page_token: None,
        }
    }

    pub fn next_page(&self, token: String) -> Self {
        NearbySearch {
            page_token: Some(token),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlacesPage {
    pub results: Vec<Place>,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn search_nearby(&self, query: &NearbySearch) -> Result<PlacesPage>;
}

#[derive(Clone)]
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GooglePlacesClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, NEARBY_SEARCH_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        GooglePlacesClient {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    fn query_params(&self, query: &NearbySearch) -> Vec<(&'static str, String)> {
        let mut params = vec![("key", self.api_key.clone())];

        // A page token stands in for the whole original query
        if let Some(ref token) = query.page_token {
            params.push(("pagetoken", token.clone()));
            return params;
        }

        params.push(("location", query.center.to_query_value()));
        params.push(("radius", format!("{}", query.radius_m.round() as u64)));
        if query.query_by_price {
            params.push(("minprice", query.min_price.to_string()));
            params.push(("maxprice", query.max_price.to_string()));
        }
        params
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn search_nearby(&self, query: &NearbySearch) -> Result<PlacesPage> {
        tracing::debug!(
            lat = query.center.lat,
            lng = query.center.lng,
            radius_m = query.radius_m,
            by_price = query.query_by_price,
            continuation = query.page_token.is_some(),
            "Places nearby search"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("Places request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, "Places API HTTP error {}: {}", status, error_text);
            return Err(AppError::ProviderUnavailable(format!(
                "Places HTTP {}: {}",
                status, error_text
            )));
        }

        let body: GooglePlacesResponse = response.json().await.map_err(|e| {
            AppError::ProviderUnavailable(format!("Failed to parse places response: {}", e))
        })?;

        body.into_page()
    }
}

// Google Places response types

#[derive(Debug, Deserialize)]
struct GooglePlacesResponse {
    status: String,
    #[serde(default)]
    results: Vec<GooglePlace>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

impl GooglePlacesResponse {
    /// Google reports failures inside a 200 response.
    fn into_page(self) -> Result<PlacesPage> {
        if self.status != "OK" && self.status != "ZERO_RESULTS" {
            return Err(AppError::ProviderUnavailable(format!(
                "Places status {}: {}",
                self.status,
                self.error_message.unwrap_or_default()
            )));
        }

        Ok(PlacesPage {
            results: self
                .results
                .into_iter()
                .filter_map(GooglePlace::into_place)
                .collect(),
            next_page_token: self.next_page_token,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GooglePlace {
    place_id: String,
    #[serde(default)]
    name: String,
    geometry: GoogleGeometry,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    business_status: Option<String>,
    #[serde(default)]
    price_level: Option<u8>,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    plus_code: Option<GooglePlusCode>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: Coordinates,
}

#[derive(Debug, Deserialize)]
struct GooglePlusCode {
    #[serde(default)]
    compound_code: Option<String>,
}

impl GooglePlace {
    fn into_place(self) -> Option<Place> {
        if self.geometry.location.validate().is_err() {
            tracing::debug!(place_id = %self.place_id, "Dropping place with invalid location");
            return None;
        }

        // Unknown statuses are treated as unset rather than closed
        let business_status = self
            .business_status
            .and_then(|s| s.parse::<BusinessStatus>().ok());

        // Compound code looks like "4RQ8+XH Sydney NSW, Australia"
        let general_location_text = self
            .plus_code
            .and_then(|p| p.compound_code)
            .and_then(|code| code.split_once(' ').map(|(_, area)| area.to_string()));

        Some(Place {
            place_id: self.place_id,
            name: self.name,
            location: self.geometry.location,
            category_tags: self.types.into_iter().collect(),
            business_status,
            price_level: self.price_level,
            rating: self.rating,
            vicinity_text: self.vicinity.unwrap_or_default(),
            general_location_text,
        })
    }
}
