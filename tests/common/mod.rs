use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use travelogue::cache::TripCache;
use travelogue::config::TripGeneratorConfig;
use travelogue::error::{AppError, Result};
use travelogue::models::{
    Coordinates, DirectionsResult, Place, RouteRequest, TripRequest,
};
use travelogue::services::google_directions::DirectionsProvider;
use travelogue::services::google_places::{NearbySearch, PlacesPage, PlacesProvider};
use travelogue::services::timezone::FixedTimezone;
use travelogue::services::trip_generator::TripGenerator;

/// 2021-04-17T06:47:26Z
#[allow(dead_code)]
pub const START_DATE: i64 = 1618642046;
/// 38 hours later
#[allow(dead_code)]
pub const END_DATE: i64 = 1618778846;

#[allow(dead_code)]
pub fn taronga() -> Coordinates {
    Coordinates::new(-33.8298, 151.2382).unwrap()
}

#[allow(dead_code)]
pub fn blacktown() -> Coordinates {
    Coordinates::new(-33.7686, 150.8776).unwrap()
}

/// Scenario 1 request: a short hop across Sydney
#[allow(dead_code)]
pub fn sydney_request() -> TripRequest {
    TripRequest::new(taronga(), blacktown(), START_DATE, END_DATE)
}

/// Tag sets cycled through by the place fixtures. The last two are
/// filtered out by classification.
const FIXTURE_TAGS: &[&[&str]] = &[
    &["cafe", "food", "establishment"],
    &["park", "point_of_interest"],
    &["museum", "point_of_interest", "establishment"],
    &["restaurant", "food"],
    &["tourist_attraction", "point_of_interest"],
    &["lodging", "point_of_interest", "establishment"],
    &["gas_station", "point_of_interest"],
    &[],
];

/// Places provider serving `count` fixtures around whatever center it is
/// asked about, split over `pages` pages.
#[allow(dead_code)]
pub struct MockPlaces {
    count: usize,
    pages: usize,
    fail_first_page: bool,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockPlaces {
    pub fn new(count: usize) -> Self {
        MockPlaces {
            count,
            pages: 1,
            fail_first_page: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages.max(1);
        self
    }

    pub fn failing() -> Self {
        MockPlaces {
            fail_first_page: true,
            ..Self::new(0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fixture(&self, center: &Coordinates, index: usize) -> Place {
        // Spread on a small grid within a few km of the center
        let row = (index / 5) as f64;
        let col = (index % 5) as f64;
        let location = Coordinates::new(center.lat + 0.01 * row - 0.02, center.lng + 0.01 * col - 0.02)
            .unwrap();
        let id = format!("{}@{:.3},{:.3}", index, center.lat, center.lng);
        Place::new(
            &id,
            &format!("Place {}", id),
            location,
            FIXTURE_TAGS[index % FIXTURE_TAGS.len()].iter().copied(),
        )
    }
}

#[async_trait]
impl PlacesProvider for MockPlaces {
    async fn search_nearby(&self, query: &NearbySearch) -> Result<PlacesPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_first_page && query.page_token.is_none() {
            return Err(AppError::ProviderUnavailable("mock places down".to_string()));
        }

        let page: usize = query
            .page_token
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);
        let per_page = self.count.div_ceil(self.pages).max(1);
        let results = (page * per_page..((page + 1) * per_page).min(self.count))
            .map(|i| self.fixture(&query.center, i))
            .collect();

        Ok(PlacesPage {
            results,
            next_page_token: (page + 1 < self.pages).then(|| (page + 1).to_string()),
        })
    }
}

/// Directions provider that records requests and fails the `fail_at`-th call.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockDirections {
    fail_at: Option<usize>,
    requests: Mutex<Vec<RouteRequest>>,
}

#[allow(dead_code)]
impl MockDirections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(call: usize) -> Self {
        MockDirections {
            fail_at: Some(call),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectionsProvider for MockDirections {
    async fn route(&self, request: &RouteRequest) -> Result<DirectionsResult> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        if Some(call) == self.fail_at {
            return Err(AppError::ProviderDegraded("mock directions down".to_string()));
        }
        let body = serde_json::json!({
            "status": "OK",
            "routes": [{
                "summary": format!("batch {}", call),
                "legs": [{"distance": {"value": 1000.0, "text": "1 km"},
                          "duration": {"value": 120.0, "text": "2 mins"}}]
            }]
        });
        serde_json::from_value(body)
            .map_err(|e| AppError::Internal(format!("bad mock directions fixture: {}", e)))
    }
}

/// Deterministic generator settings
#[allow(dead_code)]
pub fn test_config() -> TripGeneratorConfig {
    TripGeneratorConfig {
        rng_seed: Some(42),
        page_token_delay_ms: 0,
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn build_generator(
    places: Arc<MockPlaces>,
    directions: Arc<MockDirections>,
    config: TripGeneratorConfig,
    cache: Option<Arc<dyn TripCache>>,
) -> TripGenerator {
    let generator = TripGenerator::new(
        places,
        directions,
        Arc::new(FixedTimezone("Australia/Sydney".to_string())),
        config,
    );
    match cache {
        Some(cache) => generator.with_cache(cache),
        None => generator,
    }
}
