pub mod classifier;
pub mod direction_batcher;
pub mod distance_cache;
pub mod scheduler;
pub mod segment_planner;

use crate::cache::{trip_cache_key, NoopTripCache, TripCache, TripWindowKey};
use crate::config::TripGeneratorConfig;
use crate::error::{AppError, Result};
use crate::models::{Itinerary, TripRequest};
use crate::services::google_directions::DirectionsProvider;
use crate::services::google_places::PlacesProvider;
use crate::services::place_fetcher::PlaceFetcher;
use crate::services::timezone::TimezoneLookup;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use classifier::refine_places;
use direction_batcher::DirectionBatcher;
use scheduler::ItineraryScheduler;
use segment_planner::plan_segments;

/// Turns a start/end/time-window request into a scheduled itinerary with
/// driving directions.
pub struct TripGenerator {
    places: Arc<dyn PlacesProvider>,
    directions: Arc<dyn DirectionsProvider>,
    timezones: Arc<dyn TimezoneLookup>,
    cache: Arc<dyn TripCache>,
    config: TripGeneratorConfig,
}

impl TripGenerator {
    pub fn new(
        places: Arc<dyn PlacesProvider>,
        directions: Arc<dyn DirectionsProvider>,
        timezones: Arc<dyn TimezoneLookup>,
        config: TripGeneratorConfig,
    ) -> Self {
        TripGenerator {
            places,
            directions,
            timezones,
            cache: Arc::new(NoopTripCache),
            config,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn TripCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<dyn TripCache> {
        &self.cache
    }

    pub fn config(&self) -> &TripGeneratorConfig {
        &self.config
    }

    /// Validate, consult the cache, and otherwise run the full pipeline:
    /// plan segments, fetch and classify places, schedule, then route.
    pub async fn generate_trip(&self, request: &TripRequest) -> Result<Itinerary> {
        request.validate().map_err(AppError::InvalidInput)?;
        let (start_time, end_time) = request.time_window().map_err(AppError::InvalidInput)?;

        let cache_key = trip_cache_key(
            &request.start_location,
            &request.end_location,
            self.config.cache_key_policy,
            &TripWindowKey {
                start: start_time,
                end: end_time,
                trip_name: request.trip_name.as_deref(),
            },
        );

        if let Some(itinerary) = self.cache.get_trip(&cache_key).await {
            tracing::info!(key = %cache_key, trip_id = %itinerary.trip_id, "Trip cache hit");
            return Ok(itinerary);
        }

        tracing::info!(
            start = ?request.start_location,
            end = ?request.end_location,
            hours = (end_time - start_time).whole_hours(),
            "Generating trip"
        );

        let plans = plan_segments(
            request.start_location,
            request.end_location,
            end_time - start_time,
            self.config.max_segment_radius_m,
        )?;

        let fetcher = PlaceFetcher::new(self.places.as_ref(), self.config.max_place_pages)
            .with_page_delay(Duration::from_millis(self.config.page_token_delay_ms));
        let centers: Vec<_> = plans.iter().map(|p| (p.center, p.radius_m)).collect();
        let raw_places = fetcher.fetch_segments(&centers).await?;

        let segments = plans
            .into_iter()
            .zip(raw_places.into_iter().map(refine_places))
            .collect();

        let mut rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scheduler = ItineraryScheduler::new(&self.config, self.timezones.as_ref());
        let activities = scheduler.schedule(segments, start_time, &mut rng);

        let mut seen = HashSet::new();
        let waypoints: Vec<String> = activities
            .iter()
            .filter(|a| seen.insert(a.place_id.as_str()))
            .map(|a| a.place_id.clone())
            .collect();

        let batcher = DirectionBatcher::new(
            self.directions.as_ref(),
            self.config.directions_batch_size,
            self.config.travel_mode,
        );
        let directions = batcher
            .fetch(request.start_location, request.end_location, &waypoints)
            .await;

        let itinerary = Itinerary::new(request.trip_name.clone(), activities, directions);
        tracing::info!(
            trip_id = %itinerary.trip_id,
            activities = itinerary.activities.len(),
            directions = itinerary.directions.len(),
            "Generated trip with {} activities",
            itinerary.activities.len()
        );

        self.cache.cache_trip(&cache_key, &itinerary).await;
        Ok(itinerary)
    }
}
