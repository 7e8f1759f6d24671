use crate::cache::{CacheStats, TripCache};
use crate::models::Itinerary;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Itineraries kept in process, bounded by entry count. Entries expire after
/// the configured TTL, or only on eviction when there is none.
pub struct MemoryTripCache {
    trips: Cache<String, Arc<Itinerary>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryTripCache {
    pub fn new(ttl_seconds: Option<u64>, max_capacity: u64) -> Self {
        let mut builder = Cache::builder().max_capacity(max_capacity);
        if let Some(ttl) = ttl_seconds {
            builder = builder.time_to_live(Duration::from_secs(ttl));
        }

        MemoryTripCache {
            trips: builder.build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl TripCache for MemoryTripCache {
    async fn get_trip(&self, key: &str) -> Option<Itinerary> {
        match self.trips.get(key).await {
            Some(itinerary) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, trip_id = %itinerary.trip_id, "Reusing stored itinerary");
                Some((*itinerary).clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, "No stored itinerary for route");
                None
            }
        }
    }

    async fn cache_trip(&self, key: &str, itinerary: &Itinerary) {
        self.trips
            .insert(key.to_string(), Arc::new(itinerary.clone()))
            .await;
        tracing::debug!(
            key,
            trip_id = %itinerary.trip_id,
            activities = itinerary.activities.len(),
            stored = self.trips.entry_count(),
            "Stored itinerary in memory"
        );
    }

    async fn get_stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            true,
        )
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
