mod memory;
mod redis;

pub use memory::MemoryTripCache;
pub use self::redis::RedisTripCache;

use crate::constants::CACHE_KEY_COORDINATE_DECIMALS;
use crate::models::{Coordinates, Itinerary};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Storage for completed itineraries, keyed by [`trip_cache_key`].
/// Errors are logged by implementations and never surface to callers.
#[async_trait]
pub trait TripCache: Send + Sync {
    async fn get_trip(&self, key: &str) -> Option<Itinerary>;
    async fn cache_trip(&self, key: &str, itinerary: &Itinerary);
    async fn get_stats(&self) -> CacheStats;
    async fn health_check(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

/// Stand-in used when no cache is configured. Every lookup misses.
pub struct NoopTripCache;

#[async_trait]
impl TripCache for NoopTripCache {
    async fn get_trip(&self, _key: &str) -> Option<Itinerary> {
        None
    }

    async fn cache_trip(&self, _key: &str, _itinerary: &Itinerary) {}

    async fn get_stats(&self) -> CacheStats {
        CacheStats::default()
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "none"
    }
}

/// What goes into a trip cache key.
///
/// `RouteOnly` keys on the endpoints alone: two requests with the
/// same endpoints but different dates or names share one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyPolicy {
    #[default]
    RouteOnly,
    RouteAndWindow,
}

impl fmt::Display for CacheKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKeyPolicy::RouteOnly => write!(f, "route_only"),
            CacheKeyPolicy::RouteAndWindow => write!(f, "route_and_window"),
        }
    }
}

impl FromStr for CacheKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "route_only" | "route" => Ok(CacheKeyPolicy::RouteOnly),
            "route_and_window" | "window" => Ok(CacheKeyPolicy::RouteAndWindow),
            _ => Err(format!(
                "Invalid cache key policy: {}. Use 'route_only' or 'route_and_window'",
                s
            )),
        }
    }
}

/// Time window and name, consulted only under [`CacheKeyPolicy::RouteAndWindow`].
pub struct TripWindowKey<'a> {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub trip_name: Option<&'a str>,
}

/// Deterministic key for a trip request.
/// Coordinates are rounded so float noise in the request does not miss the cache.
pub fn trip_cache_key(
    start: &Coordinates,
    end: &Coordinates,
    policy: CacheKeyPolicy,
    window: &TripWindowKey<'_>,
) -> String {
    let start = start.round(CACHE_KEY_COORDINATE_DECIMALS);
    let end = end.round(CACHE_KEY_COORDINATE_DECIMALS);
    let route = format!(
        "trip:{:.6},{:.6}:{:.6},{:.6}",
        start.lat, start.lng, end.lat, end.lng
    );

    match policy {
        CacheKeyPolicy::RouteOnly => route,
        CacheKeyPolicy::RouteAndWindow => format!(
            "{}:{}-{}:{}",
            route,
            window.start.unix_timestamp(),
            window.end.unix_timestamp(),
            window.trip_name.unwrap_or("")
        ),
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub connected: bool,
}

impl CacheStats {
    pub fn from_counts(hits: u64, misses: u64, connected: bool) -> Self {
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            connected,
        }
    }
}
