use crate::cache::{CacheStats, TripCache};
use crate::error::{AppError, Result};
use crate::models::Itinerary;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Itineraries stored as JSON strings under their trip cache key.
/// `ConnectionManager` clones share one multiplexed connection.
pub struct RedisTripCache {
    connection: ConnectionManager,
    /// `None` stores entries without expiry.
    ttl_seconds: Option<u64>,
}

impl RedisTripCache {
    pub async fn new(redis_url: &str, ttl_seconds: Option<u64>) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            AppError::CacheUnavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = ConnectionManager::new(client).await.map_err(|e| {
            AppError::CacheUnavailable(format!("Failed to connect to Redis: {}", e))
        })?;

        Ok(RedisTripCache {
            connection,
            ttl_seconds,
        })
    }
}

#[async_trait]
impl TripCache for RedisTripCache {
    async fn get_trip(&self, key: &str) -> Option<Itinerary> {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<Option<String>> = conn.get(key).await;

        match result {
            Ok(Some(json)) => match serde_json::from_str::<Itinerary>(&json) {
                Ok(itinerary) => {
                    tracing::debug!(key, trip_id = %itinerary.trip_id, "Reusing stored itinerary");
                    Some(itinerary)
                }
                Err(e) => {
                    // Written by an older itinerary layout; regenerate and overwrite
                    tracing::warn!(key, "Discarding unreadable stored itinerary: {}", e);
                    let removed: redis::RedisResult<()> = conn.del(key).await;
                    if let Err(e) = removed {
                        tracing::warn!(key, "Failed to remove stored itinerary: {}", e);
                    }
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(key, "No stored itinerary for route");
                None
            }
            Err(e) => {
                tracing::warn!(key, "Redis lookup for itinerary failed: {}", e);
                None
            }
        }
    }

    async fn cache_trip(&self, key: &str, itinerary: &Itinerary) {
        let json = match serde_json::to_string(itinerary) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(trip_id = %itinerary.trip_id, "Itinerary not serializable: {}", e);
                return;
            }
        };

        let mut conn = self.connection.clone();
        let result: redis::RedisResult<()> = match self.ttl_seconds {
            Some(ttl) => conn.set_ex(key, json, ttl).await,
            None => conn.set(key, json).await,
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    key,
                    trip_id = %itinerary.trip_id,
                    activities = itinerary.activities.len(),
                    ttl_seconds = ?self.ttl_seconds,
                    "Stored itinerary in Redis"
                );
            }
            Err(e) => {
                tracing::warn!(key, trip_id = %itinerary.trip_id, "Failed to store itinerary: {}", e);
            }
        }
    }

    async fn get_stats(&self) -> CacheStats {
        let mut conn = self.connection.clone();
        let info: redis::RedisResult<String> =
            redis::cmd("INFO").arg("stats").query_async(&mut conn).await;

        match info {
            Ok(info_str) => CacheStats::from_counts(
                parse_info_value(&info_str, "keyspace_hits"),
                parse_info_value(&info_str, "keyspace_misses"),
                true,
            ),
            Err(_) => CacheStats::default(),
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        result.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

fn parse_info_value(info: &str, key: &str) -> u64 {
    info.lines()
        .find(|line| line.starts_with(key))
        .and_then(|line| line.split(':').nth(1))
        .and_then(|val| val.trim().parse().ok())
        .unwrap_or(0)
}
