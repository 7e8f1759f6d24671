use crate::cache::CacheKeyPolicy;
use crate::constants::*;
use crate::models::TravelMode;
use std::env;
use std::str::FromStr;

/// Which trip cache implementation the server wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
    None,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            "none" | "off" | "disabled" => Ok(CacheBackend::None),
            _ => Err(format!(
                "Invalid cache backend: {}. Use 'redis', 'memory' or 'none'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub google_places_api_key: String,
    pub google_directions_api_key: String,
    pub weatherbit_api_key: Option<String>,
    pub redis_url: Option<String>,
    pub cache_backend: CacheBackend,
    /// `None` keeps cached trips until evicted.
    pub trip_cache_ttl: Option<u64>,
    pub trip_generator: TripGeneratorConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripGeneratorConfig {
    /// Place search radius around each segment center, and the distance unit
    /// used to decide the segment count
    pub max_segment_radius_m: f64,

    /// Bounds of the uniformly sampled activity duration
    pub min_activity_minutes: u32,
    pub max_activity_minutes: u32,

    /// Activity and travel durations are rounded up to a multiple of this
    pub duration_rounding_minutes: u32,

    /// Time without a food stop after which the next pick is food
    pub food_interval_minutes: u32,

    /// Local-time window in which activities are scheduled; outside it the
    /// scheduler books lodging
    pub day_start_hour: u32,
    pub day_end_hour: u32,

    /// Overnight stay length before the time-of-day extension
    pub lodging_base_hours: u32,
    pub lodging_morning_extra_hours: u32,

    /// Speed used to estimate travel time between stops
    pub driving_speed_kmh: f64,

    /// Waypoints per directions request (provider limit is 23)
    pub directions_batch_size: usize,

    /// Pages followed per nearby-search query
    pub max_place_pages: usize,

    /// Pause before each continuation page of a nearby search
    pub page_token_delay_ms: u64,

    pub travel_mode: TravelMode,

    /// Whether trip cache keys include the time window and name
    pub cache_key_policy: CacheKeyPolicy,

    /// Fixed seed for activity durations; random per request when unset
    pub rng_seed: Option<u64>,
}

impl Default for TripGeneratorConfig {
    fn default() -> Self {
        Self {
            max_segment_radius_m: MAX_SEGMENT_RADIUS_METERS,
            min_activity_minutes: MIN_ACTIVITY_MINUTES,
            max_activity_minutes: MAX_ACTIVITY_MINUTES,
            duration_rounding_minutes: DURATION_ROUNDING_MINUTES,
            food_interval_minutes: FOOD_INTERVAL_MINUTES,
            day_start_hour: DAY_START_HOUR,
            day_end_hour: DAY_END_HOUR,
            lodging_base_hours: LODGING_BASE_HOURS,
            lodging_morning_extra_hours: LODGING_MORNING_EXTRA_HOURS,
            driving_speed_kmh: DRIVING_SPEED_KMH,
            directions_batch_size: MAX_WAYPOINTS_PER_REQUEST,
            max_place_pages: MAX_PLACE_PAGES,
            page_token_delay_ms: PAGE_TOKEN_DELAY_MS,
            travel_mode: TravelMode::Driving,
            cache_key_policy: CacheKeyPolicy::default(),
            rng_seed: None,
        }
    }
}

/// Read `key`, falling back to `default` when unset.
fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| format!("Invalid {}", key)),
        Err(_) => Ok(default),
    }
}

fn env_opt<T: FromStr>(key: &str) -> Result<Option<T>, String> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("Invalid {}", key)),
        _ => Ok(None),
    }
}

impl TripGeneratorConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            max_segment_radius_m: env_or("TRIP_MAX_SEGMENT_RADIUS_M", defaults.max_segment_radius_m)?,
            min_activity_minutes: env_or("TRIP_MIN_ACTIVITY_MINUTES", defaults.min_activity_minutes)?,
            max_activity_minutes: env_or("TRIP_MAX_ACTIVITY_MINUTES", defaults.max_activity_minutes)?,
            duration_rounding_minutes: env_or(
                "TRIP_DURATION_ROUNDING_MINUTES",
                defaults.duration_rounding_minutes,
            )?,
            food_interval_minutes: env_or("TRIP_FOOD_INTERVAL_MINUTES", defaults.food_interval_minutes)?,
            day_start_hour: env_or("TRIP_DAY_START_HOUR", defaults.day_start_hour)?,
            day_end_hour: env_or("TRIP_DAY_END_HOUR", defaults.day_end_hour)?,
            lodging_base_hours: env_or("TRIP_LODGING_BASE_HOURS", defaults.lodging_base_hours)?,
            lodging_morning_extra_hours: env_or(
                "TRIP_LODGING_MORNING_EXTRA_HOURS",
                defaults.lodging_morning_extra_hours,
            )?,
            driving_speed_kmh: env_or("TRIP_DRIVING_SPEED_KMH", defaults.driving_speed_kmh)?,
            directions_batch_size: env_or("TRIP_DIRECTIONS_BATCH_SIZE", defaults.directions_batch_size)?,
            max_place_pages: env_or("TRIP_MAX_PLACE_PAGES", defaults.max_place_pages)?,
            page_token_delay_ms: env_or("TRIP_PAGE_TOKEN_DELAY_MS", defaults.page_token_delay_ms)?,
            travel_mode: env::var("TRIP_TRAVEL_MODE")
                .unwrap_or_else(|_| defaults.travel_mode.to_string())
                .parse()?,
            cache_key_policy: env::var("TRIP_CACHE_KEY_POLICY")
                .unwrap_or_else(|_| defaults.cache_key_policy.to_string())
                .parse()?,
            rng_seed: env_opt("TRIP_RNG_SEED")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.max_segment_radius_m.is_finite() && self.max_segment_radius_m > 0.0) {
            return Err("TRIP_MAX_SEGMENT_RADIUS_M must be positive".to_string());
        }
        if self.min_activity_minutes == 0 || self.min_activity_minutes > self.max_activity_minutes {
            return Err(
                "TRIP_MIN_ACTIVITY_MINUTES must be positive and not above TRIP_MAX_ACTIVITY_MINUTES"
                    .to_string(),
            );
        }
        if self.duration_rounding_minutes == 0 {
            return Err("TRIP_DURATION_ROUNDING_MINUTES must be positive".to_string());
        }
        if self.day_start_hour >= self.day_end_hour || self.day_end_hour > 24 {
            return Err("TRIP_DAY_START_HOUR must be before TRIP_DAY_END_HOUR (max 24)".to_string());
        }
        if !(self.driving_speed_kmh.is_finite() && self.driving_speed_kmh > 0.0) {
            return Err("TRIP_DRIVING_SPEED_KMH must be positive".to_string());
        }
        if !(1..=MAX_WAYPOINTS_PER_REQUEST).contains(&self.directions_batch_size) {
            return Err(format!(
                "TRIP_DIRECTIONS_BATCH_SIZE must be between 1 and {}",
                MAX_WAYPOINTS_PER_REQUEST
            ));
        }
        if self.max_place_pages == 0 {
            return Err("TRIP_MAX_PLACE_PAGES must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let google_places_api_key =
            env::var("GOOGLE_PLACES_API_KEY").map_err(|_| "GOOGLE_PLACES_API_KEY must be set")?;
        let google_directions_api_key =
            env::var("GOOGLE_DIRECTIONS_API_KEY").unwrap_or_else(|_| google_places_api_key.clone());
        let redis_url = env::var("REDIS_URL").ok();

        let cache_backend = match env::var("TRIP_CACHE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) if redis_url.is_some() => CacheBackend::Redis,
            Err(_) => CacheBackend::Memory,
        };
        if cache_backend == CacheBackend::Redis && redis_url.is_none() {
            return Err("TRIP_CACHE_BACKEND=redis requires REDIS_URL".to_string());
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            google_places_api_key,
            google_directions_api_key,
            weatherbit_api_key: env::var("WEATHERBIT_API_KEY").ok(),
            redis_url,
            cache_backend,
            trip_cache_ttl: env_opt("TRIP_CACHE_TTL")?,
            trip_generator: TripGeneratorConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
