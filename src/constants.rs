//! Stable application-wide constants.
//!
//! Values here are structural invariants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! For knobs that benefit from runtime experimentation, see
//! [`TripGeneratorConfig`](crate::config::TripGeneratorConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "4000";

// --- Geo ---

/// Equatorial earth radius (WGS-84) used by the haversine distance.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

// --- Segment planning ---

/// Search radius around each segment's query center, and the unit used to
/// decide how many segments a trip is split into.
pub const MAX_SEGMENT_RADIUS_METERS: f64 = 25_000.0;
/// Segment units below this resolve to a single segment.
pub const TWO_SEGMENT_UNIT_THRESHOLD: u32 = 4;
/// Segment units below this (and at least the two-segment threshold) resolve
/// to two segments; anything above resolves to four.
pub const FOUR_SEGMENT_UNIT_THRESHOLD: u32 = 8;

// --- Scheduling ---

/// Shortest sampled activity.
pub const MIN_ACTIVITY_MINUTES: u32 = 30;
/// Longest sampled activity. Also the gap at which the two walks are
/// considered to have met.
pub const MAX_ACTIVITY_MINUTES: u32 = 180;
/// Activity and travel durations are rounded up to this granularity.
pub const DURATION_ROUNDING_MINUTES: u32 = 10;
/// A food stop is forced once this long has passed since the last one.
pub const FOOD_INTERVAL_MINUTES: u32 = 180;
/// Local hour at which the day starts (inclusive).
pub const DAY_START_HOUR: u32 = 7;
/// Local hour at which the day ends (exclusive). Outside the window the
/// scheduler looks for lodging.
pub const DAY_END_HOUR: u32 = 20;
/// Minimum overnight stay.
pub const LODGING_BASE_HOURS: u32 = 7;
/// Extra hours added to an overnight stay that starts before noon.
pub const LODGING_MORNING_EXTRA_HOURS: u32 = 2;
/// Assumed average driving speed between stops.
pub const DRIVING_SPEED_KMH: f64 = 50.0;

// --- Provider limits ---

/// Google Directions accepts at most this many intermediate waypoints.
pub const MAX_WAYPOINTS_PER_REQUEST: usize = 23;
/// Maximum pages followed per nearby-search query.
pub const MAX_PLACE_PAGES: usize = 4;
/// Wait before requesting a continuation page. Google rejects a
/// `next_page_token` with INVALID_REQUEST until it becomes active.
pub const PAGE_TOKEN_DELAY_MS: u64 = 2_000;
/// Lowest and highest Google price levels.
pub const MIN_PRICE_LEVEL: u8 = 0;
pub const MAX_PRICE_LEVEL: u8 = 4;

// --- Cache defaults ---

/// Maximum entries for the in-memory trip cache (LRU eviction).
pub const DEFAULT_MEMORY_CACHE_MAX_ENTRIES: u64 = 1_000;
/// Decimal places kept for coordinates in trip cache keys (~0.1 m).
pub const CACHE_KEY_COORDINATE_DECIMALS: u32 = 6;
