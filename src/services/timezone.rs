use crate::models::Coordinates;
use chrono::{DateTime, Timelike};
use chrono_tz::Tz;
use time::OffsetDateTime;

/// Resolves the IANA time zone that governs a coordinate.
pub trait TimezoneLookup: Send + Sync {
    fn timezone_for(&self, coordinates: &Coordinates) -> Option<String>;
}

/// Offline lookup against the bundled time zone map.
#[derive(Debug, Clone, Copy, Default)]
pub struct TzSearchLookup;

impl TimezoneLookup for TzSearchLookup {
    fn timezone_for(&self, coordinates: &Coordinates) -> Option<String> {
        tz_search::lookup(coordinates.lat, coordinates.lng)
    }
}

/// Always answers with the same zone. Useful when every stop is known to
/// share one zone.
#[derive(Debug, Clone)]
pub struct FixedTimezone(pub String);

impl TimezoneLookup for FixedTimezone {
    fn timezone_for(&self, _coordinates: &Coordinates) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Local wall-clock hour (0-23) at `coordinates` for the given instant.
/// Unknown or unparseable zones fall back to UTC.
pub fn local_hour(
    lookup: &dyn TimezoneLookup,
    coordinates: &Coordinates,
    instant: OffsetDateTime,
) -> u32 {
    let tz: Tz = match lookup.timezone_for(coordinates) {
        Some(name) => name.parse().unwrap_or_else(|_| {
            tracing::debug!(zone = %name, "Unknown time zone, using UTC");
            chrono_tz::UTC
        }),
        None => chrono_tz::UTC,
    };

    match DateTime::from_timestamp(instant.unix_timestamp(), 0) {
        Some(utc) => utc.with_timezone(&tz).hour(),
        None => instant.hour() as u32,
    }
}
