use crate::constants::EARTH_RADIUS_METERS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        let coords = Coordinates { lat, lng };
        coords.validate()?;
        Ok(coords)
    }

    /// Range check for values that arrived through deserialization.
    pub fn validate(&self) -> Result<(), String> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                self.lat
            ));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                self.lng
            ));
        }
        Ok(())
    }

    /// Great-circle distance using the half-angle haversine formula.
    /// Returns distance in meters.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        // Rounding can push `a` just outside [0, 1] for antipodal points
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }

    /// Arithmetic mean of both components. A flat approximation, fine at
    /// segment scale but not geodesic-exact.
    pub fn midpoint(&self, other: &Coordinates) -> Coordinates {
        Coordinates {
            lat: (self.lat + other.lat) / 2.0,
            lng: (self.lng + other.lng) / 2.0,
        }
    }

    /// Round coordinates to specified decimal places for caching
    pub fn round(&self, decimal_places: u32) -> Self {
        let multiplier = 10_f64.powi(decimal_places as i32);
        Coordinates {
            lat: (self.lat * multiplier).round() / multiplier,
            lng: (self.lng * multiplier).round() / multiplier,
        }
    }

    /// `lat,lng` as expected by Google query parameters.
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}
