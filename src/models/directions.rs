use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    /// The `mode` value understood by Google Directions.
    pub fn google_name(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.google_name())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" | "drive" => Ok(TravelMode::Driving),
            "walking" | "walk" => Ok(TravelMode::Walking),
            "bicycling" | "bike" | "cycling" => Ok(TravelMode::Bicycling),
            "transit" => Ok(TravelMode::Transit),
            _ => Err(format!("Invalid travel mode: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Metric,
    Imperial,
}

impl DistanceUnit {
    pub fn google_name(&self) -> &'static str {
        match self {
            DistanceUnit::Metric => "metric",
            DistanceUnit::Imperial => "imperial",
        }
    }
}

/// Origin or destination of a routing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEndpoint {
    Location(Coordinates),
    Place(String),
}

impl RouteEndpoint {
    /// Parameter form accepted by Google for origin, destination and waypoints.
    pub fn to_query_value(&self) -> String {
        match self {
            RouteEndpoint::Location(coords) => coords.to_query_value(),
            RouteEndpoint::Place(place_id) => format!("place_id:{}", place_id),
        }
    }
}

/// One routing call: origin to destination through `waypoints` (place ids).
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: RouteEndpoint,
    pub destination: RouteEndpoint,
    pub travel_modes: Vec<TravelMode>,
    pub waypoints: Vec<String>,
    pub unit: DistanceUnit,
}

impl RouteRequest {
    pub fn validate(&self) -> Result<(), String> {
        for endpoint in [&self.origin, &self.destination] {
            match endpoint {
                RouteEndpoint::Location(coords) => coords.validate().map_err(|e| {
                    format!(
                        "Origin and destination coordinates must be valid: {}",
                        e
                    )
                })?,
                RouteEndpoint::Place(id) if id.is_empty() => {
                    return Err("Place endpoints need a non-empty place id".to_string())
                }
                RouteEndpoint::Place(_) => {}
            }
        }
        Ok(())
    }

    pub fn waypoints_query_value(&self) -> Option<String> {
        if self.waypoints.is_empty() {
            return None;
        }
        Some(
            self.waypoints
                .iter()
                .map(|id| format!("place_id:{}", id))
                .collect::<Vec<_>>()
                .join("|"),
        )
    }
}

// Google Directions response types. Kept close to the wire format so a
// cached itinerary replays exactly what the provider returned.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectionsResult {
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geocoded_waypoints: Vec<GeocodedWaypoint>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DirectionsResult {
    /// Total driving distance across all legs of the first route.
    pub fn distance_meters(&self) -> f64 {
        self.routes
            .first()
            .map(|r| r.legs.iter().filter_map(|l| l.distance.as_ref()).map(|v| v.value).sum())
            .unwrap_or(0.0)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.routes
            .first()
            .map(|r| r.legs.iter().filter_map(|l| l.duration.as_ref()).map(|v| v.value).sum())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeocodedWaypoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectionsRoute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview_polyline: Option<Polyline>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub waypoint_order: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyrights: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteLeg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<ValueAndText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<ValueAndText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<ValueAndText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<ValueAndText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<Polyline>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueAndText {
    pub value: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Polyline {
    pub points: String,
}
