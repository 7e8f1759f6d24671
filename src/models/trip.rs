use crate::models::{Coordinates, DirectionsResult, Place};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// A scheduled stop in the itinerary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub place_id: String,
    pub name: String,
    pub category_tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    pub location_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_location_text: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    pub duration_minutes: u32,
}

impl Activity {
    pub fn from_place(place: &Place, start_time: OffsetDateTime, duration_minutes: u32) -> Self {
        Activity {
            place_id: place.place_id.clone(),
            name: place.name.clone(),
            category_tags: place.category_tags.clone(),
            rating: place.rating,
            price_level: place.price_level,
            location_text: place.vicinity_text.clone(),
            general_location_text: place.general_location_text.clone(),
            start_time,
            duration_minutes,
        }
    }

    pub fn end_time(&self) -> OffsetDateTime {
        self.start_time + Duration::minutes(self.duration_minutes as i64)
    }
}

/// The generated trip: chronological activities plus the driving route
/// connecting them, one directions response per routing batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub trip_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_name: Option<String>,
    pub activities: Vec<Activity>,
    pub directions: Vec<DirectionsResult>,
}

impl Itinerary {
    pub fn new(
        trip_name: Option<String>,
        activities: Vec<Activity>,
        directions: Vec<DirectionsResult>,
    ) -> Self {
        Itinerary {
            trip_id: Uuid::new_v4(),
            trip_name,
            activities,
            directions,
        }
    }
}

// Request types for API endpoints

/// Input to trip generation. Dates are unix timestamps in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub start_location: Coordinates,
    pub end_location: Coordinates,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_name: Option<String>,
    /// Not used by the generator yet; accepted so clients can send them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_people: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl TripRequest {
    pub fn new(
        start_location: Coordinates,
        end_location: Coordinates,
        start_date: i64,
        end_date: i64,
    ) -> Self {
        TripRequest {
            start_location,
            end_location,
            start_date: Some(start_date),
            end_date: Some(end_date),
            trip_name: None,
            number_of_people: None,
            budget: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.trip_name = Some(name.to_string());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        self.start_location
            .validate()
            .map_err(|e| format!("startLocation: {}", e))?;
        self.end_location
            .validate()
            .map_err(|e| format!("endLocation: {}", e))?;
        self.time_window().map(|_| ())
    }

    /// The validated `[start, end)` window.
    pub fn time_window(&self) -> Result<(OffsetDateTime, OffsetDateTime), String> {
        let start = self.start_date.ok_or("startDate is required")?;
        let end = self.end_date.ok_or("endDate is required")?;
        if start >= end {
            return Err("startDate must be before endDate".to_string());
        }

        let start = OffsetDateTime::from_unix_timestamp(start)
            .map_err(|e| format!("startDate out of range: {}", e))?;
        let end = OffsetDateTime::from_unix_timestamp(end)
            .map_err(|e| format!("endDate out of range: {}", e))?;
        Ok((start, end))
    }
}
