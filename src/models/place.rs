use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessStatus {
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
}

impl fmt::Display for BusinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BusinessStatus::Operational => "OPERATIONAL",
            BusinessStatus::ClosedTemporarily => "CLOSED_TEMPORARILY",
            BusinessStatus::ClosedPermanently => "CLOSED_PERMANENTLY",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BusinessStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPERATIONAL" => Ok(BusinessStatus::Operational),
            "CLOSED_TEMPORARILY" => Ok(BusinessStatus::ClosedTemporarily),
            "CLOSED_PERMANENTLY" => Ok(BusinessStatus::ClosedPermanently),
            _ => Err(format!("Invalid business status: '{}'", s)),
        }
    }
}

/// A candidate place as returned by a nearby search, in canonical form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub place_id: String,
    pub name: String,
    pub location: Coordinates,
    #[serde(default)]
    pub category_tags: BTreeSet<String>,
    /// `None` when the provider did not report a status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_status: Option<BusinessStatus>,
    /// Google price level, 0 (free) to 4 (very expensive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default)]
    pub vicinity_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_location_text: Option<String>,
}

impl Place {
    pub fn new<I, S>(place_id: &str, name: &str, location: Coordinates, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Place {
            place_id: place_id.to_string(),
            name: name.to_string(),
            location,
            category_tags: tags.into_iter().map(Into::into).collect(),
            business_status: None,
            price_level: None,
            rating: None,
            vicinity_text: String::new(),
            general_location_text: None,
        }
    }

    pub fn with_business_status(mut self, status: BusinessStatus) -> Self {
        self.business_status = Some(status);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.category_tags.contains(tag)
    }

    /// Explicitly reported as anything other than operational.
    pub fn is_closed(&self) -> bool {
        matches!(self.business_status, Some(status) if status != BusinessStatus::Operational)
    }
}

/// Candidate places of one segment, bucketed by how the scheduler uses them.
/// The three buckets never share a place id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinedPlaces {
    pub food: Vec<Place>,
    pub non_food: Vec<Place>,
    pub lodging: Vec<Place>,
}

impl RefinedPlaces {
    pub fn len(&self) -> usize {
        self.food.len() + self.non_food.len() + self.lodging.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Place> {
        self.food
            .iter()
            .chain(self.non_food.iter())
            .chain(self.lodging.iter())
    }
}
