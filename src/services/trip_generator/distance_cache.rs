use crate::models::Place;
use std::collections::HashMap;

/// Lazily filled place-to-place distances for one segment.
#[derive(Debug, Default)]
pub struct DistanceCache {
    distances: HashMap<String, f64>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order-independent key for a pair of place ids.
    pub fn pair_key(a: &str, b: &str) -> String {
        if a <= b {
            format!("{}|{}", a, b)
        } else {
            format!("{}|{}", b, a)
        }
    }

    /// Distance in meters, computed on first request.
    pub fn distance(&mut self, a: &Place, b: &Place) -> f64 {
        if a.place_id == b.place_id {
            return 0.0;
        }
        *self
            .distances
            .entry(Self::pair_key(&a.place_id, &b.place_id))
            .or_insert_with(|| a.location.distance_to(&b.location))
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}
