use crate::models::{Place, RefinedPlaces};
use std::collections::HashSet;

/// Places worth stopping at. A place needs at least one of these tags.
pub const PLACES_TO_GO: &[&str] = &[
    "amusement_park",
    "aquarium",
    "art_gallery",
    "movie_theater",
    "restaurant",
    "museum",
    "park",
    "tourist_attraction",
    "zoo",
    "bakery",
    "spa",
    "cafe",
    "library",
    "night_club",
    "campground",
    "bowling_alley",
    "city_hall",
    "landmark",
    "natural_feature",
    "lodging",
    "point_of_interest",
    "establishment",
];

/// Subset of [`PLACES_TO_GO`] that counts as a meal stop.
pub const FOOD_PLACES_TO_GO: &[&str] = &["restaurant", "bakery", "cafe", "meal_takeaway"];

/// Any of these tags disqualifies a place outright.
pub const PLACES_TO_NOT_GO: &[&str] = &[
    "school",
    "primary_school",
    "secondary_school",
    "hardware_store",
    "post_box",
    "post_office",
    "veterinary_care",
    "supermarket",
    "car_repair",
    "hospital",
    "funeral_home",
    "real_estate_agency",
    "train_station",
    "transit_station",
    "taxi_stand",
    "travel_agency",
    "store",
    "car_dealer",
    "car_rental",
    "convenience_store",
    "gas_station",
    "finance",
    "home_goods_store",
    "furniture_store",
    "storage",
];

/// Tag set of a plain overnight stay. Hotels that also carry restaurant or
/// attraction tags are treated as those instead.
const LODGING_TAGS: [&str; 3] = ["lodging", "point_of_interest", "establishment"];

/// Which bucket a place belongs in, or `None` if it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceBucket {
    Food,
    NonFood,
    Lodging,
}

pub fn is_place_to_stay(place: &Place) -> bool {
    place.category_tags.len() == LODGING_TAGS.len()
        && LODGING_TAGS.iter().all(|tag| place.has_tag(tag))
}

/// Classify one place in isolation.
pub fn bucket_for(place: &Place) -> Option<PlaceBucket> {
    if place.category_tags.is_empty() || place.is_closed() {
        return None;
    }
    if PLACES_TO_NOT_GO.iter().any(|tag| place.has_tag(tag)) {
        return None;
    }
    if !PLACES_TO_GO.iter().any(|tag| place.has_tag(tag)) {
        return None;
    }

    if is_place_to_stay(place) {
        Some(PlaceBucket::Lodging)
    } else if FOOD_PLACES_TO_GO.iter().any(|tag| place.has_tag(tag)) {
        Some(PlaceBucket::Food)
    } else {
        Some(PlaceBucket::NonFood)
    }
}

/// Bucket raw search results into food / non-food / lodging.
///
/// Encounter order is kept within each bucket. The first occurrence of a
/// place id wins; later duplicates are ignored.
pub fn refine_places(places: Vec<Place>) -> RefinedPlaces {
    let mut refined = RefinedPlaces::default();
    let mut used_place_ids: HashSet<String> = HashSet::new();
    let mut dropped = 0usize;

    for place in places {
        if used_place_ids.contains(&place.place_id) {
            continue;
        }
        let Some(bucket) = bucket_for(&place) else {
            dropped += 1;
            continue;
        };

        used_place_ids.insert(place.place_id.clone());
        match bucket {
            PlaceBucket::Lodging => refined.lodging.push(place),
            PlaceBucket::Food => refined.food.push(place),
            PlaceBucket::NonFood => refined.non_food.push(place),
        }
    }

    tracing::debug!(
        food = refined.food.len(),
        non_food = refined.non_food.len(),
        lodging = refined.lodging.len(),
        dropped = dropped,
        "Classified {} places ({} dropped)",
        refined.len(),
        dropped
    );

    refined
}
