pub mod coordinates;
pub mod directions;
pub mod place;
pub mod trip;
pub mod weather;

pub use coordinates::Coordinates;
pub use directions::{DirectionsResult, DistanceUnit, RouteEndpoint, RouteRequest, TravelMode};
pub use place::{BusinessStatus, Place, RefinedPlaces};
pub use trip::{Activity, Itinerary, TripRequest};
