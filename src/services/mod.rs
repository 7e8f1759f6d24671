pub mod google_directions;
pub mod google_places;
pub mod place_fetcher;
pub mod timezone;
pub mod trip_generator;
pub mod weatherbit;
