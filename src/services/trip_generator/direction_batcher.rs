use crate::models::{Coordinates, DirectionsResult, DistanceUnit, RouteEndpoint, RouteRequest, TravelMode};
use crate::services::google_directions::DirectionsProvider;

/// Splits a long waypoint list into routing calls the provider accepts and
/// chains them end to start.
pub struct DirectionBatcher<'a> {
    provider: &'a dyn DirectionsProvider,
    batch_size: usize,
    travel_mode: TravelMode,
}

impl<'a> DirectionBatcher<'a> {
    pub fn new(provider: &'a dyn DirectionsProvider, batch_size: usize, travel_mode: TravelMode) -> Self {
        DirectionBatcher {
            provider,
            batch_size: batch_size.max(1),
            travel_mode,
        }
    }

    /// One request per chunk of `batch_size` waypoints.
    ///
    /// Every chunk but the last ends at its own final waypoint, which then
    /// becomes the next origin. The last chunk ends at `end`.
    pub fn plan_requests(
        &self,
        start: Coordinates,
        end: Coordinates,
        waypoints: &[String],
    ) -> Vec<RouteRequest> {
        let chunks: Vec<&[String]> = waypoints.chunks(self.batch_size).collect();
        let count = chunks.len();
        let mut origin = RouteEndpoint::Location(start);
        let mut requests = Vec::with_capacity(count);

        for (index, chunk) in chunks.into_iter().enumerate() {
            let (destination, stops) = if index + 1 == count {
                (RouteEndpoint::Location(end), chunk)
            } else {
                let (last, rest) = match chunk.split_last() {
                    Some(split) => split,
                    None => continue,
                };
                (RouteEndpoint::Place(last.clone()), rest)
            };

            requests.push(RouteRequest {
                origin: origin.clone(),
                destination: destination.clone(),
                travel_modes: vec![self.travel_mode],
                waypoints: stops.to_vec(),
                unit: DistanceUnit::Metric,
            });
            origin = destination;
        }

        requests
    }

    /// Issue the planned requests in order. The first failure ends batching
    /// and whatever succeeded so far is returned.
    pub async fn fetch(
        &self,
        start: Coordinates,
        end: Coordinates,
        waypoints: &[String],
    ) -> Vec<DirectionsResult> {
        let requests = self.plan_requests(start, end, waypoints);
        let planned = requests.len();
        let mut results = Vec::with_capacity(planned);

        for (index, request) in requests.iter().enumerate() {
            match self.provider.route(request).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!(
                        batch = index,
                        planned = planned,
                        "Directions batch {} of {} failed, returning partial route: {}",
                        index + 1,
                        planned,
                        e
                    );
                    break;
                }
            }
        }

        results
    }
}
