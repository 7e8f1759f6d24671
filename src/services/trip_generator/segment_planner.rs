use crate::constants::{FOUR_SEGMENT_UNIT_THRESHOLD, TWO_SEGMENT_UNIT_THRESHOLD};
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use time::Duration;

/// One geographic slice of the trip, searched and scheduled on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    pub index: usize,
    pub start: Coordinates,
    pub end: Coordinates,
    /// Where the place search is centered
    pub center: Coordinates,
    pub radius_m: f64,
    /// Time budget before any carry-over from the previous segment
    pub duration: Duration,
}

/// Even number of radius half-units covered by the straight-line distance.
pub fn segment_units(distance_m: f64, radius_m: f64) -> u32 {
    ((distance_m / radius_m * 0.5).round() as u32) * 2
}

/// Only 1, 2 or 4 segments are supported.
pub fn segment_count(units: u32) -> usize {
    if units < TWO_SEGMENT_UNIT_THRESHOLD {
        1
    } else if units < FOUR_SEGMENT_UNIT_THRESHOLD {
        2
    } else {
        4
    }
}

/// Split `start -> end` into segments with equal shares of `total`.
///
/// Anchors are successive midpoints, so the segments tile the trip in
/// geographic order. Any sub-second remainder of the split goes to the last
/// segment.
pub fn plan_segments(
    start: Coordinates,
    end: Coordinates,
    total: Duration,
    radius_m: f64,
) -> Result<Vec<SegmentPlan>> {
    let distance_m = start.distance_to(&end);
    if !distance_m.is_finite() {
        return Err(AppError::InvalidInput(
            "Distance between start and end is not finite".to_string(),
        ));
    }
    if total <= Duration::ZERO {
        return Err(AppError::InvalidInput(
            "Trip duration must be positive".to_string(),
        ));
    }

    let units = segment_units(distance_m, radius_m);
    let count = segment_count(units);

    let anchors = match count {
        1 => vec![start, end],
        2 => vec![start, start.midpoint(&end), end],
        _ => {
            let mid = start.midpoint(&end);
            vec![start, start.midpoint(&mid), mid, mid.midpoint(&end), end]
        }
    };

    let total_seconds = total.whole_seconds();
    let share = total_seconds / count as i64;

    let segments: Vec<SegmentPlan> = anchors
        .windows(2)
        .enumerate()
        .map(|(index, pair)| {
            let seconds = if index + 1 == count {
                total_seconds - share * (count as i64 - 1)
            } else {
                share
            };
            SegmentPlan {
                index,
                start: pair[0],
                end: pair[1],
                center: pair[0].midpoint(&pair[1]),
                radius_m,
                duration: Duration::seconds(seconds),
            }
        })
        .collect();

    tracing::debug!(
        distance_m = distance_m,
        units = units,
        segments = segments.len(),
        "Planned {} segment(s) over {:.0}m",
        segments.len(),
        distance_m
    );

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_SEGMENT_RADIUS_METERS;

    const RADIUS: f64 = MAX_SEGMENT_RADIUS_METERS;

    fn coords(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    #[test]
    fn test_segment_units_are_even() {
        assert_eq!(segment_units(0.0, RADIUS), 0);
        assert_eq!(segment_units(24_000.0, RADIUS), 0);
        assert_eq!(segment_units(26_000.0, RADIUS), 2);
        assert_eq!(segment_units(100_000.0, RADIUS), 4);
        assert_eq!(segment_units(400_000.0, RADIUS), 16);
    }

    #[test]
    fn test_segment_count_boundaries() {
        assert_eq!(segment_count(0), 1);
        assert_eq!(segment_count(2), 1);
        assert_eq!(segment_count(3), 1);
        // Exactly four units already needs two segments
        assert_eq!(segment_count(4), 2);
        assert_eq!(segment_count(6), 2);
        assert_eq!(segment_count(7), 2);
        // Exactly eight units goes to four
        assert_eq!(segment_count(8), 4);
        assert_eq!(segment_count(40), 4);
    }

    #[test]
    fn test_distance_boundaries_map_to_expected_counts() {
        // round(x * 0.5) flips at x = 3.0 (units 4) and x = 7.0 (units 8)
        assert_eq!(segment_count(segment_units(2.99 * RADIUS, RADIUS)), 1);
        assert_eq!(segment_count(segment_units(3.0 * RADIUS, RADIUS)), 2);
        assert_eq!(segment_count(segment_units(6.99 * RADIUS, RADIUS)), 2);
        assert_eq!(segment_count(segment_units(7.0 * RADIUS, RADIUS)), 4);
    }

    #[test]
    fn test_short_hop_is_one_segment() {
        let start = coords(-33.8298, 151.2382);
        let end = coords(-33.7686, 150.8776);
        let plans = plan_segments(start, end, Duration::seconds(136_800), RADIUS).unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].start, start);
        assert_eq!(plans[0].end, end);
        assert_eq!(plans[0].center, start.midpoint(&end));
        assert_eq!(plans[0].duration, Duration::seconds(136_800));
        assert_eq!(plans[0].radius_m, RADIUS);
    }

    #[test]
    fn test_same_start_and_end_is_one_segment() {
        let here = coords(-33.8298, 151.2382);
        let plans = plan_segments(here, here, Duration::hours(5), RADIUS).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].center, here);
    }

    #[test]
    fn test_medium_trip_splits_at_midpoint() {
        // Sydney to Newcastle, roughly 117km
        let start = coords(-33.8688, 151.2093);
        let end = coords(-32.9283, 151.7817);
        let plans = plan_segments(start, end, Duration::hours(10), RADIUS).unwrap();

        assert_eq!(plans.len(), 2);
        let mid = start.midpoint(&end);
        assert_eq!(plans[0].end, mid);
        assert_eq!(plans[1].start, mid);
        assert_eq!(plans[1].end, end);
        assert!(plans.iter().all(|p| p.duration == Duration::hours(5)));
    }

    #[test]
    fn test_long_trip_splits_into_quarters() {
        // Sydney to Canberra, roughly 250km
        let start = coords(-33.8688, 151.2093);
        let end = coords(-35.2809, 149.1300);
        let total = Duration::seconds(100_001);
        let plans = plan_segments(start, end, total, RADIUS).unwrap();

        assert_eq!(plans.len(), 4);
        for (i, pair) in plans.windows(2).enumerate() {
            assert_eq!(pair[0].end, pair[1].start, "gap after segment {}", i);
            assert_eq!(pair[0].index + 1, pair[1].index);
        }
        assert_eq!(plans[0].start, start);
        assert_eq!(plans[3].end, end);

        let sum: Duration = plans.iter().map(|p| p.duration).sum();
        assert_eq!(sum, total);
        assert_eq!(plans[0].duration, Duration::seconds(25_000));
        assert_eq!(plans[3].duration, Duration::seconds(25_001));
    }

    #[test]
    fn test_non_positive_duration_is_rejected() {
        let here = coords(0.0, 0.0);
        let result = plan_segments(here, here, Duration::ZERO, RADIUS);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
