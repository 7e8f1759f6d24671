use super::distance_cache::DistanceCache;
use super::segment_planner::SegmentPlan;
use crate::config::TripGeneratorConfig;
use crate::models::{Activity, Coordinates, Place, RefinedPlaces};
use crate::services::timezone::{local_hour, TimezoneLookup};
use rand::Rng;
use std::collections::HashSet;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn other(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pool {
    Food,
    NonFood,
    Lodging,
}

/// Place ids and names already in the itinerary, shared by both cursors of
/// every segment.
#[derive(Debug, Default)]
pub struct VisitedPlaces {
    ids: HashSet<String>,
    names: HashSet<String>,
}

impl VisitedPlaces {
    pub fn contains(&self, place: &Place) -> bool {
        self.ids.contains(&place.place_id) || self.names.contains(&place.name)
    }

    pub fn insert(&mut self, place: &Place) {
        self.ids.insert(place.place_id.clone());
        self.names.insert(place.name.clone());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A scheduled activity plus what the merge step needs to move it.
struct Stop {
    activity: Activity,
    location: Coordinates,
    overnight: bool,
}

/// One end of the bidirectional walk.
struct Cursor {
    direction: Direction,
    anchor: Coordinates,
    current: Option<Place>,
    /// Time consumed from the anchor, travel included
    offset: Duration,
    minutes_since_food: u32,
    stops: Vec<Stop>,
}

impl Cursor {
    fn new(direction: Direction, anchor: Coordinates) -> Self {
        Cursor {
            direction,
            anchor,
            current: None,
            offset: Duration::ZERO,
            minutes_since_food: 0,
            stops: Vec::new(),
        }
    }

    fn position(&self) -> Coordinates {
        self.current
            .as_ref()
            .map(|p| p.location)
            .unwrap_or(self.anchor)
    }

    fn distance_to(&self, place: &Place, cache: &mut DistanceCache) -> f64 {
        match &self.current {
            Some(current) => cache.distance(current, place),
            None => self.anchor.distance_to(&place.location),
        }
    }

    /// Index of the place in `pool` closest to this cursor. Ties keep the
    /// earlier index.
    fn nearest(&self, pool: &[Place], cache: &mut DistanceCache) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, place) in pool.iter().enumerate() {
            let distance = self.distance_to(place, cache);
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((index, distance)),
            }
        }
        best
    }

    /// Update the food timer after a stop from `pool`. A stay restarts it
    /// at the stay's own length.
    fn record_stop(&mut self, pool: Pool, duration_minutes: u32) {
        self.minutes_since_food = match pool {
            Pool::Food => 0,
            Pool::Lodging => duration_minutes,
            Pool::NonFood => self.minutes_since_food + duration_minutes,
        };
    }
}

/// A place taken out of its pool for the current turn.
struct Pick {
    place: Place,
    pool: Pool,
    duration_minutes: u32,
}

/// Everything needed to schedule one segment.
pub struct SegmentInput<'a> {
    pub plan: &'a SegmentPlan,
    pub places: RefinedPlaces,
    pub start_time: OffsetDateTime,
    /// The plan's own duration plus whatever the previous segment left unused
    pub budget: Duration,
    pub is_last: bool,
}

#[derive(Debug)]
pub struct SegmentSchedule {
    /// Chronological activities of the segment
    pub activities: Vec<Activity>,
    /// Where the next segment starts
    pub end_time: OffsetDateTime,
    /// Unused time handed to the next segment
    pub carry_over: Duration,
}

/// Fills each segment from both ends at once: a forward cursor walks out
/// from the segment start, a backward cursor walks in from the segment end,
/// and they take turns until the time between them is used up.
pub struct ItineraryScheduler<'a> {
    config: &'a TripGeneratorConfig,
    timezones: &'a dyn TimezoneLookup,
}

impl<'a> ItineraryScheduler<'a> {
    pub fn new(config: &'a TripGeneratorConfig, timezones: &'a dyn TimezoneLookup) -> Self {
        ItineraryScheduler { config, timezones }
    }

    /// Schedule every segment in order and concatenate the results.
    pub fn schedule<R: Rng>(
        &self,
        segments: Vec<(SegmentPlan, RefinedPlaces)>,
        trip_start: OffsetDateTime,
        rng: &mut R,
    ) -> Vec<Activity> {
        let mut visited = VisitedPlaces::default();
        let mut activities = Vec::new();
        let mut start_time = trip_start;
        let mut carry_over = Duration::ZERO;
        let count = segments.len();

        for (index, (plan, places)) in segments.into_iter().enumerate() {
            let schedule = self.schedule_segment(
                SegmentInput {
                    plan: &plan,
                    places,
                    start_time,
                    budget: plan.duration + carry_over,
                    is_last: index + 1 == count,
                },
                &mut visited,
                rng,
            );

            start_time = schedule.end_time;
            carry_over = schedule.carry_over;
            activities.extend(schedule.activities);
        }

        activities
    }

    pub fn schedule_segment<R: Rng>(
        &self,
        input: SegmentInput<'_>,
        visited: &mut VisitedPlaces,
        rng: &mut R,
    ) -> SegmentSchedule {
        let SegmentInput {
            plan,
            mut places,
            start_time,
            budget,
            is_last,
        } = input;
        let end_time = start_time + budget;
        let meeting_gap = Duration::minutes(self.config.max_activity_minutes as i64);

        let mut cache = DistanceCache::new();
        let mut forward = Cursor::new(Direction::Forward, plan.start);
        let mut backward = Cursor::new(Direction::Backward, plan.end);
        let mut turn = Direction::Forward;
        let mut skipped = 0usize;

        loop {
            let gap = budget
                - forward.offset
                - backward.offset
                - self.closing_time(&forward, &backward, &mut cache);
            if gap <= meeting_gap {
                break;
            }
            if places.food.is_empty() && places.non_food.is_empty() {
                break;
            }

            let (cursor, other) = match turn {
                Direction::Forward => (&mut forward, &backward),
                Direction::Backward => (&mut backward, &forward),
            };
            turn = turn.other();

            drop_stalled_pools(cursor, &mut places);

            let at = match cursor.direction {
                Direction::Forward => start_time + cursor.offset,
                Direction::Backward => end_time - cursor.offset,
            };
            let sampled = self.sample_duration(rng);

            let Some(pick) = self.choose_place(cursor, &mut places, &mut cache, at, sampled) else {
                continue;
            };

            if visited.contains(&pick.place) {
                skipped += 1;
                continue;
            }

            // Both drives have to fit: out to the pick, and from it to the other walk
            let travel = self.travel_time(cursor.distance_to(&pick.place, &mut cache));
            let rejoin = self.travel_time(other.distance_to(&pick.place, &mut cache));
            let available =
                (budget - cursor.offset - other.offset - travel - rejoin).whole_minutes();
            if available <= 0 {
                tracing::debug!(
                    segment = plan.index,
                    place_id = %pick.place.place_id,
                    "Travel to next stop does not fit, closing segment"
                );
                break;
            }

            let overnight = pick.pool == Pool::Lodging;
            // A backward stay is cut from its start, which is the night part
            if overnight
                && cursor.direction == Direction::Backward
                && i64::from(pick.duration_minutes) > available
            {
                tracing::debug!(
                    segment = plan.index,
                    place_id = %pick.place.place_id,
                    "Overnight stay does not fit before the next stop, closing segment"
                );
                break;
            }

            let duration_minutes = pick.duration_minutes.min(available as u32);
            let duration = Duration::minutes(duration_minutes as i64);
            let activity_start = match cursor.direction {
                Direction::Forward => start_time + cursor.offset + travel,
                Direction::Backward => end_time - (cursor.offset + travel + duration),
            };

            visited.insert(&pick.place);
            cursor.stops.push(Stop {
                activity: Activity::from_place(&pick.place, activity_start, duration_minutes),
                location: pick.place.location,
                overnight,
            });
            cursor.offset += travel + duration;
            cursor.record_stop(pick.pool, duration_minutes);
            cursor.current = Some(pick.place);
        }

        let slack = (budget
            - forward.offset
            - backward.offset
            - self.closing_time(&forward, &backward, &mut cache))
        .max(Duration::ZERO);
        // The last segment stays pinned to the trip end. Earlier ones pull
        // their backward half forward and pass the slack on, unless that
        // would move one of its stops across the local day boundary.
        let shift = if is_last || !self.can_shift(&backward.stops, slack) {
            Duration::ZERO
        } else {
            slack
        };

        tracing::debug!(
            segment = plan.index,
            forward = forward.stops.len(),
            backward = backward.stops.len(),
            skipped = skipped,
            slack_minutes = slack.whole_minutes(),
            carried_minutes = shift.whole_minutes(),
            "Scheduled segment {}",
            plan.index
        );

        let mut activities: Vec<Activity> =
            forward.stops.into_iter().map(|stop| stop.activity).collect();
        activities.extend(backward.stops.into_iter().rev().map(|stop| {
            let mut activity = stop.activity;
            activity.start_time -= shift;
            activity
        }));

        SegmentSchedule {
            activities,
            end_time: end_time - shift,
            carry_over: shift,
        }
    }

    /// Uniform in the configured bounds, rounded up.
    fn sample_duration<R: Rng>(&self, rng: &mut R) -> u32 {
        let raw = rng.gen_range(self.config.min_activity_minutes..=self.config.max_activity_minutes);
        round_up(raw as f64, self.config.duration_rounding_minutes)
    }

    fn travel_time(&self, distance_m: f64) -> Duration {
        let meters_per_minute = self.config.driving_speed_kmh * 1000.0 / 60.0;
        let minutes = round_up(distance_m / meters_per_minute, self.config.duration_rounding_minutes);
        Duration::minutes(minutes as i64)
    }

    /// Drive still needed to join the two walks.
    fn closing_time(&self, forward: &Cursor, backward: &Cursor, cache: &mut DistanceCache) -> Duration {
        let distance = match &backward.current {
            Some(place) => forward.distance_to(place, cache),
            None => forward.position().distance_to(&backward.anchor),
        };
        self.travel_time(distance)
    }

    fn hour_at(&self, location: &Coordinates, instant: OffsetDateTime) -> u32 {
        local_hour(self.timezones, location, instant)
    }

    fn is_daytime(&self, hour: u32) -> bool {
        hour >= self.config.day_start_hour && hour < self.config.day_end_hour
    }

    /// Overnight stay starting at local `hour`: the base stay plus either a
    /// morning extension or the hours left until midnight.
    fn lodging_minutes(&self, hour: u32) -> u32 {
        let extra = if hour < 12 {
            self.config.lodging_morning_extra_hours
        } else {
            24u32.saturating_sub(hour)
        };
        (self.config.lodging_base_hours + extra) * 60
    }

    /// Overnight stay ending at local `hour`. Morning check-outs reach back
    /// to the evening the day ended; later ones get the base stay plus the
    /// morning extension.
    fn lodging_minutes_until(&self, hour: u32) -> u32 {
        let hours = if hour < 12 {
            (hour + 24).saturating_sub(self.config.day_end_hour)
        } else {
            self.config.lodging_base_hours + self.config.lodging_morning_extra_hours
        };
        hours.max(self.config.lodging_base_hours) * 60
    }

    /// Length of a stay at `lodging` if the cursor should turn in there, or
    /// `None` while it is still daytime.
    ///
    /// A forward stay is judged at check-in. A backward stay ends where the
    /// walk currently stands, so it is judged by when an ordinary activity
    /// in its place would have started.
    fn overnight_stay(
        &self,
        direction: Direction,
        lodging: &Coordinates,
        at: OffsetDateTime,
        travel: Duration,
        sampled_minutes: u32,
    ) -> Option<u32> {
        match direction {
            Direction::Forward => {
                let check_in = self.hour_at(lodging, at + travel);
                (!self.is_daytime(check_in)).then(|| self.lodging_minutes(check_in))
            }
            Direction::Backward => {
                let check_out = at - travel;
                let would_start = check_out - Duration::minutes(sampled_minutes as i64);
                if self.is_daytime(self.hour_at(lodging, would_start)) {
                    return None;
                }
                Some(self.lodging_minutes_until(self.hour_at(lodging, check_out)))
            }
        }
    }

    /// Whether a stay of `minutes` from `start` reaches into the local night.
    fn overlaps_night(&self, location: &Coordinates, start: OffsetDateTime, minutes: u32) -> bool {
        let step = self.config.duration_rounding_minutes.max(1) as usize;
        (0..minutes)
            .step_by(step)
            .chain(minutes.checked_sub(1))
            .any(|m| !self.is_daytime(self.hour_at(location, start + Duration::minutes(m as i64))))
    }

    /// Whether moving `stops` earlier by `shift` keeps each on its side of
    /// the local day: stays still reach into the night and daytime stops
    /// still start in daylight.
    fn can_shift(&self, stops: &[Stop], shift: Duration) -> bool {
        if shift.is_zero() {
            return true;
        }
        stops.iter().all(|stop| {
            let start = stop.activity.start_time;
            if stop.overnight {
                self.overlaps_night(&stop.location, start - shift, stop.activity.duration_minutes)
            } else {
                !self.is_daytime(self.hour_at(&stop.location, start))
                    || self.is_daytime(self.hour_at(&stop.location, start - shift))
            }
        })
    }

    fn choose_place(
        &self,
        cursor: &Cursor,
        places: &mut RefinedPlaces,
        cache: &mut DistanceCache,
        at: OffsetDateTime,
        sampled_minutes: u32,
    ) -> Option<Pick> {
        // First stop of a cursor: closest non-lodging place to its anchor
        if cursor.current.is_none() {
            let food = cursor.nearest(&places.food, cache);
            let non_food = cursor.nearest(&places.non_food, cache);
            let pool = match (food, non_food) {
                (Some((_, f)), Some((_, n))) if n < f => Pool::NonFood,
                (Some(_), _) => Pool::Food,
                (None, Some(_)) => Pool::NonFood,
                (None, None) => return None,
            };
            let index = match pool {
                Pool::Food => food,
                _ => non_food,
            }?
            .0;
            return Some(take(places, pool, index, sampled_minutes));
        }

        if let Some((index, distance)) = cursor.nearest(&places.lodging, cache) {
            let stay = self.overnight_stay(
                cursor.direction,
                &places.lodging[index].location,
                at,
                self.travel_time(distance),
                sampled_minutes,
            );
            if let Some(minutes) = stay {
                return Some(take(places, Pool::Lodging, index, minutes));
            }
        }

        let food_due = cursor.minutes_since_food > self.config.food_interval_minutes
            || places.non_food.is_empty();
        if food_due {
            if let Some((index, _)) = cursor.nearest(&places.food, cache) {
                return Some(take(places, Pool::Food, index, sampled_minutes));
            }
        }

        cursor
            .nearest(&places.non_food, cache)
            .map(|(index, _)| take(places, Pool::NonFood, index, sampled_minutes))
    }
}

fn round_up(minutes: f64, granularity: u32) -> u32 {
    let granularity = granularity.max(1) as f64;
    ((minutes / granularity).ceil() * granularity) as u32
}

fn take(places: &mut RefinedPlaces, pool: Pool, index: usize, duration_minutes: u32) -> Pick {
    let place = match pool {
        Pool::Food => places.food.remove(index),
        Pool::NonFood => places.non_food.remove(index),
        Pool::Lodging => places.lodging.remove(index),
    };
    Pick {
        place,
        pool,
        duration_minutes,
    }
}

/// A pool whose only entry is the cursor's own current place would be
/// offered to it forever; empty it instead.
fn drop_stalled_pools(cursor: &Cursor, places: &mut RefinedPlaces) {
    let Some(current) = &cursor.current else {
        return;
    };
    for pool in [&mut places.food, &mut places.non_food, &mut places.lodging] {
        if pool.len() == 1 && pool[0].place_id == current.place_id {
            tracing::debug!(place_id = %current.place_id, "Dropping stalled candidate pool");
            pool.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::timezone::FixedTimezone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    const LODGING_TAGS: &[&str] = &["lodging", "point_of_interest", "establishment"];

    fn coords(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    fn place(id: &str, lat: f64, lng: f64, tags: &[&str]) -> Place {
        Place::new(id, &format!("Name {}", id), coords(lat, lng), tags.iter().copied())
    }

    fn utc() -> FixedTimezone {
        FixedTimezone("UTC".to_string())
    }

    fn plan(duration: Duration) -> SegmentPlan {
        let start = coords(-33.80, 151.00);
        let end = coords(-33.80, 151.10);
        SegmentPlan {
            index: 0,
            start,
            end,
            center: start.midpoint(&end),
            radius_m: 25_000.0,
            duration,
        }
    }

    /// A row of places between the two anchors, alternating food and not.
    fn many_places(count: usize) -> RefinedPlaces {
        let mut refined = RefinedPlaces::default();
        for i in 0..count {
            let lng = 151.00 + 0.1 * (i as f64 / count as f64);
            if i % 3 == 0 {
                refined.food.push(place(&format!("f{}", i), -33.80, lng, &["cafe"]));
            } else {
                refined.non_food.push(place(&format!("n{}", i), -33.80, lng, &["park"]));
            }
        }
        refined
    }

    fn with_hotels(mut places: RefinedPlaces, count: usize) -> RefinedPlaces {
        for i in 0..count {
            places.lodging.push(place(
                &format!("hotel{}", i),
                -33.80,
                151.01 + 0.08 * (i as f64 / count as f64),
                LODGING_TAGS,
            ));
        }
        places
    }

    fn locations(places: &RefinedPlaces) -> HashMap<String, Coordinates> {
        places
            .food
            .iter()
            .chain(&places.non_food)
            .chain(&places.lodging)
            .map(|p| (p.place_id.clone(), p.location))
            .collect()
    }

    fn trip_start() -> OffsetDateTime {
        // 2021-04-17T08:00:00Z
        OffsetDateTime::from_unix_timestamp(1618646400).unwrap()
    }

    fn at_hour(hour: u8) -> OffsetDateTime {
        trip_start().replace_hour(hour).unwrap()
    }

    fn drive_time(from: Coordinates, to: Coordinates) -> Duration {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        ItineraryScheduler::new(&config, &tz).travel_time(from.distance_to(&to))
    }

    fn run_segment(
        places: RefinedPlaces,
        budget: Duration,
        is_last: bool,
        start_time: OffsetDateTime,
    ) -> SegmentSchedule {
        run_segment_seeded(places, budget, is_last, start_time, 7)
    }

    fn run_segment_seeded(
        places: RefinedPlaces,
        budget: Duration,
        is_last: bool,
        start_time: OffsetDateTime,
        seed: u64,
    ) -> SegmentSchedule {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let plan = plan(budget);
        let mut rng = StdRng::seed_from_u64(seed);
        scheduler.schedule_segment(
            SegmentInput {
                plan: &plan,
                places,
                start_time,
                budget,
                is_last,
            },
            &mut VisitedPlaces::default(),
            &mut rng,
        )
    }

    fn assert_well_formed(activities: &[Activity]) {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for activity in activities {
            assert!(ids.insert(activity.place_id.clone()), "duplicate id {}", activity.place_id);
            assert!(names.insert(activity.name.clone()), "duplicate name {}", activity.name);
            assert!(activity.duration_minutes > 0);
        }
        for pair in activities.windows(2) {
            assert!(
                pair[0].start_time <= pair[1].start_time,
                "{} starts after {}",
                pair[0].place_id,
                pair[1].place_id
            );
            assert!(pair[0].end_time() <= pair[1].start_time, "overlap at {}", pair[1].place_id);
        }
    }

    /// Any part of the activity falls in [20:00, 07:00) UTC.
    fn reaches_into_night(activity: &Activity) -> bool {
        let mut t = activity.start_time;
        while t < activity.end_time() {
            if t.hour() >= 20 || t.hour() < 7 {
                return true;
            }
            t += Duration::minutes(10);
        }
        false
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0.0, 10), 0);
        assert_eq!(round_up(0.1, 10), 10);
        assert_eq!(round_up(30.0, 10), 30);
        assert_eq!(round_up(31.0, 10), 40);
    }

    #[test]
    fn test_sampled_durations_stay_in_bounds() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let minutes = scheduler.sample_duration(&mut rng);
            assert!((30..=180).contains(&minutes));
            assert_eq!(minutes % 10, 0);
        }
    }

    #[test]
    fn test_travel_time_at_fifty_kmh() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        assert_eq!(scheduler.travel_time(0.0), Duration::ZERO);
        // 10km is 12 minutes, rounded to 20
        assert_eq!(scheduler.travel_time(10_000.0), Duration::minutes(20));
        assert_eq!(scheduler.travel_time(50_000.0), Duration::minutes(60));
    }

    #[test]
    fn test_lodging_minutes() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        assert_eq!(scheduler.lodging_minutes(3), 9 * 60);
        assert_eq!(scheduler.lodging_minutes(20), 11 * 60);
        assert_eq!(scheduler.lodging_minutes(23), 8 * 60);
    }

    #[test]
    fn test_lodging_minutes_until_check_out() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        // Morning check-outs start at 20:00 the evening before
        assert_eq!(scheduler.lodging_minutes_until(7), 11 * 60);
        assert_eq!(scheduler.lodging_minutes_until(9), 13 * 60);
        // Never shorter than the base stay
        assert_eq!(scheduler.lodging_minutes_until(1), 7 * 60);
        assert_eq!(scheduler.lodging_minutes_until(22), 9 * 60);
    }

    #[test]
    fn test_segment_output_is_well_formed() {
        let start = trip_start();
        let budget = Duration::hours(38);
        let schedule = run_segment(many_places(60), budget, true, start);

        assert!(!schedule.activities.is_empty());
        assert_well_formed(&schedule.activities);
        for activity in &schedule.activities {
            assert!(activity.start_time >= start);
            assert!(activity.end_time() <= start + budget);
        }
    }

    #[test]
    fn test_no_places_leaves_budget_minus_the_drive() {
        let start = trip_start();
        let segment = plan(Duration::hours(6));
        let drive = drive_time(segment.start, segment.end);
        let schedule = run_segment(RefinedPlaces::default(), Duration::hours(6), false, start);

        assert!(schedule.activities.is_empty());
        assert_eq!(drive, Duration::minutes(20));
        assert_eq!(schedule.end_time, start + drive);
        assert_eq!(schedule.carry_over, Duration::hours(6) - drive);
    }

    #[test]
    fn test_non_last_segment_closes_the_gap() {
        let start = trip_start();
        let places = many_places(4);
        let located = locations(&places);
        let schedule = run_segment(places, Duration::hours(30), false, start);

        assert_well_formed(&schedule.activities);
        assert_eq!(schedule.activities.len(), 4);
        // Every hop, the join between the two halves included, is exactly
        // the drive between its stops
        for pair in schedule.activities.windows(2) {
            let drive = drive_time(located[&pair[0].place_id], located[&pair[1].place_id]);
            assert!(drive > Duration::ZERO);
            assert_eq!(
                pair[1].start_time - pair[0].end_time(),
                drive,
                "{} -> {}",
                pair[0].place_id,
                pair[1].place_id
            );
        }

        assert!(schedule.carry_over > Duration::ZERO);
        assert_eq!(schedule.end_time + schedule.carry_over, start + Duration::hours(30));
        let last = schedule.activities.last().unwrap();
        let to_end = drive_time(plan(Duration::hours(30)).end, located[&last.place_id]);
        assert_eq!(schedule.end_time - last.end_time(), to_end);
    }

    #[test]
    fn test_last_segment_is_pinned_to_the_end() {
        let start = trip_start();
        let schedule = run_segment(many_places(4), Duration::hours(30), true, start);

        assert_eq!(schedule.carry_over, Duration::ZERO);
        assert_eq!(schedule.end_time, start + Duration::hours(30));
        // Only the drive back to the end anchor separates the last stop from it
        let last = schedule.activities.last().unwrap();
        assert!(last.end_time() <= schedule.end_time);
        assert!(schedule.end_time - last.end_time() <= Duration::minutes(10));
    }

    #[test]
    fn test_last_segment_leaves_room_for_the_join() {
        let places = many_places(4);
        let located = locations(&places);
        let schedule = run_segment(places, Duration::hours(30), true, trip_start());

        for pair in schedule.activities.windows(2) {
            let drive = drive_time(located[&pair[0].place_id], located[&pair[1].place_id]);
            assert!(pair[1].start_time - pair[0].end_time() >= drive);
        }
    }

    #[test]
    fn test_short_window_schedules_nothing() {
        // Less than one maximum activity between the anchors
        let schedule = run_segment(many_places(10), Duration::hours(3), true, trip_start());
        assert!(schedule.activities.is_empty());
    }

    #[test]
    fn test_stalled_pool_is_dropped() {
        let a = place("a", -33.80, 151.00, &["park"]);
        let mut cursor = Cursor::new(Direction::Forward, coords(-33.80, 151.00));
        cursor.current = Some(a.clone());

        let mut places = RefinedPlaces {
            food: vec![place("b", -33.80, 151.01, &["cafe"])],
            non_food: vec![a],
            lodging: Vec::new(),
        };
        drop_stalled_pools(&cursor, &mut places);
        assert!(places.non_food.is_empty());
        assert_eq!(places.food.len(), 1);
    }

    #[test]
    fn test_sole_candidate_equal_to_current_place_terminates() {
        let a = place("a", -33.80, 151.00, &["cafe"]);
        let mut a_again = a.clone();
        a_again.category_tags = ["park".to_string()].into_iter().collect();
        let z = place("z", -33.80, 151.10, &["park"]);

        let places = RefinedPlaces {
            food: vec![a],
            non_food: vec![a_again, z],
            lodging: Vec::new(),
        };
        let schedule = run_segment(places, Duration::hours(24), true, trip_start());

        let ids: Vec<_> = schedule.activities.iter().map(|a| a.place_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "z"]);
    }

    #[test]
    fn test_first_pick_is_nearest_non_lodging() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let cursor = Cursor::new(Direction::Forward, coords(-33.80, 151.00));
        let mut places = RefinedPlaces {
            food: vec![place("far_food", -33.80, 151.05, &["cafe"])],
            non_food: vec![place("near_park", -33.80, 151.01, &["park"])],
            lodging: vec![place("hotel", -33.80, 151.00, LODGING_TAGS)],
        };

        // Night time does not matter for the first stop
        let pick = scheduler
            .choose_place(&cursor, &mut places, &mut DistanceCache::new(), at_hour(23), 60)
            .unwrap();
        assert_eq!(pick.place.place_id, "near_park");
        assert_eq!(pick.pool, Pool::NonFood);
        assert!(places.non_food.is_empty());
        assert_eq!(places.lodging.len(), 1);
    }

    #[test]
    fn test_night_picks_lodging() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let mut cursor = Cursor::new(Direction::Forward, coords(-33.80, 151.00));
        cursor.current = Some(place("here", -33.80, 151.00, &["park"]));
        let mut places = RefinedPlaces {
            food: vec![place("cafe", -33.80, 151.001, &["cafe"])],
            non_food: vec![place("park", -33.80, 151.001, &["park"])],
            lodging: vec![
                place("far", -33.80, 151.09, LODGING_TAGS),
                place("near", -33.80, 151.02, LODGING_TAGS),
            ],
        };

        // Check-in at 21:10 after a ten minute drive
        let pick = scheduler
            .choose_place(&cursor, &mut places, &mut DistanceCache::new(), at_hour(21), 60)
            .unwrap();
        assert_eq!(pick.place.place_id, "near");
        assert_eq!(pick.pool, Pool::Lodging);
        assert_eq!(pick.duration_minutes, 10 * 60);

        // Daytime ignores lodging
        let pick = scheduler
            .choose_place(&cursor, &mut places, &mut DistanceCache::new(), at_hour(10), 60)
            .unwrap();
        assert_eq!(pick.pool, Pool::NonFood);
    }

    #[test]
    fn test_forward_stay_is_judged_at_check_in() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let mut cursor = Cursor::new(Direction::Forward, coords(-33.80, 151.00));
        cursor.current = Some(place("here", -33.80, 151.00, &["park"]));
        let mut places = RefinedPlaces {
            food: Vec::new(),
            non_food: vec![place("park", -33.80, 151.001, &["park"])],
            lodging: vec![place("near", -33.80, 151.02, LODGING_TAGS)],
        };

        // Leaving at 19:55, arriving at 20:05
        let at = at_hour(19) + Duration::minutes(55);
        let pick = scheduler
            .choose_place(&cursor, &mut places, &mut DistanceCache::new(), at, 60)
            .unwrap();
        assert_eq!(pick.pool, Pool::Lodging);
        assert_eq!(pick.duration_minutes, 11 * 60);
    }

    #[test]
    fn test_backward_stay_ends_at_check_out() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let mut cursor = Cursor::new(Direction::Backward, coords(-33.80, 151.10));
        cursor.current = Some(place("here", -33.80, 151.10, &["park"]));
        let fresh = || RefinedPlaces {
            food: vec![place("cafe", -33.80, 151.099, &["cafe"])],
            non_food: vec![place("park", -33.80, 151.099, &["park"])],
            lodging: vec![place("near", -33.80, 151.08, LODGING_TAGS)],
        };

        // Next stop at 09:00: a three hour activity before it would start at
        // 05:50, so the walk sleeps instead, from 20:50 until 08:50
        let pick = scheduler
            .choose_place(&cursor, &mut fresh(), &mut DistanceCache::new(), at_hour(9), 180)
            .unwrap();
        assert_eq!(pick.place.place_id, "near");
        assert_eq!(pick.pool, Pool::Lodging);
        assert_eq!(pick.duration_minutes, 12 * 60);

        // A one hour activity before 09:00 starts in daylight
        let pick = scheduler
            .choose_place(&cursor, &mut fresh(), &mut DistanceCache::new(), at_hour(9), 60)
            .unwrap();
        assert_eq!(pick.pool, Pool::NonFood);

        // Late evening: the stay ends at 21:50
        let pick = scheduler
            .choose_place(&cursor, &mut fresh(), &mut DistanceCache::new(), at_hour(22), 60)
            .unwrap();
        assert_eq!(pick.pool, Pool::Lodging);
        assert_eq!(pick.duration_minutes, 9 * 60);
    }

    #[test]
    fn test_every_stay_reaches_into_the_night() {
        // 2021-04-17T07:00:00Z, UTC, three nights
        let start = OffsetDateTime::from_unix_timestamp(1618642800).unwrap();
        let mut stays = 0;

        for seed in 0..20 {
            for is_last in [true, false] {
                let schedule = run_segment_seeded(
                    with_hotels(many_places(60), 8),
                    Duration::hours(64),
                    is_last,
                    start,
                    seed,
                );
                assert_well_formed(&schedule.activities);

                for activity in &schedule.activities {
                    if !activity.category_tags.contains("lodging") {
                        continue;
                    }
                    stays += 1;
                    assert!(
                        reaches_into_night(activity),
                        "daytime stay {} from {} for {} min (seed {})",
                        activity.place_id,
                        activity.start_time,
                        activity.duration_minutes,
                        seed
                    );
                }
            }
        }

        assert!(stays > 0);
    }

    #[test]
    fn test_stay_restarts_food_timer_at_its_length() {
        let mut cursor = Cursor::new(Direction::Backward, coords(-33.80, 151.10));
        cursor.record_stop(Pool::NonFood, 120);
        cursor.record_stop(Pool::NonFood, 50);
        assert_eq!(cursor.minutes_since_food, 170);

        cursor.record_stop(Pool::Lodging, 540);
        assert_eq!(cursor.minutes_since_food, 540);

        cursor.record_stop(Pool::Food, 60);
        assert_eq!(cursor.minutes_since_food, 0);
    }

    #[test]
    fn test_long_stay_makes_food_due() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let mut cursor = Cursor::new(Direction::Forward, coords(-33.80, 151.00));
        cursor.current = Some(place("hotel", -33.80, 151.00, LODGING_TAGS));
        cursor.record_stop(Pool::Lodging, 9 * 60);

        let mut places = RefinedPlaces {
            food: vec![place("cafe", -33.80, 151.05, &["cafe"])],
            non_food: vec![place("park", -33.80, 151.01, &["park"])],
            lodging: Vec::new(),
        };
        let pick = scheduler
            .choose_place(&cursor, &mut places, &mut DistanceCache::new(), at_hour(9), 60)
            .unwrap();
        assert_eq!(pick.place.place_id, "cafe");
    }

    #[test]
    fn test_food_is_due_after_interval() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let mut cursor = Cursor::new(Direction::Forward, coords(-33.80, 151.00));
        cursor.current = Some(place("here", -33.80, 151.00, &["park"]));
        let mut places = RefinedPlaces {
            food: vec![place("cafe", -33.80, 151.05, &["cafe"])],
            non_food: vec![
                place("park", -33.80, 151.01, &["park"]),
                place("zoo", -33.80, 151.02, &["zoo"]),
            ],
            lodging: Vec::new(),
        };
        let mut cache = DistanceCache::new();

        cursor.minutes_since_food = 180;
        let pick = scheduler
            .choose_place(&cursor, &mut places, &mut cache, at_hour(12), 60)
            .unwrap();
        assert_eq!(pick.place.place_id, "park");

        cursor.minutes_since_food = 190;
        let pick = scheduler
            .choose_place(&cursor, &mut places, &mut cache, at_hour(12), 60)
            .unwrap();
        assert_eq!(pick.place.place_id, "cafe");
    }

    #[test]
    fn test_food_when_nothing_else_remains() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let mut cursor = Cursor::new(Direction::Backward, coords(-33.80, 151.10));
        cursor.current = Some(place("here", -33.80, 151.10, &["park"]));
        let mut places = RefinedPlaces {
            food: vec![place("bakery", -33.80, 151.05, &["bakery"])],
            non_food: Vec::new(),
            lodging: Vec::new(),
        };

        let pick = scheduler
            .choose_place(&cursor, &mut places, &mut DistanceCache::new(), at_hour(12), 60)
            .unwrap();
        assert_eq!(pick.pool, Pool::Food);
        assert!(scheduler
            .choose_place(&cursor, &mut places, &mut DistanceCache::new(), at_hour(12), 60)
            .is_none());
    }

    #[test]
    fn test_overnight_window_books_lodging() {
        // 2021-04-17T18:00:00Z, two nights
        let start = OffsetDateTime::from_unix_timestamp(1618682400).unwrap();
        let schedule = run_segment(with_hotels(many_places(30), 4), Duration::hours(48), true, start);
        assert_well_formed(&schedule.activities);

        let stays: Vec<_> = schedule
            .activities
            .iter()
            .filter(|a| a.category_tags.contains("lodging"))
            .collect();
        assert!(!stays.is_empty());
        assert!(stays.iter().any(|a| a.duration_minutes >= 7 * 60));
    }

    #[test]
    fn test_places_are_not_repeated_across_segments() {
        let config = TripGeneratorConfig::default();
        let tz = utc();
        let scheduler = ItineraryScheduler::new(&config, &tz);
        let mut rng = StdRng::seed_from_u64(3);

        let first = plan(Duration::hours(12));
        let mut second = plan(Duration::hours(12));
        second.index = 1;

        // Both segments see the same candidates
        let activities = scheduler.schedule(
            vec![(first, many_places(20)), (second, many_places(20))],
            trip_start(),
            &mut rng,
        );
        assert!(!activities.is_empty());
        assert_well_formed(&activities);
        assert!(activities.last().unwrap().end_time() <= trip_start() + Duration::hours(24));
    }
}
