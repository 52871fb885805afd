//! Property-based tests for slot generation.

use chrono::{Duration, NaiveDate, NaiveTime};
use proptest::prelude::*;

use crate::model::{instant_on, WeeklyScheduleEntry};
use crate::schedule::DaySchedule;
use crate::slots::SlotSequence;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 3, 4).unwrap()
}

/// Up to three disjoint intervals as `(opening minute, closing minute)`,
/// each built from a gap after the previous closing and a length.
fn intervals_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    proptest::collection::vec((0u32..200, 1u32..=240), 0..=3).prop_map(|parts| {
        let mut cursor = 0;
        parts
            .into_iter()
            .map(|(gap, length)| {
                let opening = cursor + gap;
                cursor = opening + length;
                (opening, cursor)
            })
            .collect()
    })
}

fn schedule(intervals: &[(u32, u32)]) -> DaySchedule {
    let at = |minute: u32| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap();
    let rows: Vec<WeeklyScheduleEntry> = intervals
        .iter()
        .map(|&(opening, closing)| WeeklyScheduleEntry {
            restaurant_id: 1,
            day_of_week: 1,
            opening_time: at(opening),
            closing_time: at(closing),
        })
        .collect();
    DaySchedule::from_rows(date(), &rows, &[])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn slots_fit_their_interval(intervals in intervals_strategy(), step in 5i64..=120) {
        let day = schedule(&intervals);
        let step = Duration::minutes(step);
        let slots = SlotSequence::new(&day, step).unwrap();

        for slot in &slots {
            let fits = day
                .intervals()
                .iter()
                .any(|i| instant_on(date(), i.opening) <= slot && slot + step <= instant_on(date(), i.closing));
            prop_assert!(fits);
        }
    }

    #[test]
    fn slot_count_matches_interval_lengths(intervals in intervals_strategy(), step in 5i64..=120) {
        let day = schedule(&intervals);
        let expected: i64 = day
            .intervals()
            .iter()
            .map(|i| (i.closing - i.opening).num_minutes() / step)
            .sum();
        let slots = SlotSequence::new(&day, Duration::minutes(step)).unwrap();
        prop_assert_eq!(i64::try_from(slots.iter().count()).unwrap(), expected);
    }

    #[test]
    fn sequence_is_ordered_and_restartable(intervals in intervals_strategy(), step in 5i64..=120) {
        let day = schedule(&intervals);
        let slots = SlotSequence::new(&day, Duration::minutes(step)).unwrap();
        let first: Vec<_> = slots.iter().collect();
        let second: Vec<_> = slots.iter().collect();
        prop_assert_eq!(&first, &second);
        for pair in first.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }
}
