//! Property-based tests for the buffered overlap rule, the free-gap search
//! and the storage exclusion constraint.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::allocator::compute_free_gaps;
use crate::conflict::overlaps_with_buffer;
use crate::model::{Reservation, TimeWindow};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, 4, 12, 0, 0).unwrap()
}

/// Windows starting within 12 hours of noon, lasting 1 to 240 minutes.
fn window_strategy() -> impl Strategy<Value = TimeWindow> {
    (0i64..720, 1i64..=240).prop_map(|(offset, minutes)| {
        TimeWindow::starting_at(base() + Duration::minutes(offset), Duration::minutes(minutes))
    })
}

fn buffer_strategy() -> impl Strategy<Value = Duration> {
    (0i64..=60).prop_map(Duration::minutes)
}

fn confirmed(id: i64, window: TimeWindow) -> Reservation {
    Reservation {
        id,
        restaurant_id: 1,
        table_id: 1,
        client_id: 1,
        start_time: window.start,
        end_time: window.end,
        guests: 2,
        confirmed: true,
        notes: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn overlap_is_symmetric(a in window_strategy(), b in window_strategy(), buffer in buffer_strategy()) {
        prop_assert_eq!(
            overlaps_with_buffer(&a, &b, buffer),
            overlaps_with_buffer(&b, &a, buffer)
        );
    }

    #[test]
    fn zero_buffer_is_plain_overlap(a in window_strategy(), b in window_strategy()) {
        prop_assert_eq!(overlaps_with_buffer(&a, &b, Duration::zero()), a.overlaps(&b));
    }

    #[test]
    fn larger_buffer_never_frees(
        a in window_strategy(),
        b in window_strategy(),
        small in buffer_strategy(),
        extra in buffer_strategy(),
    ) {
        if overlaps_with_buffer(&a, &b, small) {
            prop_assert!(overlaps_with_buffer(&a, &b, small + extra));
        }
    }

    #[test]
    fn no_conflict_means_buffer_gap(a in window_strategy(), b in window_strategy(), buffer in buffer_strategy()) {
        if !overlaps_with_buffer(&a, &b, buffer) {
            prop_assert!(a.start >= b.end + buffer || b.start >= a.end + buffer);
        }
    }

    #[test]
    fn free_gaps_hold_a_reservation(
        booked in proptest::collection::vec(window_strategy(), 0..6),
        duration in 15i64..=120,
        buffer in buffer_strategy(),
    ) {
        let open = TimeWindow::starting_at(base(), Duration::hours(12));
        let duration = Duration::minutes(duration);
        let reservations: Vec<Reservation> = booked
            .into_iter()
            .enumerate()
            .map(|(i, w)| confirmed(i64::try_from(i).unwrap(), w))
            .collect();

        let gaps = compute_free_gaps(&[open], &reservations, duration, buffer);
        for pair in gaps.windows(2) {
            prop_assert!(pair[0].start <= pair[1].start);
        }
        for gap in &gaps {
            prop_assert!(gap.duration() >= duration);
            prop_assert!(open.start <= gap.start && gap.end <= open.end);
            // A reservation at either end of the gap is conflict free.
            for candidate in [
                TimeWindow::starting_at(gap.start, duration),
                TimeWindow::starting_at(gap.end - duration, duration),
            ] {
                for r in &reservations {
                    prop_assert!(!overlaps_with_buffer(&candidate, &r.window(), buffer));
                }
            }
        }
    }
}

// Each case opens a fresh database file.
#[cfg(feature = "property-tests")]
mod storage {
    use super::*;
    use crate::database::test_util::{
        create_test_database, new_reservation, seed_client, seed_restaurant,
    };
    use crate::database::Database;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 24,
            .. ProptestConfig::default()
        })]

        #[test]
        fn stored_reservations_never_conflict(
            attempts in proptest::collection::vec((0i64..48, 1i64..=8), 1..12),
            buffer in 0u32..=30,
        ) {
            let mut db = create_test_database();
            let restaurant = seed_restaurant(&mut db, 60, buffer, &[4], &[]);
            let table = Database::tables(db.connection(), restaurant, 1).unwrap()[0].id;
            let client = seed_client(&mut db, "+15550100");

            // Quarter-hour starts and lengths.
            for (slot, quarters) in attempts {
                let start = base() + Duration::minutes(slot * 15);
                let _ = db.insert_reservation(
                    &new_reservation(restaurant, table, client, start, quarters * 15),
                    base(),
                );
            }

            let buffer = Duration::minutes(i64::from(buffer));
            let stored =
                Database::reservations_for_table_on(db.connection(), table, base().date_naive(), buffer)
                    .unwrap();
            for (i, a) in stored.iter().enumerate() {
                for b in &stored[i + 1..] {
                    prop_assert!(!overlaps_with_buffer(&a.window(), &b.window(), buffer));
                }
            }
        }
    }
}
