//! Candidate slot start times.

use chrono::{DateTime, Duration, Utc};

use crate::config::BookingPolicy;
use crate::error::{Error, Result};
use crate::model::TimeWindow;
use crate::schedule::DaySchedule;

/// A finite, restartable sequence of slot starts over a day's intervals.
///
/// Each interval yields `opening, opening + step, ...` while
/// `slot + step <= closing`; intervals follow each other in order.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, NaiveDate, NaiveTime};
/// use tablebook::model::WeeklyScheduleEntry;
/// use tablebook::schedule::DaySchedule;
/// use tablebook::slots::SlotSequence;
///
/// let date = NaiveDate::from_ymd_opt(2030, 3, 4).unwrap();
/// let row = WeeklyScheduleEntry {
///     restaurant_id: 1,
///     day_of_week: 1,
///     opening_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
///     closing_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
/// };
/// let schedule = DaySchedule::from_rows(date, &[row], &[]);
/// let slots = SlotSequence::new(&schedule, Duration::minutes(15)).unwrap();
/// assert_eq!(slots.iter().count(), 4);
/// assert_eq!(slots.iter().count(), 4); // restartable
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSequence {
    intervals: Vec<TimeWindow>,
    step: Duration,
}

impl SlotSequence {
    /// Plan slots over `schedule` every `step`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `step` is not positive.
    pub fn new(schedule: &DaySchedule, step: Duration) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(Error::Validation {
                field: "step".into(),
                message: "slot step must be positive".into(),
            });
        }
        Ok(Self {
            intervals: schedule.windows().collect(),
            step,
        })
    }

    /// Plan slots using the step the policy selects for `reservation_duration`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the resulting step is not positive.
    pub fn for_policy(
        schedule: &DaySchedule,
        policy: &BookingPolicy,
        reservation_duration: Duration,
    ) -> Result<Self> {
        Self::new(schedule, policy.step_for(reservation_duration))
    }

    /// The step between consecutive slots.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Iterate from the first slot.
    #[must_use]
    pub fn iter(&self) -> Slots<'_> {
        Slots {
            intervals: &self.intervals,
            step: self.step,
            index: 0,
            next: self.intervals.first().map(|interval| interval.start),
        }
    }
}

impl<'a> IntoIterator for &'a SlotSequence {
    type Item = DateTime<Utc>;
    type IntoIter = Slots<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`SlotSequence`].
#[derive(Debug, Clone)]
pub struct Slots<'a> {
    intervals: &'a [TimeWindow],
    step: Duration,
    index: usize,
    next: Option<DateTime<Utc>>,
}

impl Iterator for Slots<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let interval = self.intervals.get(self.index)?;
            let slot = self.next?;
            if slot + self.step <= interval.end {
                self.next = Some(slot + self.step);
                return Some(slot);
            }
            self.index += 1;
            self.next = self.intervals.get(self.index).map(|interval| interval.start);
        }
    }
}
