//! Scheduling vocabulary shared by capacity checks and rotation.

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use smallvec::SmallVec;
use thiserror::Error;

use crate::labels::labelled_enum;

/// Minutes available to each placement in every hour.
pub const MINUTES_IN_HOUR: u8 = 60;

/// Hours in a day; valid target hours are `0..HOURS_IN_DAY`.
pub const HOURS_IN_DAY: u8 = 24;

labelled_enum! {
    /// Where a campaign is rendered.
    pub enum Placement ("placement") {
        /// Modal overlay.
        Popup => "popup",
        /// Sticky bar along the bottom edge.
        Bottom => "bottom",
        /// Embedded in page content; never rotated.
        Inline => "inline",
    }
}

labelled_enum! {
    /// Unit of a campaign's re-show interval.
    pub enum FrequencyUnit ("frequency unit") {
        Minutes => "minutes",
        Hours => "hours",
        Days => "days",
    }
}

impl FrequencyUnit {
    /// Length of one unit in milliseconds.
    #[must_use]
    pub const fn millis(self) -> i64 {
        match self {
            Self::Minutes => 60_000,
            Self::Hours => 3_600_000,
            Self::Days => 86_400_000,
        }
    }
}

/// Minimum interval before the same viewer sees a campaign again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    /// Number of units; zero disables the cap.
    pub every: u32,
    pub unit: FrequencyUnit,
}

impl Frequency {
    /// Cap window in milliseconds, or `None` when uncapped.
    #[must_use]
    pub fn window_millis(self) -> Option<i64> {
        (self.every > 0).then(|| i64::from(self.every).saturating_mul(self.unit.millis()))
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("hour {0} is outside 0..=23")]
pub struct InvalidHour(pub i64);

/// Hours of the day a campaign runs in. Empty means every hour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetHours(SmallVec<[u8; 8]>);

impl TargetHours {
    /// Every hour of the day.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Build from raw hour values, sorting and removing duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHour`] for any value outside `0..=23`.
    pub fn new<I, H>(hours: I) -> Result<Self, InvalidHour>
    where
        I: IntoIterator<Item = H>,
        H: Into<i64>,
    {
        let mut collected = hours
            .into_iter()
            .map(|hour| {
                let hour = hour.into();

                u8::try_from(hour)
                    .ok()
                    .filter(|value| *value < HOURS_IN_DAY)
                    .ok_or(InvalidHour(hour))
            })
            .collect::<Result<SmallVec<[u8; 8]>, _>>()?;

        collected.sort_unstable();
        collected.dedup();

        Ok(Self(collected))
    }

    #[must_use]
    pub fn is_every_hour(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the campaign runs during `hour`.
    #[must_use]
    pub fn covers(&self, hour: u8) -> bool {
        self.0.is_empty() || self.0.contains(&hour)
    }

    /// Concrete hours, expanding "every hour" to `0..24`.
    pub fn expand(&self) -> impl Iterator<Item = u8> + '_ {
        let every_hour = self.0.is_empty().then_some(0..HOURS_IN_DAY);

        every_hour
            .into_iter()
            .flatten()
            .chain(self.0.iter().copied())
    }

    /// Explicitly listed hours, empty for "every hour".
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// A clock reading projected into the schedule time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleInstant {
    pub timestamp: Timestamp,
    pub date: Date,
    pub hour: u8,
    pub minute: u8,
}

impl ScheduleInstant {
    #[must_use]
    pub fn new(timestamp: Timestamp, time_zone: &TimeZone) -> Self {
        let zoned = timestamp.to_zoned(time_zone.clone());

        Self {
            timestamp,
            date: zoned.date(),
            hour: zoned.hour().unsigned_abs(),
            minute: zoned.minute().unsigned_abs(),
        }
    }
}

/// Inclusive calendar-date window; a missing bound is open on that side.
#[must_use]
pub fn within_dates(start: Option<Date>, end: Option<Date>, date: Date) -> bool {
    start.is_none_or(|start| start <= date) && end.is_none_or(|end| date <= end)
}
