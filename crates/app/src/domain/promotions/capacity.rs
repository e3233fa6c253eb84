//! Hourly capacity allocation.
//!
//! Every placement has [`MINUTES_IN_HOUR`] minutes to share in each hour of the
//! day. A campaign claims `minutes_per_hour` in every hour it targets; active
//! campaigns of one placement may never claim more than the hour holds.

use crate::domain::promotions::schedule::{MINUTES_IN_HOUR, TargetHours};

/// One campaign's claim on the hourly budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub minutes_per_hour: u8,
    pub target_hours: TargetHours,
}

/// An hour that cannot fit the requested minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityConflict {
    pub hour: u8,

    /// Minutes still free before the request; negative when the hour is
    /// already over-committed.
    pub available: i32,

    pub requested: u8,

    /// Minutes by which the request overflows the hour.
    pub overage: u32,
}

/// Check `requested` against the allocations already held by other active
/// campaigns of the same placement. Returns one conflict per full hour, in hour
/// order; an empty result means the request fits.
#[must_use]
pub fn check_capacity(requested: &Allocation, existing: &[Allocation]) -> Vec<CapacityConflict> {
    let budget = u32::from(MINUTES_IN_HOUR);
    let wanted = u32::from(requested.minutes_per_hour);

    requested
        .target_hours
        .expand()
        .filter_map(|hour| {
            let used: u32 = existing
                .iter()
                .filter(|allocation| allocation.target_hours.covers(hour))
                .map(|allocation| u32::from(allocation.minutes_per_hour))
                .sum();

            let total = used + wanted;

            (total > budget).then(|| CapacityConflict {
                hour,
                available: i32::from(MINUTES_IN_HOUR) - i32::try_from(used).unwrap_or(i32::MAX),
                requested: requested.minutes_per_hour,
                overage: total - budget,
            })
        })
        .collect()
}

/// Human-readable summary, e.g. `Hour(s) 8, 9 are full. Cannot add 25 minutes.`
#[must_use]
pub fn describe_conflicts(conflicts: &[CapacityConflict]) -> String {
    let hours = conflicts
        .iter()
        .map(|conflict| conflict.hour.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let requested = conflicts.first().map_or(0, |conflict| conflict.requested);

    format!("Hour(s) {hours} are full. Cannot add {requested} minutes.")
}
