//! Campaign rotation.
//!
//! [`rotate`] decides what a single viewer should see right now: at most one
//! popup and one bottom bar. Each placement's hour is divided between its
//! eligible campaigns in priority order, each getting a contiguous
//! `minutes_per_hour` slice; the current minute picks the slice. Per-viewer
//! frequency caps are read from and written to an injected [`ExposureHistory`].

use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::domain::promotions::{
    records::{PromotionRecord, PromotionUuid},
    schedule::{Placement, ScheduleInstant, within_dates},
};

/// Placements that take part in rotation.
pub const ROTATED_PLACEMENTS: [Placement; 2] = [Placement::Popup, Placement::Bottom];

/// When a viewer last saw each campaign.
pub trait ExposureHistory {
    fn last_shown(&self, promotion: PromotionUuid) -> Option<Timestamp>;

    fn record_shown(&mut self, promotion: PromotionUuid, at: Timestamp);
}

/// In-memory exposure history keyed by campaign.
pub type ExposureLog = FxHashMap<PromotionUuid, Timestamp>;

impl ExposureHistory for ExposureLog {
    fn last_shown(&self, promotion: PromotionUuid) -> Option<Timestamp> {
        self.get(&promotion).copied()
    }

    fn record_shown(&mut self, promotion: PromotionUuid, at: Timestamp) {
        self.insert(promotion, at);
    }
}

/// A campaign currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub promotion: PromotionUuid,
    pub shown_at: Timestamp,

    /// Auto-dismiss deadline for timed popups.
    pub dismiss_at: Option<Timestamp>,
}

impl Slot {
    fn is_dismissed(&self, now: Timestamp) -> bool {
        self.dismiss_at.is_some_and(|deadline| deadline <= now)
    }
}

/// What a viewer has on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub popup: Option<Slot>,
    pub bottom: Option<Slot>,
}

impl Selection {
    #[must_use]
    pub fn slot(&self, placement: Placement) -> Option<&Slot> {
        match placement {
            Placement::Popup => self.popup.as_ref(),
            Placement::Bottom => self.bottom.as_ref(),
            Placement::Inline => None,
        }
    }

    fn set(&mut self, placement: Placement, slot: Option<Slot>) {
        match placement {
            Placement::Popup => self.popup = slot,
            Placement::Bottom => self.bottom = slot,
            Placement::Inline => {}
        }
    }
}

/// Result of one rotation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rotation {
    pub selection: Selection,

    /// Campaigns shown by this step that were not on screen before; each
    /// earns exactly one impression.
    pub surfaced: SmallVec<[PromotionUuid; 2]>,
}

/// Whether `promotion` may run in `placement` at `now`, ignoring time slices.
#[must_use]
pub fn is_eligible(promotion: &PromotionRecord, placement: Placement, now: &ScheduleInstant) -> bool {
    let schedule = &promotion.schedule;

    promotion.is_active
        && schedule.placement == placement
        && within_dates(schedule.start_date, schedule.end_date, now.date)
        && schedule.target_hours.covers(now.hour)
}

/// Eligible campaigns for `placement`, highest priority first. Ties keep
/// catalog order.
#[must_use]
pub fn ranked_candidates<'a>(
    catalog: &'a [PromotionRecord],
    placement: Placement,
    now: &ScheduleInstant,
) -> Vec<&'a PromotionRecord> {
    let mut candidates: Vec<&PromotionRecord> = catalog
        .iter()
        .filter(|promotion| is_eligible(promotion, placement, now))
        .collect();

    candidates.sort_by_key(|promotion| std::cmp::Reverse(promotion.schedule.priority));

    candidates
}

/// Campaign whose slice of the hour contains `minute`. Slices run back to
/// back in the given order; minutes past the last slice select nothing.
#[must_use]
pub fn time_slice<'a>(candidates: &[&'a PromotionRecord], minute: u8) -> Option<&'a PromotionRecord> {
    let minute = u32::from(minute);
    let mut offset = 0_u32;

    for candidate in candidates {
        let end = offset + u32::from(candidate.schedule.minutes_per_hour);

        if (offset..end).contains(&minute) {
            return Some(*candidate);
        }

        offset = end;
    }

    None
}

fn is_capped(promotion: &PromotionRecord, history: &impl ExposureHistory, now: Timestamp) -> bool {
    let Some(window) = promotion.schedule.frequency.window_millis() else {
        return false;
    };

    history
        .last_shown(promotion.uuid)
        .is_some_and(|shown| now.as_millisecond() - shown.as_millisecond() < window)
}

fn dismiss_deadline(promotion: &PromotionRecord, placement: Placement, now: Timestamp) -> Option<Timestamp> {
    let seconds = promotion.creative.display_duration;

    if placement != Placement::Popup || seconds == 0 {
        return None;
    }

    now.checked_add(SignedDuration::from_secs(i64::from(seconds))).ok()
}

/// Advance one viewer's selection to `now`.
///
/// A campaign that is still the slice winner and was already on screen stays,
/// unchanged, unless its popup timer has run out. Anything newly surfaced is
/// recorded in `history`; a slice winner still inside its frequency window
/// leaves the placement empty.
pub fn rotate(
    previous: &Selection,
    catalog: &[PromotionRecord],
    now: &ScheduleInstant,
    history: &mut impl ExposureHistory,
) -> Rotation {
    let mut rotation = Rotation::default();

    for placement in ROTATED_PLACEMENTS {
        let candidates = ranked_candidates(catalog, placement, now);

        let Some(winner) = time_slice(&candidates, now.minute) else {
            continue;
        };

        if let Some(current) = previous.slot(placement)
            && current.promotion == winner.uuid
            && !current.is_dismissed(now.timestamp)
        {
            rotation.selection.set(placement, Some(*current));
            continue;
        }

        if is_capped(winner, history, now.timestamp) {
            continue;
        }

        history.record_shown(winner.uuid, now.timestamp);

        rotation.selection.set(
            placement,
            Some(Slot {
                promotion: winner.uuid,
                shown_at: now.timestamp,
                dismiss_at: dismiss_deadline(winner, placement, now.timestamp),
            }),
        );
        rotation.surfaced.push(winner.uuid);
    }

    rotation
}
