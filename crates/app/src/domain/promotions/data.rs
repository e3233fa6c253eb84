//! Promotion Data

use jiff::civil::Date;

use crate::domain::promotions::{
    errors::PromotionValidationError,
    records::{Creative, Layout, MediaType, PromotionRecord, Schedule},
    schedule::{FrequencyUnit, MINUTES_IN_HOUR, Placement, TargetHours},
};

/// Complete set of editable campaign values. New campaigns start inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromotionDraft {
    pub creative: Creative,
    pub schedule: Schedule,
    pub is_active: bool,
}

impl From<&PromotionRecord> for PromotionDraft {
    fn from(record: &PromotionRecord) -> Self {
        Self {
            creative: record.creative.clone(),
            schedule: record.schedule.clone(),
            is_active: record.is_active,
        }
    }
}

/// Submitted campaign values. `None` keeps the current (or default) value;
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromotionPatch {
    pub name: Option<String>,
    pub placement: Option<Placement>,
    pub media_type: Option<MediaType>,
    pub media_url: Option<Option<String>>,
    pub link_url: Option<Option<String>>,
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub display_duration: Option<u32>,
    pub layout: Option<Layout>,
    pub theme_color: Option<String>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub button_color: Option<String>,
    pub button_text_color: Option<String>,
    pub overlay_opacity: Option<f64>,
    pub position: Option<String>,
    pub cta_text: Option<String>,
    pub show_button: Option<bool>,
    pub can_close: Option<bool>,
    pub full_media: Option<bool>,
    pub trick_on_close: Option<bool>,
    pub priority: Option<i32>,
    pub frequency: Option<u32>,
    pub frequency_unit: Option<FrequencyUnit>,
    pub start_date: Option<Option<Date>>,
    pub end_date: Option<Option<Date>>,
    pub minutes_per_hour: Option<u8>,
    pub target_hours: Option<TargetHours>,
    pub is_active: Option<bool>,
}

macro_rules! overwrite {
    ($target:expr, $value:expr) => {
        if let Some(value) = $value {
            $target = value;
        }
    };
}

impl PromotionPatch {
    /// Check the values that were supplied.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> Result<(), PromotionValidationError> {
        if let Some(minutes) = self.minutes_per_hour
            && !(1..=MINUTES_IN_HOUR).contains(&minutes)
        {
            return Err(PromotionValidationError::MinutesPerHour(minutes));
        }

        if let Some(opacity) = self.overlay_opacity
            && !(0.0..=1.0).contains(&opacity)
        {
            return Err(PromotionValidationError::OverlayOpacity(opacity));
        }

        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(PromotionValidationError::BlankName);
        }

        Ok(())
    }

    /// Layer the supplied values over `draft`.
    #[must_use]
    pub fn apply(self, mut draft: PromotionDraft) -> PromotionDraft {
        let creative = &mut draft.creative;

        overwrite!(creative.name, self.name);
        overwrite!(creative.media_type, self.media_type);
        overwrite!(creative.media_url, self.media_url);
        overwrite!(creative.link_url, self.link_url);
        overwrite!(creative.title, self.title);
        overwrite!(creative.description, self.description);
        overwrite!(creative.display_duration, self.display_duration);
        overwrite!(creative.layout, self.layout);
        overwrite!(creative.palette.theme, self.theme_color);
        overwrite!(creative.palette.text, self.text_color);
        overwrite!(creative.palette.background, self.background_color);
        overwrite!(creative.palette.button, self.button_color);
        overwrite!(creative.palette.button_text, self.button_text_color);
        overwrite!(creative.overlay_opacity, self.overlay_opacity);
        overwrite!(creative.position, self.position);
        overwrite!(creative.cta_text, self.cta_text);
        overwrite!(creative.show_button, self.show_button);
        overwrite!(creative.can_close, self.can_close);
        overwrite!(creative.full_media, self.full_media);
        overwrite!(creative.trick_on_close, self.trick_on_close);

        let schedule = &mut draft.schedule;

        overwrite!(schedule.placement, self.placement);
        overwrite!(schedule.priority, self.priority);
        overwrite!(schedule.frequency.every, self.frequency);
        overwrite!(schedule.frequency.unit, self.frequency_unit);
        overwrite!(schedule.start_date, self.start_date);
        overwrite!(schedule.end_date, self.end_date);
        overwrite!(schedule.minutes_per_hour, self.minutes_per_hour);
        overwrite!(schedule.target_hours, self.target_hours);

        overwrite!(draft.is_active, self.is_active);

        draft
    }
}
