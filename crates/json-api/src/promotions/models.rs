//! Promotion request and response bodies.

use std::collections::BTreeMap;

use jiff::{Timestamp, civil::Date};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use umutoza_app::domain::promotions::{
    data::PromotionPatch,
    records::{PromotionRecord, PromotionUuid},
    rotation::{ExposureLog, Selection, Slot},
    schedule::TargetHours,
    service::PromotionSelection,
};

use crate::{errors::ApiError, forms::FormInput};

/// Promotion Response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromotionResponse {
    pub id: Uuid,
    pub name: String,

    /// Placement: `popup`, `bottom` or `inline`
    #[serde(rename = "type")]
    pub placement: String,

    pub media_type: String,
    pub media_url: Option<String>,
    pub link_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,

    /// Seconds before a popup closes itself; zero keeps it open
    pub display_duration: u32,

    pub layout: String,
    pub theme_color: String,
    pub text_color: String,
    pub background_color: String,
    pub button_color: String,
    pub button_text_color: String,
    pub overlay_opacity: f64,
    pub position: String,
    pub cta_text: String,
    pub show_button: bool,
    pub can_close: bool,
    pub full_media: bool,
    pub trick_on_close: bool,
    pub priority: i32,
    pub frequency: u32,
    pub frequency_unit: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub minutes_per_hour: u8,

    /// Hours of the day the campaign runs in; empty means every hour
    pub target_hours: Vec<u8>,

    pub is_active: bool,
    pub impressions: u64,
    pub clicks: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PromotionRecord> for PromotionResponse {
    fn from(record: PromotionRecord) -> Self {
        let PromotionRecord {
            uuid,
            creative,
            schedule,
            is_active,
            impressions,
            clicks,
            created_at,
            updated_at,
        } = record;

        Self {
            id: uuid.into_uuid(),
            name: creative.name,
            placement: schedule.placement.to_string(),
            media_type: creative.media_type.to_string(),
            media_url: creative.media_url,
            link_url: creative.link_url,
            title: creative.title,
            description: creative.description,
            display_duration: creative.display_duration,
            layout: creative.layout.to_string(),
            theme_color: creative.palette.theme,
            text_color: creative.palette.text,
            background_color: creative.palette.background,
            button_color: creative.palette.button,
            button_text_color: creative.palette.button_text,
            overlay_opacity: creative.overlay_opacity,
            position: creative.position,
            cta_text: creative.cta_text,
            show_button: creative.show_button,
            can_close: creative.can_close,
            full_media: creative.full_media,
            trick_on_close: creative.trick_on_close,
            priority: schedule.priority,
            frequency: schedule.frequency.every,
            frequency_unit: schedule.frequency.unit.to_string(),
            start_date: schedule.start_date.as_ref().map(Date::to_string),
            end_date: schedule.end_date.as_ref().map(Date::to_string),
            minutes_per_hour: schedule.minutes_per_hour,
            target_hours: schedule.target_hours.as_slice().to_vec(),
            is_active,
            impressions,
            clicks,
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
        }
    }
}

fn nullable_date(form: &FormInput, name: &str) -> Result<Option<Option<Date>>, ApiError> {
    form.nullable(name)
        .map(|value| {
            value
                .map(|value| {
                    value.parse::<Date>().map_err(|source| {
                        ApiError::validation(format!("{name} is not a calendar date: {source}"))
                    })
                })
                .transpose()
        })
        .transpose()
}

fn target_hours(form: &FormInput) -> Result<Option<TargetHours>, ApiError> {
    let raw = form.list("targetHours");

    if raw.is_empty() {
        return Ok(None);
    }

    let hours = raw
        .into_iter()
        .map(|value| {
            value
                .parse::<i64>()
                .map_err(|source| ApiError::validation(format!("targetHours is invalid: {source}")))
        })
        .collect::<Result<Vec<i64>, ApiError>>()?;

    TargetHours::new(hours)
        .map(Some)
        .map_err(|source| ApiError::validation(format!("targetHours is invalid: {source}")))
}

/// Read a campaign form. Fields left out of the form stay `None` so updates
/// keep their stored values.
pub(crate) fn promotion_patch(form: &FormInput) -> Result<PromotionPatch, ApiError> {
    Ok(PromotionPatch {
        name: form.text("name").map(ToOwned::to_owned),
        placement: form.parse("type")?,
        media_type: form.parse("mediaType")?,
        media_url: form.nullable("mediaUrl"),
        link_url: form.nullable("linkUrl"),
        title: form.nullable("title"),
        description: form.nullable("description"),
        display_duration: form.parse("displayDuration")?,
        layout: form.parse("layout")?,
        theme_color: form.text("themeColor").map(ToOwned::to_owned),
        text_color: form.text("textColor").map(ToOwned::to_owned),
        background_color: form.text("backgroundColor").map(ToOwned::to_owned),
        button_color: form.text("buttonColor").map(ToOwned::to_owned),
        button_text_color: form.text("buttonTextColor").map(ToOwned::to_owned),
        overlay_opacity: form.parse("overlayOpacity")?,
        position: form.text("position").map(ToOwned::to_owned),
        cta_text: form.text("ctaText").map(ToOwned::to_owned),
        show_button: form.flag("showButton"),
        can_close: form.flag("canClose"),
        full_media: form.flag("fullMedia"),
        trick_on_close: form.flag("trickOnClose"),
        priority: form.parse("priority")?,
        frequency: form.parse("frequency")?,
        frequency_unit: form.parse("frequencyUnit")?,
        start_date: nullable_date(form, "startDate")?,
        end_date: nullable_date(form, "endDate")?,
        minutes_per_hour: form.parse("minutesPerHour")?,
        target_hours: target_hours(form)?,
        is_active: form.flag("isActive"),
    })
}

/// A campaign on a viewer's screen. Times are Unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SlotBody {
    pub promotion_id: Uuid,
    pub shown_at: i64,

    /// When a timed popup closes itself
    #[serde(default)]
    pub dismiss_at: Option<i64>,
}

impl SlotBody {
    fn into_slot(self) -> Result<Slot, ApiError> {
        Ok(Slot {
            promotion: PromotionUuid::from_uuid(self.promotion_id),
            shown_at: millis("shownAt", self.shown_at)?,
            dismiss_at: self
                .dismiss_at
                .map(|value| millis("dismissAt", value))
                .transpose()?,
        })
    }
}

impl From<Slot> for SlotBody {
    fn from(slot: Slot) -> Self {
        Self {
            promotion_id: slot.promotion.into_uuid(),
            shown_at: slot.shown_at.as_millisecond(),
            dismiss_at: slot.dismiss_at.map(Timestamp::as_millisecond),
        }
    }
}

fn millis(field: &str, value: i64) -> Result<Timestamp, ApiError> {
    Timestamp::from_millisecond(value)
        .map_err(|source| ApiError::validation(format!("{field} is out of range: {source}")))
}

/// What the viewer currently has on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct SelectionBody {
    #[serde(default)]
    pub popup: Option<SlotBody>,

    #[serde(default)]
    pub bottom: Option<SlotBody>,
}

/// Selection Request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SelectionRequest {
    #[serde(default)]
    pub previous: SelectionBody,

    /// Last time the viewer saw each campaign, keyed by promotion id, in Unix
    /// milliseconds
    #[serde(default)]
    pub exposures: BTreeMap<String, i64>,
}

impl SelectionRequest {
    pub(crate) fn into_parts(self) -> Result<(Selection, ExposureLog), ApiError> {
        let selection = Selection {
            popup: self.previous.popup.map(SlotBody::into_slot).transpose()?,
            bottom: self.previous.bottom.map(SlotBody::into_slot).transpose()?,
        };

        let exposures = self
            .exposures
            .into_iter()
            .map(|(id, shown)| {
                let promotion = id.parse::<PromotionUuid>().map_err(|source| {
                    ApiError::validation(format!("exposures key {id:?} is not an id: {source}"))
                })?;

                Ok((promotion, millis("exposures", shown)?))
            })
            .collect::<Result<ExposureLog, ApiError>>()?;

        Ok((selection, exposures))
    }
}

/// Selection Response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SelectionResponse {
    pub popup: Option<SlotBody>,
    pub bottom: Option<SlotBody>,

    /// Campaigns newly put on screen by this step
    pub surfaced: Vec<Uuid>,

    /// Updated history to send with the next request
    pub exposures: BTreeMap<String, i64>,

    /// Full details of the campaigns on screen
    pub promotions: Vec<PromotionResponse>,
}

impl From<PromotionSelection> for SelectionResponse {
    fn from(selection: PromotionSelection) -> Self {
        let PromotionSelection {
            rotation,
            exposures,
            promotions,
        } = selection;

        Self {
            popup: rotation.selection.popup.map(Into::into),
            bottom: rotation.selection.bottom.map(Into::into),
            surfaced: rotation.surfaced.into_iter().map(PromotionUuid::into_uuid).collect(),
            exposures: exposures
                .into_iter()
                .map(|(promotion, shown)| (promotion.to_string(), shown.as_millisecond()))
                .collect(),
            promotions: promotions.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use umutoza_app::domain::promotions::{
        records::{Layout, MediaType},
        schedule::{FrequencyUnit, Placement},
    };

    use super::*;

    #[test]
    fn form_fields_map_onto_a_patch() -> TestResult {
        let form = FormInput::from_pairs([
            ("name", "Spring sale"),
            ("type", "bottom"),
            ("mediaType", "video"),
            ("layout", "glassmorphism"),
            ("frequencyUnit", "hours"),
            ("frequency", "2"),
            ("minutesPerHour", "20"),
            ("targetHours[]", "8"),
            ("targetHours[]", "9"),
            ("startDate", "2026-03-01"),
            ("endDate", ""),
            ("title", ""),
            ("showButton", "true"),
        ]);

        let patch = promotion_patch(&form)?;

        assert_eq!(patch.name.as_deref(), Some("Spring sale"), "name");
        assert_eq!(patch.placement, Some(Placement::Bottom), "placement");
        assert_eq!(patch.media_type, Some(MediaType::Video), "media type");
        assert_eq!(patch.layout, Some(Layout::Glassmorphism), "layout");
        assert_eq!(patch.frequency_unit, Some(FrequencyUnit::Hours), "unit");
        assert_eq!(patch.frequency, Some(2), "frequency");
        assert_eq!(patch.minutes_per_hour, Some(20), "minutes");
        assert_eq!(
            patch.target_hours.as_ref().map(TargetHours::as_slice),
            Some([8_u8, 9].as_slice()),
            "hours"
        );
        assert_eq!(patch.start_date, Some(Some(date(2026, 3, 1))), "start date");
        assert_eq!(patch.end_date, Some(None), "cleared end date");
        assert_eq!(patch.title, Some(None), "cleared title");
        assert_eq!(patch.show_button, Some(true), "flag");
        assert_eq!(patch.is_active, None, "missing flag keeps stored value");
        assert_eq!(patch.priority, None, "missing number keeps stored value");

        Ok(())
    }

    #[test]
    fn unknown_labels_and_hours_are_rejected() {
        let placement = FormInput::from_pairs([("type", "sidebar")]);
        let hours = FormInput::from_pairs([("targetHours", "24")]);

        assert!(promotion_patch(&placement).is_err(), "unknown placement");
        assert!(promotion_patch(&hours).is_err(), "hour out of range");
    }

    #[test]
    fn selection_requests_decode_millisecond_times() -> TestResult {
        let promotion = PromotionUuid::new();

        let request = SelectionRequest {
            previous: SelectionBody {
                popup: Some(SlotBody {
                    promotion_id: promotion.into_uuid(),
                    shown_at: 1_000,
                    dismiss_at: Some(6_000),
                }),
                bottom: None,
            },
            exposures: BTreeMap::from([(promotion.to_string(), 1_000)]),
        };

        let (selection, exposures) = request.into_parts()?;
        let popup = selection.popup.ok_or("popup slot")?;

        assert_eq!(popup.promotion, promotion, "slot promotion");
        assert_eq!(popup.dismiss_at, Some(Timestamp::from_millisecond(6_000)?), "deadline");
        assert_eq!(
            exposures.get(&promotion).copied(),
            Some(Timestamp::from_millisecond(1_000)?),
            "exposure"
        );

        Ok(())
    }

    #[test]
    fn malformed_exposure_keys_are_rejected() {
        let request = SelectionRequest {
            exposures: BTreeMap::from([("banner-1".to_owned(), 1_000)]),
            ..SelectionRequest::default()
        };

        assert!(request.into_parts().is_err(), "expected a validation error");
    }
}
