//! Promotion Records

use jiff::{Timestamp, civil::Date};

use crate::{
    domain::promotions::schedule::{Frequency, FrequencyUnit, Placement, TargetHours},
    labels::labelled_enum,
    uuids::TypedUuid,
};

/// Promotion UUID
pub type PromotionUuid = TypedUuid<PromotionRecord>;

labelled_enum! {
    /// Kind of creative attached to a campaign.
    pub enum MediaType ("media type") {
        Image => "image",
        Gif => "gif",
        Video => "video",
    }
}

labelled_enum! {
    /// Visual template for the rendered campaign.
    pub enum Layout ("layout") {
        Standard => "standard",
        Glassmorphism => "glassmorphism",
        Minimal => "minimal",
        Bold => "bold",
    }
}

/// Colours used when rendering a campaign, as CSS colour strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub theme: String,
    pub text: String,
    pub background: String,
    pub button: String,
    pub button_text: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            theme: "#4f46e5".to_owned(),
            text: "#ffffff".to_owned(),
            background: "#1e1b4b".to_owned(),
            button: "#facc15".to_owned(),
            button_text: "#000000".to_owned(),
        }
    }
}

/// What a viewer sees.
#[derive(Debug, Clone, PartialEq)]
pub struct Creative {
    pub name: String,
    pub media_type: MediaType,
    pub media_url: Option<String>,
    pub link_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,

    /// Seconds before a popup dismisses itself; zero keeps it until closed.
    pub display_duration: u32,

    pub layout: Layout,
    pub palette: Palette,

    /// Backdrop opacity in `0.0..=1.0`.
    pub overlay_opacity: f64,

    pub position: String,
    pub cta_text: String,
    pub show_button: bool,
    pub can_close: bool,
    pub full_media: bool,
    pub trick_on_close: bool,
}

impl Default for Creative {
    fn default() -> Self {
        Self {
            name: "Untitled Campaign".to_owned(),
            media_type: MediaType::Image,
            media_url: None,
            link_url: None,
            title: None,
            description: None,
            display_duration: 5,
            layout: Layout::Standard,
            palette: Palette::default(),
            overlay_opacity: 0.8,
            position: "center".to_owned(),
            cta_text: "PLAY NOW".to_owned(),
            show_button: false,
            can_close: true,
            full_media: false,
            trick_on_close: false,
        }
    }
}

/// When, where and how often a campaign runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub placement: Placement,

    /// Higher runs first within an hour.
    pub priority: i32,

    pub frequency: Frequency,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,

    /// Share of each targeted hour, `1..=60`.
    pub minutes_per_hour: u8,

    pub target_hours: TargetHours,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            placement: Placement::Popup,
            priority: 0,
            frequency: Frequency {
                every: 60,
                unit: FrequencyUnit::Minutes,
            },
            start_date: None,
            end_date: None,
            minutes_per_hour: 60,
            target_hours: TargetHours::all(),
        }
    }
}

/// Promotion Record
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRecord {
    pub uuid: PromotionUuid,
    pub creative: Creative,
    pub schedule: Schedule,
    pub is_active: bool,
    pub impressions: u64,
    pub clicks: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
