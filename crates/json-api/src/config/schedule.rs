//! Schedule Config

use clap::Args;

/// Campaign schedule settings.
#[derive(Debug, Args)]
pub struct ScheduleConfig {
    /// IANA time zone campaign dates and hours are evaluated in
    #[arg(long, env = "SCHEDULE_TIME_ZONE", default_value = "UTC")]
    pub schedule_time_zone: String,
}
