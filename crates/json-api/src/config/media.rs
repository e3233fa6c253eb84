//! Media Config

use std::path::PathBuf;

use clap::Args;

/// Uploaded media settings.
#[derive(Debug, Args)]
pub struct MediaConfig {
    /// Directory uploaded files are written to and served from
    #[arg(long, env = "UPLOADS_DIR", default_value = "uploads")]
    pub uploads_dir: PathBuf,
}
