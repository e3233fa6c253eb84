//! Auth Config

use clap::Args;

/// Admin token settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// Secret mixed into stored admin session hashes
    #[arg(long, env = "AUTH_TOKEN_PEPPER", hide_env_values = true)]
    pub token_pepper: String,

    /// Hours an issued admin token stays valid
    #[arg(long, env = "AUTH_TOKEN_TTL_HOURS", default_value_t = 24_i64)]
    pub token_ttl_hours: i64,
}
