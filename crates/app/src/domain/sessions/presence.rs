//! Presence derivation.
//!
//! A tab sends a heartbeat every five seconds while open, so a session is
//! online when its last heartbeat is recent enough. Leaving sets
//! `last_active` to the Unix epoch, which is always offline.

use jiff::{SignedDuration, Timestamp};

/// Maximum heartbeat age for a session to count as online.
pub const ONLINE_THRESHOLD: SignedDuration = SignedDuration::from_secs(12);

/// Whether a session last seen at `last_active` is online at `now`.
#[must_use]
pub fn is_online(last_active: Timestamp, now: Timestamp) -> bool {
    now.duration_since(last_active) < ONLINE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn recent_heartbeats_are_online() -> TestResult {
        let now: Timestamp = "2026-03-01T10:00:00Z".parse()?;

        assert!(is_online(now, now));
        assert!(is_online(now.checked_sub(SignedDuration::from_secs(11))?, now));

        Ok(())
    }

    #[test]
    fn heartbeats_at_or_past_the_threshold_are_offline() -> TestResult {
        let now: Timestamp = "2026-03-01T10:00:00Z".parse()?;

        assert!(!is_online(now.checked_sub(ONLINE_THRESHOLD)?, now));
        assert!(!is_online(now.checked_sub(SignedDuration::from_mins(5))?, now));

        Ok(())
    }

    #[test]
    fn leaving_is_always_offline() -> TestResult {
        let now: Timestamp = "2026-03-01T10:00:00Z".parse()?;

        assert!(!is_online(Timestamp::UNIX_EPOCH, now));

        Ok(())
    }
}
