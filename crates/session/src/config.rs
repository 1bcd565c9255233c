use chrono::Duration;
use tracing::warn;

/// Lifetime assumed for tokens that carry no `exp` claim
pub const DEFAULT_SESSION_WINDOW_SECS: i64 = 2 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub session_window: Duration,
}

impl SessionConfig {
    /// Window of `secs` seconds; values chrono cannot represent fall back
    /// to the default
    pub fn with_session_window_secs(secs: u64) -> Self {
        let session_window = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| {
                warn!("Session window of {secs}s is out of range, using the default");
                Duration::seconds(DEFAULT_SESSION_WINDOW_SECS)
            });
        Self { session_window }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_window: Duration::seconds(DEFAULT_SESSION_WINDOW_SECS),
        }
    }
}
