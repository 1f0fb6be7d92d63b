//! Per-invocation platform metadata.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Metadata the platform supplies alongside each event.
///
/// The shim attaches this to the normalized request unmodified so application
/// code can read it; the shim itself never interprets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LambdaContext {
    pub aws_request_id: String,
    pub function_name: String,
    pub function_version: String,
    pub memory_limit_in_mb: u32,
    /// Invocation deadline, milliseconds since the unix epoch. Zero when the
    /// platform reports none.
    pub deadline_ms: u64,
}

impl LambdaContext {
    /// Time left before the platform terminates this invocation.
    ///
    /// Returns zero when the deadline has passed or was never reported.
    pub fn remaining_time(&self) -> Duration {
        let deadline = UNIX_EPOCH + Duration::from_millis(self.deadline_ms);
        deadline.duration_since(SystemTime::now()).unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::LambdaContext;

    #[test]
    fn remaining_time_counts_down_to_deadline() {
        let now_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as u64;
        let context = LambdaContext { deadline_ms: now_ms + 60_000, ..Default::default() };

        let remaining = context.remaining_time();
        assert!(remaining > Duration::from_secs(50));
        assert!(remaining <= Duration::from_secs(60));
    }

    #[test]
    fn remaining_time_is_zero_without_deadline() {
        let context = LambdaContext::default();
        assert_eq!(context.remaining_time(), Duration::ZERO);
    }
}
