//! Reconnect policy
//!
//! `Immediate` restarts as soon as a handle is observed closed, bounded only
//! by how fast the transport gives up on an attempt. `Backoff` waits
//! exponentially longer after each consecutive attempt that never opened.

use serde::{Deserialize, Serialize};

/// How eagerly the supervisor restarts after a close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ReconnectPolicy {
    /// Restart on the first check after a close
    #[default]
    Immediate,
    /// Wait `initial_delay_ms * 2^(failures - 1)`, capped at `max_delay_ms`
    Backoff {
        initial_delay_ms: u64,
        max_delay_ms: u64,
    },
}

impl ReconnectPolicy {
    /// Backoff with the defaults used by the CLI's `--backoff` flag
    pub fn backoff() -> Self {
        ReconnectPolicy::Backoff {
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }

    /// Delay before the next attempt after `failures` consecutive attempts
    /// that never opened
    pub fn delay_after(&self, failures: u32) -> u64 {
        match *self {
            ReconnectPolicy::Immediate => 0,
            ReconnectPolicy::Backoff { .. } if failures == 0 => 0,
            ReconnectPolicy::Backoff {
                initial_delay_ms,
                max_delay_ms,
            } => {
                let factor = 1u64.checked_shl(failures - 1).unwrap_or(u64::MAX);
                initial_delay_ms.saturating_mul(factor).min(max_delay_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_never_waits() {
        let policy = ReconnectPolicy::Immediate;
        for failures in [0, 1, 5, 100] {
            assert_eq!(policy.delay_after(failures), 0);
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = ReconnectPolicy::Backoff {
            initial_delay_ms: 250,
            max_delay_ms: 2_000,
        };

        assert_eq!(policy.delay_after(0), 0);
        assert_eq!(policy.delay_after(1), 250);
        assert_eq!(policy.delay_after(2), 500);
        assert_eq!(policy.delay_after(3), 1_000);
        assert_eq!(policy.delay_after(4), 2_000);
        assert_eq!(policy.delay_after(5), 2_000);
        assert_eq!(policy.delay_after(200), 2_000);
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: ReconnectPolicy = serde_json::from_str(r#"{"policy": "immediate"}"#).unwrap();
        assert_eq!(policy, ReconnectPolicy::Immediate);

        let policy: ReconnectPolicy = serde_json::from_str(
            r#"{"policy": "backoff", "initial_delay_ms": 500, "max_delay_ms": 8000}"#,
        )
        .unwrap();
        assert_eq!(
            policy,
            ReconnectPolicy::Backoff {
                initial_delay_ms: 500,
                max_delay_ms: 8_000
            }
        );
    }
}
