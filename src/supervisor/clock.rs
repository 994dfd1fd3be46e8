//! Wall clock used for sample timestamps and backoff deadlines

/// Source of "now" in milliseconds since the Unix epoch
pub trait Clock: Send {
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
