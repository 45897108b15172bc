//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use std::time::{Duration, Instant};

/// Listener poll interval used by the tests
pub const TEST_POLL: Duration = Duration::from_millis(10);

/// Allowance for thread wake-up on top of a poll interval
pub const SCHEDULING_SLACK: Duration = Duration::from_millis(15);

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(2)
}

/// Poll `cond` every millisecond until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
