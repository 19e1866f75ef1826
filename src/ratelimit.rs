use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// Fixed-window request throttle: after every `requests_per_window`
/// completed requests, pause for a fixed duration. The policy is
/// deliberately non-adaptive; it exists to stay under a vendor rate limit,
/// not to react to one.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    requests_per_window: u32,
    pause: Duration,
    sent: u32,
}

impl FixedWindowLimiter {
    pub fn new(requests_per_window: u32, pause: Duration) -> Self {
        assert!(requests_per_window >= 1, "window must hold at least one request");
        Self {
            requests_per_window,
            pause,
            sent: 0,
        }
    }

    /// Record one completed request. Returns whether the window just filled
    /// and a pause is due. Pure, for testability; `tick` does the sleeping.
    pub fn advance(&mut self) -> bool {
        self.sent += 1;
        self.sent % self.requests_per_window == 0
    }

    /// Record one completed request, pausing if the window filled.
    pub async fn tick(&mut self) {
        if self.advance() {
            info!(
                "Completed {} requests. Pausing for {:?} to stay under the rate limit...",
                self.sent, self.pause
            );
            sleep(self.pause).await;
        }
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }
}
