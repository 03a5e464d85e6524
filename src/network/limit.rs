//! Outbound send pacing.
//!
//! Servers disconnect clients that write too fast ("Excess Flood"). Every
//! line the bot sends passes through one [`SendPacer`], which holds the
//! caller until at least `min_interval` has elapsed since the previous send.
//! Unlike a token bucket there is no burst allowance: the first line goes out
//! immediately, every later one is spaced.

use tokio::time::{Duration, Instant, sleep_until};

/// Minimum-interval pacer for outbound lines.
#[derive(Debug)]
pub struct SendPacer {
    min_interval: Duration,
    last_send: Option<Instant>,
}

impl SendPacer {
    /// Create a pacer that spaces sends by at least `min_interval`.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_send: None,
        }
    }

    /// How long a send issued now would have to wait.
    pub fn delay(&self) -> Duration {
        match self.last_send {
            Some(last) => (last + self.min_interval).saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }

    /// Wait until a send is allowed.
    pub async fn ready(&self) {
        if let Some(last) = self.last_send {
            sleep_until(last + self.min_interval).await;
        }
    }

    /// Record that a line has just been written.
    pub fn record_send(&mut self) {
        self.last_send = Some(Instant::now());
    }
}
