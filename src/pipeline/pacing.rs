//! Response pacing: artificial typing delay before a bot reply is shown.
//!
//! Delay = base(complexity) + jitter in [0, 500) ms:
//! - simple: [800, 1300) ms
//! - medium: [1500, 2000) ms
//! - complex: [2500, 3000) ms
//!
//! The delay runs as a cancellable timer. Whoever holds the `PacingHandle`
//! can cancel it; dropping the handle cancels it too, so clearing the
//! session state is enough to stop a late reply.

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::oneshot;

use crate::models::Complexity;

/// Width of the jitter window added to every base delay.
pub const JITTER_RANGE_MS: u64 = 500;

/// Base delay for a complexity tier.
pub fn base_delay(complexity: Complexity) -> Duration {
    match complexity {
        Complexity::Simple => Duration::from_millis(800),
        Complexity::Medium => Duration::from_millis(1500),
        Complexity::Complex => Duration::from_millis(2500),
    }
}

// ═══════════════════════════════════════════
// Jitter sources
// ═══════════════════════════════════════════

/// Source of the random part of the delay.
pub trait JitterSource: Send + Sync {
    /// A value in `[0, upper)`.
    fn jitter_ms(&self, upper: u64) -> u64;
}

/// Uniform jitter from a `StdRng`.
pub struct RandomJitter {
    rng: Mutex<StdRng>,
}

impl RandomJitter {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl JitterSource for RandomJitter {
    fn jitter_ms(&self, upper: u64) -> u64 {
        if upper == 0 {
            return 0;
        }
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..upper),
            // Poisoning leaves the RNG state usable.
            Err(poisoned) => poisoned.into_inner().gen_range(0..upper),
        }
    }
}

/// Always the same jitter, capped below `upper`.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub u64);

impl JitterSource for FixedJitter {
    fn jitter_ms(&self, upper: u64) -> u64 {
        self.0.min(upper.saturating_sub(1))
    }
}

// ═══════════════════════════════════════════
// Scheduler
// ═══════════════════════════════════════════

/// Computes reply delays and arms cancellable timers.
pub struct PacingScheduler {
    jitter: Box<dyn JitterSource>,
}

impl PacingScheduler {
    pub fn new(jitter: Box<dyn JitterSource>) -> Self {
        Self { jitter }
    }

    /// Total delay for a tier: base plus jitter.
    pub fn delay_for(&self, complexity: Complexity) -> Duration {
        let jitter = self.jitter.jitter_ms(JITTER_RANGE_MS);
        base_delay(complexity) + Duration::from_millis(jitter)
    }

    /// Arm a timer for `complexity`. Returns the cancel handle and the timer to await.
    pub fn schedule(&self, complexity: Complexity) -> (PacingHandle, PacingTimer) {
        let delay = self.delay_for(complexity);
        tracing::debug!(
            complexity = %complexity,
            delay_ms = delay.as_millis() as u64,
            "Pacing reply"
        );
        arm(delay)
    }
}

impl Default for PacingScheduler {
    fn default() -> Self {
        Self::new(Box::new(RandomJitter::new()))
    }
}

/// Create a cancellable timer for an explicit delay.
pub fn arm(delay: Duration) -> (PacingHandle, PacingTimer) {
    let (cancel_tx, cancel_rx) = oneshot::channel();
    (
        PacingHandle {
            cancel_tx: Some(cancel_tx),
        },
        PacingTimer { delay, cancel_rx },
    )
}

/// How a pacing timer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingOutcome {
    Elapsed,
    Cancelled,
}

/// Cancel side of a pacing timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct PacingHandle {
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl PacingHandle {
    pub fn cancel(mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Wait side of a pacing timer.
#[derive(Debug)]
pub struct PacingTimer {
    delay: Duration,
    cancel_rx: oneshot::Receiver<()>,
}

impl PacingTimer {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the delay unless cancelled first. Never blocks the thread.
    pub async fn wait(self) -> PacingOutcome {
        let sleep = tokio::time::sleep(self.delay);
        tokio::select! {
            () = sleep => PacingOutcome::Elapsed,
            // Explicit cancel or dropped handle
            _ = self.cancel_rx => PacingOutcome::Cancelled,
        }
    }
}
