use pipeline_framework::Latch;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Where a run is in its lifecycle. Phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServicePhase {
    /// Workers constructed, doors not open yet.
    Preparing,
    /// Doors open, every duty running.
    Open,
    /// No more orders will arrive; the closing countdown is running.
    Closing,
    /// Countdown over; workers finishing up and tearing down.
    Stopped,
}

/// The three one-way lifecycle latches plus the observable phase.
///
/// - `opened` gates intake.
/// - `closing` is the close request: intake stops taking new orders.
/// - `stopped` means no further orders will ever arrive.
///
/// Clones share the same latches.
#[derive(Clone, Debug)]
pub struct LifecycleSignals {
    pub opened: Latch,
    pub closing: Latch,
    pub stopped: Latch,
    phase: Arc<watch::Sender<ServicePhase>>,
}

impl Default for LifecycleSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleSignals {
    pub fn new() -> Self {
        let (phase, _) = watch::channel(ServicePhase::Preparing);
        Self {
            opened: Latch::new(),
            closing: Latch::new(),
            stopped: Latch::new(),
            phase: Arc::new(phase),
        }
    }

    pub fn phase(&self) -> ServicePhase {
        *self.phase.borrow()
    }

    /// Moves to `next` if it is later than the current phase.
    ///
    /// Returns `true` if the phase changed.
    pub fn advance(&self, next: ServicePhase) -> bool {
        let changed = self.phase.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        });
        if changed {
            info!(phase = ?next, "Service phase changed");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<ServicePhase> {
        self.phase.subscribe()
    }

    /// Suspends until the run has reached `phase` (or gone past it).
    pub async fn wait_for_phase(&self, phase: ServicePhase) {
        let mut receiver = self.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = receiver.wait_for(|current| *current >= phase).await;
    }
}
