use super::{Announcer, ServicePhase};
use crate::error::ServiceError;
use crate::events::ServiceEvent;
use pipeline_framework::Latch;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Shape of the closing countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownSettings {
    pub secs: u32,
    pub tick: Duration,
    /// Pause between the announcement and the first tick.
    pub notice: Duration,
}

impl CountdownSettings {
    /// Wall time of an uncancelled countdown.
    pub fn total(&self) -> Duration {
        self.notice + self.tick * self.secs
    }
}

/// Announces closing, counts down, then sets `closing`.
///
/// If `cancel` fires first, a cancellation notice is journaled, `closing` is
/// left unset and [`ServiceError::Cancelled`] is returned.
pub async fn countdown(
    settings: CountdownSettings,
    closing: &Latch,
    announcer: &Announcer,
    cancel: &CancellationToken,
) -> Result<(), ServiceError> {
    let ticking = async {
        announcer.announce(ServiceEvent::LastOrders);
        tokio::time::sleep(settings.notice).await;
        for remaining in (1..=settings.secs).rev() {
            announcer.announce(ServiceEvent::ClosingIn(remaining));
            tokio::time::sleep(settings.tick).await;
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            announcer.announce(ServiceEvent::ClosingCancelled);
            warn!("Closing countdown cancelled");
            Err(ServiceError::Cancelled(ServicePhase::Closing))
        }
        _ = ticking => {
            closing.set();
            info!(secs = settings.secs, "Closing countdown finished");
            Ok(())
        }
    }
}
