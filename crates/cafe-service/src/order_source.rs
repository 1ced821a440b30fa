//! # Order Source
//!
//! [`OrderSource`] hands out the orders of a feed one at a time, each no
//! earlier than its release instant.
//!
//! The anchored orders are kept as a stack (last order at the bottom), so the
//! next one to release is always at the top. `next()` polls the clock against
//! that order's release instant, sleeping `min(poll, time left)` between
//! checks, and pops it once due. When the stack is empty it returns `None`,
//! the end-marker, and keeps returning it.
//!
//! Orders come out in feed order. An order whose release instant is earlier
//! than its predecessor's is due by the time its predecessor is released, so
//! it follows immediately.

use crate::error::ServiceError;
use crate::feed::{anchor, read_feed};
use crate::model::{Order, ScheduledOrder};
use async_trait::async_trait;
use pipeline_framework::Source;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

#[derive(Debug)]
pub struct OrderSource {
    /// Reversed: the next order to release is at the end.
    pending: Vec<ScheduledOrder>,
    poll: Duration,
}

impl OrderSource {
    pub fn new(orders: Vec<ScheduledOrder>, poll: Duration) -> Self {
        let mut pending = orders;
        pending.reverse();
        Self { pending, poll }
    }

    /// Reads the feed at `path` and anchors its offsets to now.
    pub fn open(path: &Path, poll: Duration) -> Result<Self, ServiceError> {
        let orders = anchor(read_feed(path)?, Instant::now());
        Ok(Self::new(orders, poll))
    }

    /// Release instant of the next order, if any remain.
    pub fn next_release(&self) -> Option<Instant> {
        self.pending.last().map(|scheduled| scheduled.release_at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}

#[async_trait]
impl Source<Order> for OrderSource {
    async fn next(&mut self) -> Option<Order> {
        loop {
            let release_at = self.next_release()?;
            let now = Instant::now();
            if self.pending.last().is_some_and(|next| next.is_due(now)) {
                let scheduled = self.pending.pop()?;
                debug!(order = %scheduled.order.id, remaining = self.pending.len(), "Order released");
                return Some(scheduled.order);
            }
            let wait = self.poll.min(release_at - now);
            trace!(?wait, "Next order not due yet");
            tokio::time::sleep(wait).await;
        }
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.pending.len())
    }
}
