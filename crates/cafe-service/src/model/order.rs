//! A customer order: the items to prepare and deliver, handled as one unit.
//!
//! Orders are created by [`OrderSource`](crate::order_source::OrderSource)
//! from the feed and never change afterwards. Each one travels
//! source -> intake queue -> preparer -> delivery queue (or bypass) -> served,
//! and is served exactly once.

use std::fmt::Display;
use tokio::time::Instant;

/// Type-safe identifier for Orders, assigned in feed order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<String>,
}

impl Order {
    pub fn new<I, S>(id: impl Into<OrderId>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.id, self.items.join(", "))
    }
}

/// An order paired with the instant it may be handed out.
#[derive(Debug, Clone)]
pub struct ScheduledOrder {
    pub release_at: Instant,
    pub order: Order,
}

impl ScheduledOrder {
    pub fn new(release_at: Instant, order: Order) -> Self {
        Self { release_at, order }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.release_at
    }
}
