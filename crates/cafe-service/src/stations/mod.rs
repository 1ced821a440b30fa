//! # Stations
//!
//! The two hand-off points of the pipeline:
//!
//! - [`IntakeQueue`], the ticket rail between the waiters taking orders and
//!   the preparer.
//! - [`DeliveryQueue`], the counter between the preparer and the waiters
//!   serving.
//!
//! Both are an [`OrderQueue`] over the same [`HandoffQueue`], told apart by a
//! zero-sized [`Station`] marker so one cannot be passed where the other is
//! expected. Every add and remove is logged with the number of orders left.
//!
//! Clones share the same queue.

use crate::events::ServiceEvent;
use crate::model::Order;
use pipeline_framework::{EventLog, FrameworkError, HandoffQueue, Journal};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::trace;

/// Marker for a queue's place in the pipeline.
pub trait Station: Send + Sync + 'static {
    /// Name used in journal lines.
    const NAME: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct Intake;

impl Station for Intake {
    const NAME: &'static str = "ticket_rail";
}

#[derive(Debug, Clone, Copy)]
pub struct Delivery;

impl Station for Delivery {
    const NAME: &'static str = "counter";
}

pub type IntakeQueue = OrderQueue<Intake>;
pub type DeliveryQueue = OrderQueue<Delivery>;

pub struct OrderQueue<K: Station> {
    inner: HandoffQueue<Order>,
    log: EventLog,
    _station: PhantomData<K>,
}

impl<K: Station> Clone for OrderQueue<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            log: self.log.clone(),
            _station: PhantomData,
        }
    }
}

impl<K: Station> std::fmt::Debug for OrderQueue<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderQueue")
            .field("station", &K::NAME)
            .field("len", &self.inner.len())
            .finish()
    }
}

impl<K: Station> OrderQueue<K> {
    pub fn new(verbose: bool, journal: Journal) -> Self {
        Self {
            inner: HandoffQueue::new(),
            log: EventLog::new(K::NAME, verbose, journal),
            _station: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        K::NAME
    }

    /// Appends `order`. Never blocks.
    pub fn push(&self, order: Order) {
        let pending = self.inner.push(order.clone());
        trace!(station = K::NAME, order = %order.id, pending, "Pushed");
        self.log.log(ServiceEvent::Added { order, pending });
    }

    /// Removes the oldest order, waiting at most `timeout` for one.
    ///
    /// [`FrameworkError::Timeout`] means "nothing yet", not a failure.
    pub async fn pop_timeout(&self, timeout: Duration) -> Result<Order, FrameworkError> {
        let order = self.inner.pop_timeout(timeout).await?;
        self.log_removed(&order);
        Ok(order)
    }

    /// Removes the oldest order, waiting as long as it takes.
    pub async fn pop(&self) -> Order {
        let order = self.inner.pop().await;
        self.log_removed(&order);
        order
    }

    /// Marks one previously popped order as fully handled.
    pub fn task_done(&self) -> Result<(), FrameworkError> {
        self.inner.task_done()
    }

    /// Orders pushed but not yet marked done.
    pub fn unfinished(&self) -> usize {
        self.inner.unfinished()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn log_removed(&self, order: &Order) {
        let remaining = self.inner.len();
        trace!(station = K::NAME, order = %order.id, remaining, "Popped");
        self.log.log(ServiceEvent::Removed {
            order: order.clone(),
            remaining,
        });
    }
}
