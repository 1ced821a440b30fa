//! # Staff
//!
//! The workers of the pipeline:
//!
//! - [`Preparer`] drains the intake queue, prepares each order, and either
//!   puts it on the delivery queue or, when nobody is around to carry it,
//!   serves it directly.
//! - [`Waiter`] runs two duties side by side: taking orders from the
//!   [`Source`] onto the intake queue, and carrying orders from the delivery
//!   queue to the customer.
//!
//! ## Shared state
//!
//! Workers never own the queues. They get a [`Workplace`] (the two queues,
//! the run tally and the journal) plus the locks and latches for their duty,
//! handed in by the coordinator.
//!
//! | Lock | Guards | Held by |
//! |------|--------|---------|
//! | [`IntakeLock`] | the order source | intake duty while reading one order; delivery duty around each pop |
//! | [`DeliveryLock`] | the producer side of the delivery queue | preparer while pushing; delivery duty around each pop |
//!
//! Lock order is always intake before delivery.

pub mod preparer;
pub mod waiter;

pub use preparer::Preparer;
pub use waiter::Waiter;

use crate::model::{Order, Tally};
use crate::stations::{DeliveryQueue, IntakeQueue};
use pipeline_framework::{Journal, Source};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The shared order source, behind the lock that serializes access to it.
pub type IntakeLock = Arc<Mutex<Box<dyn Source<Order>>>>;

/// Serializes pushes onto, and pops from, the delivery queue.
pub type DeliveryLock = Arc<Mutex<()>>;

pub fn intake_lock(source: impl Source<Order>) -> IntakeLock {
    let source: Box<dyn Source<Order>> = Box::new(source);
    Arc::new(Mutex::new(source))
}

pub fn delivery_lock() -> DeliveryLock {
    Arc::new(Mutex::new(()))
}

/// Everything the staff share. Clones share the same queues and tally.
#[derive(Clone, Debug)]
pub struct Workplace {
    pub intake: IntakeQueue,
    pub delivery: DeliveryQueue,
    pub tally: Tally,
    pub journal: Journal,
}

impl Workplace {
    pub fn new(queues_verbose: bool, journal: Journal) -> Self {
        Self {
            intake: IntakeQueue::new(queues_verbose, journal.clone()),
            delivery: DeliveryQueue::new(queues_verbose, journal.clone()),
            tally: Tally::new(),
            journal,
        }
    }
}
