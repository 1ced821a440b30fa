//! Run bookkeeping: which orders were taken, prepared and served, by whom,
//! and by which route.
//!
//! Workers record into a shared [`Tally`]; the coordinator turns it into a
//! [`ServiceReport`] at the end of the run.

use crate::model::OrderId;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// How an order reached the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Placed on the delivery queue and carried out by a waiter.
    Counter,
    /// Served straight from the preparer, skipping the delivery queue.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub order: OrderId,
    pub by: String,
    pub route: Route,
}

#[derive(Debug, Default)]
struct Ledger {
    taken: Vec<OrderId>,
    prepared: Vec<OrderId>,
    delivered: Vec<Delivery>,
}

#[derive(Clone, Debug, Default)]
pub struct Tally {
    ledger: Arc<Mutex<Ledger>>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn taken(&self, order: OrderId) {
        self.ledger.lock().taken.push(order);
    }

    pub fn prepared(&self, order: OrderId) {
        self.ledger.lock().prepared.push(order);
    }

    pub fn delivered(&self, order: OrderId, by: &str, route: Route) {
        self.ledger.lock().delivered.push(Delivery {
            order,
            by: by.to_string(),
            route,
        });
    }

    pub fn report(&self) -> ServiceReport {
        let ledger = self.ledger.lock();
        ServiceReport {
            taken: ledger.taken.clone(),
            prepared: ledger.prepared.clone(),
            delivered: ledger.delivered.clone(),
        }
    }
}

/// Summary returned by a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceReport {
    /// Orders taken from the feed, in the order they were taken.
    pub taken: Vec<OrderId>,
    /// Orders the preparer finished, in completion order.
    pub prepared: Vec<OrderId>,
    /// Every delivery, in completion order.
    pub delivered: Vec<Delivery>,
}

impl ServiceReport {
    pub fn delivered_ids(&self) -> Vec<OrderId> {
        self.delivered.iter().map(|d| d.order).collect()
    }

    pub fn direct_deliveries(&self) -> usize {
        self.delivered
            .iter()
            .filter(|d| d.route == Route::Direct)
            .count()
    }

    /// True when every taken order was served exactly once and nothing else
    /// was served.
    pub fn is_conserved(&self) -> bool {
        let mut seen = HashSet::new();
        let no_duplicates = self.delivered.iter().all(|d| seen.insert(d.order));
        let taken: HashSet<_> = self.taken.iter().copied().collect();
        no_duplicates && taken.len() == self.taken.len() && seen == taken
    }
}
