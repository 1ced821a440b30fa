//! Everything a worker, queue or the coordinator can write to the journal.
//!
//! Events are typed so the call sites stay honest; the `Display` impl is the
//! wording that ends up in the log file.

use crate::model::Order;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    // --- workers ---
    Ready,
    ReadyForOrder,
    OrderTaken(Order),
    TicketWritten(Order),
    NoMoreOrders,
    PrepStarted(Order),
    ItemPrepared(String),
    OrderReady(Order),
    PlacedForDelivery(Order),
    HelpingOut(Order),
    ItemServedDirectly(String),
    Carrying(Order),
    ItemServed(String),
    NothingLeftToPrepare,
    ServiceEnded,

    // --- queues ---
    Added { order: Order, pending: usize },
    Removed { order: Order, remaining: usize },

    // --- coordinator ---
    StaffGettingReady,
    Opened,
    LastOrders,
    ClosingIn(u32),
    CloseRequested,
    Closed,
    ClosingCancelled,
}

impl fmt::Display for ServiceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ServiceEvent::*;
        match self {
            Ready => write!(f, "ready for service"),
            ReadyForOrder => write!(f, "ready to take a new order..."),
            OrderTaken(order) => write!(f, "got order {order}"),
            TicketWritten(order) => write!(f, "writing ticket for {order}"),
            NoMoreOrders => write!(f, "no more orders to take, taking a break"),
            PrepStarted(order) => write!(f, "starting on {order}"),
            ItemPrepared(item) => write!(f, "preparing '{item}'"),
            OrderReady(order) => write!(f, "{order} is ready"),
            PlacedForDelivery(order) => write!(f, "{order} placed on the counter"),
            HelpingOut(order) => write!(f, "helping out: serving {order} DIRECTLY"),
            ItemServedDirectly(item) => write!(f, "serving '{item}' DIRECTLY"),
            Carrying(order) => write!(f, "bringing {order}"),
            ItemServed(item) => write!(f, "serving '{item}'"),
            NothingLeftToPrepare => write!(f, "nothing left to prepare"),
            ServiceEnded => write!(f, "end of service"),
            Added { order, pending } => write!(f, "{order} added ({pending} waiting)"),
            Removed { order, remaining } => write!(f, "{order} removed ({remaining} left)"),
            StaffGettingReady => write!(f, "staff getting ready for service"),
            Opened => write!(f, "doors open, service begins"),
            LastOrders => write!(f, "end of service, closing soon"),
            ClosingIn(secs) => write!(f, "closing in {secs:02} seconds..."),
            CloseRequested => write!(f, "close requested, no new orders"),
            Closed => write!(f, "doors closed"),
            ClosingCancelled => write!(f, "closing cancelled"),
        }
    }
}
