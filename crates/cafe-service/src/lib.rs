//! # Café Service Library
//!
//! A small café run as a pipeline of cooperating workers, built on
//! [`pipeline_framework`]:
//!
//! ```text
//! OrderSource -> (waiter intake) -> IntakeQueue -> (preparer) -> DeliveryQueue -> (waiter delivery)
//!                                                       \----- served directly -----/
//! ```
//!
//! - **[model]**: orders, the productivity walk, and the run tally.
//! - **[feed]** / **[order_source]**: the timed order feed.
//! - **[stations]**: the intake and delivery queues.
//! - **[staff]**: the preparer and the waiters.
//! - **[lifecycle]**: signals, phases, the closing countdown, and the
//!   [`Coordinator`](lifecycle::Coordinator) that runs it all.
//!
//! Every order taken is served exactly once, either from the delivery queue
//! or directly by the preparer; [`ServiceReport::is_conserved`](model::ServiceReport::is_conserved)
//! checks it after a run.

pub mod config;
pub mod error;
pub mod events;
pub mod feed;
pub mod lifecycle;
pub mod model;
pub mod order_source;
pub mod staff;
pub mod stations;
