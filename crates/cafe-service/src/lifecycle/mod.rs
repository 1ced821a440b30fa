//! # Service Lifecycle & Orchestration
//!
//! The workers are simple loops; starting them in the right order and
//! stopping them without losing an order is where the care goes. This module
//! is the conductor.
//!
//! ## Signals
//!
//! [`LifecycleSignals`] holds three one-way latches:
//!
//! | Latch | Set by | Observed by |
//! |-------|--------|-------------|
//! | `opened` | coordinator, after the setup delay | intake duties, before taking the first order |
//! | `closing` | countdown, or [`ServiceHandle::request_close`] | intake duties, between orders |
//! | `stopped` | the intake duty that sees the end of the feed, then the coordinator | preparer, which exits once it is set and the intake queue is empty |
//!
//! Delivery duties get a fourth latch the coordinator sets only after the
//! preparer has exited, so nothing can land on the delivery queue once every
//! waiter has stopped reading it.
//!
//! ## Phases
//!
//! [`ServicePhase`] moves strictly forward:
//! `Preparing -> Open -> Closing -> Stopped`. Observers can poll
//! [`ServiceHandle::phase`] or await [`ServiceHandle::wait_for_phase`].
//!
//! ## Cancellation
//!
//! [`ServiceHandle::cancel`] is honoured during the setup delay, while
//! waiting on workers, and during the closing countdown. The run still tears
//! down its tasks and flushes the journal, then returns
//! [`ServiceError::Cancelled`](crate::error::ServiceError::Cancelled).
//!
//! ```rust,no_run
//! use cafe_service::config::ServiceConfig;
//! use cafe_service::lifecycle::Coordinator;
//! use cafe_service::order_source::OrderSource;
//! use std::path::Path;
//!
//! # async fn demo() -> Result<(), cafe_service::error::ServiceError> {
//! let config = ServiceConfig::default();
//! let source = OrderSource::open(Path::new("orders.txt"), config.feed_poll())?;
//! let sink = cafe_service::lifecycle::create_log_file(&config.log_path)?;
//!
//! let coordinator = Coordinator::new(config);
//! let handle = coordinator.handle();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     handle.cancel();
//! });
//!
//! let report = coordinator.run(source, sink).await?;
//! assert!(report.is_conserved());
//! # Ok(())
//! # }
//! ```

mod announce;
pub mod coordinator;
pub mod countdown;
mod signals;
pub mod spinner;

pub use announce::{Announcer, SYSTEM};
pub use coordinator::{create_log_file, Coordinator, ServiceHandle};
pub use countdown::{countdown, CountdownSettings};
pub use signals::{LifecycleSignals, ServicePhase};
pub use spinner::Spinner;
