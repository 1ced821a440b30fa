//! Plain data: orders, the productivity walk, and the run tally.

pub mod order;
pub mod productivity;
pub mod tally;

pub use order::{Order, OrderId, ScheduledOrder};
pub use productivity::{Productivity, WalkRange};
pub use tally::{Delivery, Route, ServiceReport, Tally};
