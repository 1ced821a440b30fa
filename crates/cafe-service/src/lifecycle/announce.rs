use crate::events::ServiceEvent;
use pipeline_framework::{EventLog, Journal};

/// Journal name for coordinator announcements.
pub const SYSTEM: &str = "SYSTEM";

/// Coordinator announcements: always journaled, also printed to the console
/// in interactive mode.
#[derive(Clone, Debug)]
pub struct Announcer {
    log: EventLog,
    interactive: bool,
}

impl Announcer {
    pub fn new(interactive: bool, journal: Journal) -> Self {
        Self {
            log: EventLog::new(SYSTEM, true, journal),
            interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn announce(&self, event: ServiceEvent) {
        if self.interactive {
            println!("\n[{SYSTEM}] {event}");
        }
        self.log.log(event);
    }
}
