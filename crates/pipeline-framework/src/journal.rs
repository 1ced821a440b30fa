//! # Journal
//!
//! The journal is the log side-channel of a running pipeline. It is split
//! the same way a client and its actor are split:
//!
//! - [`Journal`] is the cheap-to-clone handle every component holds. Recording
//!   a line pushes it onto an unbounded channel, so it never suspends and a
//!   closed writer is silently ignored. Workers never depend on logging
//!   succeeding.
//! - [`JournalWriter`] owns the sink (a file in production, a
//!   [`SharedBuffer`](crate::mock::SharedBuffer) in tests). It runs in its own
//!   task, writes lines in arrival order, flushes on a fixed interval, and on
//!   shutdown drains whatever is still queued and flushes one last time.
//! - [`EventLog`] is a named, verbosity-gated scope over a `Journal`. Each
//!   worker gets one.
//!
//! ```rust
//! use pipeline_framework::journal::{EventLog, Journal};
//! use pipeline_framework::mock::SharedBuffer;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let buffer = SharedBuffer::new();
//!     let (journal, writer) = Journal::new(buffer.clone());
//!     let shutdown = CancellationToken::new();
//!     let task = tokio::spawn(writer.run(Duration::from_millis(200), shutdown.clone()));
//!
//!     EventLog::new("Bob", true, journal).log("ready for service");
//!
//!     shutdown.cancel();
//!     task.await.unwrap().unwrap();
//!     assert!(buffer.lines().contains(&"[Bob] ready for service".to_string()));
//! }
//! ```

use std::fmt::Display;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Banner written once at the top of every journal.
pub const BANNER: &str = "---";

/// Lines written between forced flushes when the channel never goes quiet.
pub const FLUSH_BATCH: usize = 64;

/// Handle for recording journal lines.
#[derive(Clone, Debug)]
pub struct Journal {
    sender: mpsc::UnboundedSender<String>,
}

impl Journal {
    /// Creates a journal handle and the writer that owns `sink`.
    ///
    /// The writer does nothing until [`JournalWriter::run`] is spawned; lines
    /// recorded before that are buffered in the channel.
    pub fn new<W: Write + Send + 'static>(sink: W) -> (Self, JournalWriter<W>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, JournalWriter { receiver, sink })
    }

    /// A journal whose lines go nowhere.
    pub fn disabled() -> Self {
        let (sender, _) = mpsc::unbounded_channel();
        Self { sender }
    }

    /// Queues one line. Never blocks and never fails.
    pub fn record(&self, line: impl Into<String>) {
        let _ = self.sender.send(line.into());
    }
}

/// The task that owns the journal sink.
pub struct JournalWriter<W: Write> {
    receiver: mpsc::UnboundedReceiver<String>,
    sink: W,
}

impl<W: Write> std::fmt::Debug for JournalWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalWriter").finish_non_exhaustive()
    }
}

impl<W: Write + Send + 'static> JournalWriter<W> {
    /// Writes lines until `shutdown` fires or every [`Journal`] handle is
    /// dropped, flushing every `flush_interval`.
    ///
    /// Returns the number of lines written. Any line already queued when
    /// shutdown fires is still written.
    pub async fn run(
        mut self,
        flush_interval: Duration,
        shutdown: CancellationToken,
    ) -> std::io::Result<usize> {
        writeln!(self.sink, "\n{BANNER}\n")?;
        self.sink.flush()?;
        info!(?flush_interval, "Journal writer started");

        let mut written = 0usize;
        let mut ticker = tokio::time::interval(flush_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = ticker.tick() => self.sink.flush()?,
                line = self.receiver.recv() => match line {
                    Some(line) => {
                        self.write_line(&line)?;
                        written += 1;
                        if written % FLUSH_BATCH == 0 {
                            self.sink.flush()?;
                        }
                    }
                    None => break,
                },
                _ = shutdown.cancelled() => break,
            }
        }

        // Drain whatever was recorded before shutdown.
        self.receiver.close();
        while let Some(line) = self.receiver.recv().await {
            self.write_line(&line)?;
            written += 1;
        }
        self.sink.flush()?;

        info!(written, "Journal writer shutdown");
        Ok(written)
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.sink, "{line}").map_err(|e| {
            warn!(error = %e, "Journal write failed");
            e
        })
    }
}

/// A named, verbosity-gated scope over a [`Journal`].
#[derive(Clone, Debug)]
pub struct EventLog {
    name: String,
    verbose: bool,
    journal: Journal,
}

impl EventLog {
    pub fn new(name: impl Into<String>, verbose: bool, journal: Journal) -> Self {
        Self {
            name: name.into(),
            verbose,
            journal,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Records `event` as `"[<name>] <event>"` when verbose.
    pub fn log(&self, event: impl Display) {
        if !self.verbose {
            return;
        }
        let line = format!("[{}] {}", self.name, event);
        debug!(actor = %self.name, "{event}");
        self.journal.record(line);
    }
}
