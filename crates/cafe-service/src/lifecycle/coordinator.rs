use super::countdown::{countdown, CountdownSettings};
use super::{Announcer, LifecycleSignals, ServicePhase, Spinner};
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::events::ServiceEvent;
use crate::model::{Order, ServiceReport};
use crate::staff::{delivery_lock, intake_lock, Preparer, Waiter, Workplace};
use pipeline_framework::{BusyBoard, Journal, Latch, Source};
use std::fs::File;
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Creates (or truncates) the journal file.
pub fn create_log_file(path: &Path) -> Result<BufWriter<File>, ServiceError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ServiceError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Runs one service from setup to teardown.
///
/// ```text
/// Preparing --setup delay--> Open --intake done--> Closing --countdown--> Stopped
/// ```
///
/// Workers are built while Preparing. Opening sets `opened` and spawns every
/// duty. Once every intake duty has returned, `stopped` is set and the
/// countdown runs. After it the coordinator waits for the preparer, then
/// releases the delivery duties, which drain the delivery queue and stop.
///
/// Teardown (spinner, journal writer, leftover tasks) happens whether the run
/// finished or was cancelled.
pub struct Coordinator {
    config: ServiceConfig,
    signals: LifecycleSignals,
    cancel: CancellationToken,
}

/// Remote control for a running [`Coordinator`].
#[derive(Clone, Debug)]
pub struct ServiceHandle {
    signals: LifecycleSignals,
    cancel: CancellationToken,
}

impl ServiceHandle {
    pub fn phase(&self) -> ServicePhase {
        self.signals.phase()
    }

    pub async fn wait_for_phase(&self, phase: ServicePhase) {
        self.signals.wait_for_phase(phase).await
    }

    /// Stops intake early. Waiters finish the order in hand, then the run
    /// goes through the usual closing countdown.
    ///
    /// Returns `false` if closing was already requested.
    pub fn request_close(&self) -> bool {
        let first = self.signals.closing.set();
        if first {
            info!("Close requested");
        }
        first
    }

    pub fn is_closing(&self) -> bool {
        self.signals.closing.is_set()
    }

    /// Aborts the run. [`Coordinator::run`] returns [`ServiceError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Coordinator {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            signals: LifecycleSignals::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn handle(&self) -> ServiceHandle {
        ServiceHandle {
            signals: self.signals.clone(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn signals(&self) -> &LifecycleSignals {
        &self.signals
    }

    /// Runs the service over `source`, journaling to `sink`.
    pub async fn run<S, W>(self, source: S, sink: W) -> Result<ServiceReport, ServiceError>
    where
        S: Source<Order>,
        W: Write + Send + 'static,
    {
        let (journal, writer) = Journal::new(sink);
        let aux = CancellationToken::new();
        let journal_task = tokio::spawn(writer.run(self.config.flush_interval(), aux.clone()));
        let announcer = Announcer::new(self.config.interactive, journal.clone());

        let outcome = self.serve(source, journal, &announcer, &aux).await;
        match &outcome {
            Ok(report) => {
                announcer.announce(ServiceEvent::Closed);
                info!(
                    taken = report.taken.len(),
                    delivered = report.delivered.len(),
                    direct = report.direct_deliveries(),
                    "Service finished"
                );
            }
            Err(e) => error!(error = %e, phase = ?self.signals.phase(), "Service ended early"),
        }

        aux.cancel();
        let written = journal_task.await?.map_err(ServiceError::Journal)?;
        info!(written, "Journal closed");
        outcome
    }

    async fn serve<S: Source<Order>>(
        &self,
        source: S,
        journal: Journal,
        announcer: &Announcer,
        aux: &CancellationToken,
    ) -> Result<ServiceReport, ServiceError> {
        let config = &self.config;
        let signals = &self.signals;
        let floor = config.productivity_floor;

        // Preparing
        let workplace = Workplace::new(config.queues_verbose, journal);
        let waiters: Vec<Arc<Waiter>> = config
            .waiters
            .iter()
            .zip(1u64..)
            .map(|(waiter, index)| {
                Arc::new(Waiter::new(
                    waiter.clone(),
                    floor,
                    config.worker_seed(index),
                    workplace.clone(),
                    signals.clone(),
                ))
            })
            .collect();
        let board = config
            .track_busy_waiters
            .then(|| waiters.iter().map(|w| w.busy_flag()).collect::<BusyBoard>());
        let preparer = Preparer::new(
            config.preparer.clone(),
            floor,
            config.worker_seed(0),
            board,
            workplace.clone(),
        );

        announcer.announce(ServiceEvent::StaffGettingReady);
        self.cancellable(ServicePhase::Preparing, tokio::time::sleep(config.setup_delay()))
            .await?;

        // Open
        signals.opened.set();
        signals.advance(ServicePhase::Open);
        announcer.announce(ServiceEvent::Opened);

        let spinner_stop = aux.child_token();
        if announcer.is_interactive() {
            tokio::spawn(Spinner::default().run(config.spinner_tick(), spinner_stop.clone()));
        }

        let intake_lock = intake_lock(source);
        let delivery_lock = delivery_lock();
        let prep_finished = Latch::new();

        let mut intake_duties = JoinSet::new();
        let mut delivery_duties = JoinSet::new();
        for waiter in &waiters {
            intake_duties.spawn(
                waiter
                    .clone()
                    .take_orders(signals.stopped.clone(), intake_lock.clone()),
            );
            delivery_duties.spawn(waiter.clone().deliver_orders(
                prep_finished.clone(),
                intake_lock.clone(),
                delivery_lock.clone(),
            ));
        }
        let mut kitchen = JoinSet::new();
        kitchen.spawn(preparer.run(signals.stopped.clone(), delivery_lock.clone()));
        info!(waiters = waiters.len(), "Service open");

        self.cancellable(ServicePhase::Open, join_all(&mut intake_duties))
            .await??;

        // Closing
        if signals.closing.is_set() {
            announcer.announce(ServiceEvent::CloseRequested);
        }
        signals.stopped.set();
        signals.advance(ServicePhase::Closing);
        spinner_stop.cancel();
        countdown(
            CountdownSettings {
                secs: config.closing_countdown_secs,
                tick: config.countdown_tick(),
                notice: config.closing_notice(),
            },
            &signals.closing,
            announcer,
            &self.cancel,
        )
        .await?;

        // Stopped
        signals.advance(ServicePhase::Stopped);
        for outcome in self.cancellable(ServicePhase::Stopped, join_all(&mut kitchen)).await?? {
            outcome?;
        }
        prep_finished.set();
        for outcome in self
            .cancellable(ServicePhase::Stopped, join_all(&mut delivery_duties))
            .await??
        {
            outcome?;
        }

        let report = workplace.tally.report();
        if !report.is_conserved() {
            warn!(?report, "Taken and delivered orders differ");
        }
        Ok(report)
    }

    async fn cancellable<F: Future>(
        &self,
        phase: ServicePhase,
        fut: F,
    ) -> Result<F::Output, ServiceError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(?phase, "Service cancelled");
                Err(ServiceError::Cancelled(phase))
            }
            output = fut => Ok(output),
        }
    }
}

/// Waits for every task in `set`, failing on the first one that panicked.
async fn join_all<T: 'static>(set: &mut JoinSet<T>) -> Result<Vec<T>, tokio::task::JoinError> {
    let mut outputs = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        outputs.push(joined?);
    }
    Ok(outputs)
}
