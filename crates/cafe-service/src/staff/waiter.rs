use super::{DeliveryLock, IntakeLock, Workplace};
use crate::config::WaiterConfig;
use crate::error::ServiceError;
use crate::events::ServiceEvent;
use crate::lifecycle::LifecycleSignals;
use crate::model::{Productivity, Route, WalkRange};
use parking_lot::Mutex;
use pipeline_framework::{BusyFlag, EventLog, Latch};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Takes orders and serves them.
///
/// A waiter is shared between its two duties through an `Arc`, so both run
/// as separate tasks. They share one productivity value, locked only for the
/// instant of a read or a step of the walk.
pub struct Waiter {
    config: WaiterConfig,
    productivity: Mutex<Productivity>,
    busy: BusyFlag,
    log: EventLog,
    workplace: Workplace,
    signals: LifecycleSignals,
}

impl std::fmt::Debug for Waiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waiter")
            .field("name", &self.config.name)
            .field("productivity", &self.productivity())
            .field("busy", &self.busy.is_set())
            .finish_non_exhaustive()
    }
}

impl Waiter {
    pub fn new(
        config: WaiterConfig,
        floor: f64,
        seed: Option<u64>,
        workplace: Workplace,
        signals: LifecycleSignals,
    ) -> Self {
        let log = EventLog::new(&config.name, config.verbose, workplace.journal.clone());
        let productivity = Mutex::new(Productivity::new(config.productivity, floor, seed));
        log.log(ServiceEvent::Ready);
        Self {
            config,
            productivity,
            busy: BusyFlag::new(),
            log,
            workplace,
            signals,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn productivity(&self) -> f64 {
        self.productivity.lock().value()
    }

    /// The flag this waiter raises while trying to pick up an order.
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Intake duty: moves orders from the source onto the intake queue.
    ///
    /// Waits for the doors to open, then reads one order at a time under
    /// `intake_lock`. On the end-marker it sets `stop` and returns. It also
    /// returns once `closing` is set, after finishing the order in hand.
    pub async fn take_orders(self: Arc<Self>, stop: Latch, intake_lock: IntakeLock) {
        self.signals.opened.wait().await;
        info!(waiter = %self.config.name, "Taking orders");
        let mut taken = 0usize;

        loop {
            {
                let mut source = intake_lock.lock().await;
                self.log.log(ServiceEvent::ReadyForOrder);

                let next = tokio::select! {
                    biased;
                    _ = self.signals.closing.wait() => break,
                    next = source.next() => next,
                };

                let Some(order) = next else {
                    self.log.log(ServiceEvent::NoMoreOrders);
                    stop.set();
                    break;
                };

                self.log.log(ServiceEvent::OrderTaken(order.clone()));
                self.log.log(ServiceEvent::TicketWritten(order.clone()));
                self.workplace.tally.taken(order.id);
                self.workplace.intake.push(order);
                taken += 1;
            }

            self.work(self.config.intake_delay(), self.config.intake_walk)
                .await;

            if self.signals.closing.is_set() {
                break;
            }
        }

        info!(waiter = %self.config.name, taken, "Stopped taking orders");
    }

    /// Delivery duty: carries orders from the delivery queue to the customer.
    ///
    /// Each pop happens under both locks with a bounded timeout, with this
    /// waiter's busy flag raised for the duration of the attempt. Returns
    /// once `stop` is set and a pop times out on an empty delivery queue.
    pub async fn deliver_orders(
        self: Arc<Self>,
        stop: Latch,
        intake_lock: IntakeLock,
        delivery_lock: DeliveryLock,
    ) -> Result<(), ServiceError> {
        let delivery = &self.workplace.delivery;
        let mut served = 0usize;

        loop {
            self.busy.set();
            let popped = {
                let _intake = intake_lock.lock().await;
                let _delivery = delivery_lock.lock().await;
                delivery.pop_timeout(self.config.pop_timeout()).await
            };
            self.busy.clear();

            match popped {
                Ok(order) => {
                    self.log.log(ServiceEvent::Carrying(order.clone()));
                    for item in &order.items {
                        self.log.log(ServiceEvent::ItemServed(item.clone()));
                        self.work(self.config.item_delay(), self.config.deliver_walk)
                            .await;
                    }
                    delivery.task_done()?;
                    self.workplace
                        .tally
                        .delivered(order.id, &self.config.name, Route::Counter);
                    served += 1;
                }
                Err(e) if e.is_timeout() => {
                    if stop.is_set() && delivery.is_empty() {
                        break;
                    }
                }
                Err(e) => return Err(e.into()),
            }

            tokio::time::sleep(self.config.yield_for()).await;
        }

        self.log.log(ServiceEvent::ServiceEnded);
        info!(waiter = %self.config.name, served, "Delivery finished");
        Ok(())
    }

    async fn work(&self, base: Duration, walk: WalkRange) {
        let delay = self.productivity.lock().pace(base);
        tokio::time::sleep(delay).await;
        let value = self.productivity.lock().perturb(walk);
        debug!(waiter = %self.config.name, productivity = value, "Pace updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderId};
    use crate::staff::{delivery_lock, intake_lock};
    use pipeline_framework::mock::{MockSource, SharedBuffer};
    use pipeline_framework::Journal;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn waiter(workplace: &Workplace, signals: &LifecycleSignals) -> Arc<Waiter> {
        Arc::new(Waiter::new(
            WaiterConfig::named("Alice", 1.9),
            0.1,
            Some(5),
            workplace.clone(),
            signals.clone(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_intake_waits_for_doors_to_open() {
        let workplace = Workplace::new(false, Journal::disabled());
        let signals = LifecycleSignals::new();
        let alice = waiter(&workplace, &signals);
        let source = MockSource::from_items([Order::new(1, ["tea"])]);
        let stop = Latch::new();

        let task = tokio::spawn(alice.take_orders(stop.clone(), intake_lock(source)));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(workplace.intake.is_empty());
        assert!(!task.is_finished());

        signals.opened.set();
        task.await.unwrap();
        assert_eq!(workplace.intake.len(), 1);
        assert!(stop.is_set());
        assert_eq!(workplace.tally.report().taken, vec![OrderId(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intake_stops_after_close_request() {
        let workplace = Workplace::new(false, Journal::disabled());
        let signals = LifecycleSignals::new();
        signals.opened.set();
        let alice = waiter(&workplace, &signals);

        let mut source = MockSource::new();
        source.expect_next().return_item(Order::new(1, ["tea"]));
        source
            .expect_next()
            .after(Duration::from_secs(60))
            .return_item(Order::new(2, ["scone"]));
        let stop = Latch::new();

        let task = tokio::spawn(alice.take_orders(stop.clone(), intake_lock(source)));
        tokio::time::sleep(Duration::from_secs(1)).await;
        signals.closing.set();
        task.await.unwrap();

        assert_eq!(workplace.tally.report().taken, vec![OrderId(1)]);
        assert!(!stop.is_set(), "no end-marker was seen");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_serves_then_ends() {
        let buffer = SharedBuffer::new();
        let (journal, writer) = Journal::new(buffer.clone());
        let shutdown = CancellationToken::new();
        let journal_task = tokio::spawn(writer.run(Duration::from_millis(200), shutdown.clone()));

        let workplace = Workplace::new(false, journal);
        let signals = LifecycleSignals::new();
        let alice = waiter(&workplace, &signals);
        let flag = alice.busy_flag();
        workplace.delivery.push(Order::new(1, ["espresso", "latte"]));
        let stop = Latch::new();
        stop.set();

        alice
            .deliver_orders(stop, intake_lock(MockSource::<Order>::new()), delivery_lock())
            .await
            .unwrap();

        assert!(!flag.is_set());
        assert_eq!(workplace.delivery.unfinished(), 0);
        let report = workplace.tally.report();
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(report.delivered[0].route, Route::Counter);

        shutdown.cancel();
        journal_task.await.unwrap().unwrap();
        let lines = buffer.lines();
        let carrying = lines
            .iter()
            .position(|l| l == "[Alice] bringing order_1 [espresso, latte]")
            .unwrap();
        let espresso = lines.iter().position(|l| l == "[Alice] serving 'espresso'").unwrap();
        let latte = lines.iter().position(|l| l == "[Alice] serving 'latte'").unwrap();
        let end = lines.iter().position(|l| l == "[Alice] end of service").unwrap();
        assert!(carrying < espresso && espresso < latte && latte < end);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_keeps_polling_until_stop() {
        let workplace = Workplace::new(false, Journal::disabled());
        let signals = LifecycleSignals::new();
        let alice = waiter(&workplace, &signals);
        let stop = Latch::new();

        let start = Instant::now();
        let task = tokio::spawn(alice.deliver_orders(
            stop.clone(),
            intake_lock(MockSource::<Order>::new()),
            delivery_lock(),
        ));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!task.is_finished());

        stop.set();
        task.await.unwrap().unwrap();
        assert!(Instant::now() - start < Duration::from_secs(3));
    }
}
