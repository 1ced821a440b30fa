use super::{DeliveryLock, Workplace};
use crate::config::PreparerConfig;
use crate::error::ServiceError;
use crate::events::ServiceEvent;
use crate::model::{Order, Productivity, Route, WalkRange};
use pipeline_framework::{BusyBoard, EventLog, Latch};
use std::time::Duration;
use tracing::{debug, info};

/// Turns intake tickets into finished orders.
///
/// After preparing an order the preparer decides how it leaves the kitchen.
/// If a [`BusyBoard`] is attached, the delivery queue is empty and no waiter
/// is busy, it serves the order itself at a slower pace. Otherwise the order
/// goes on the delivery queue. Without a board it never serves directly.
///
/// The busy check is a snapshot: a waiter may raise its flag right after it.
/// That can only make a waiter find the delivery queue empty, never serve
/// the same order twice.
pub struct Preparer {
    config: PreparerConfig,
    productivity: Productivity,
    busy: Option<BusyBoard>,
    log: EventLog,
    workplace: Workplace,
}

impl std::fmt::Debug for Preparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preparer")
            .field("name", &self.config.name)
            .field("productivity", &self.productivity.value())
            .finish_non_exhaustive()
    }
}

impl Preparer {
    pub fn new(
        config: PreparerConfig,
        floor: f64,
        seed: Option<u64>,
        busy: Option<BusyBoard>,
        workplace: Workplace,
    ) -> Self {
        let log = EventLog::new(&config.name, config.verbose, workplace.journal.clone());
        let productivity = Productivity::new(config.productivity, floor, seed);
        log.log(ServiceEvent::Ready);
        Self {
            config,
            productivity,
            busy,
            log,
            workplace,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn productivity(&self) -> f64 {
        self.productivity.value()
    }

    /// Prepares orders until `stopped` is set and the intake queue is empty.
    pub async fn run(
        mut self,
        stopped: Latch,
        delivery_lock: DeliveryLock,
    ) -> Result<(), ServiceError> {
        info!(preparer = %self.config.name, "Preparer started");
        let mut prepared = 0usize;

        while !(stopped.is_set() && self.workplace.intake.is_empty()) {
            if self.workplace.intake.is_empty() {
                tokio::time::sleep(self.config.idle_poll()).await;
                continue;
            }

            // A timeout only means another look at the stop condition.
            let Ok(order) = self
                .workplace
                .intake
                .pop_timeout(self.config.pop_timeout())
                .await
            else {
                continue;
            };

            self.prepare(order, &delivery_lock).await?;
            prepared += 1;
            tokio::time::sleep(self.config.yield_for()).await;
        }

        self.log.log(ServiceEvent::NothingLeftToPrepare);
        info!(preparer = %self.config.name, prepared, "Preparer finished");
        Ok(())
    }

    async fn prepare(&mut self, order: Order, delivery_lock: &DeliveryLock) -> Result<(), ServiceError> {
        self.log.log(ServiceEvent::PrepStarted(order.clone()));
        for item in &order.items {
            self.log.log(ServiceEvent::ItemPrepared(item.clone()));
            let walk = self.config.prepare_walk;
            self.work(self.config.item_delay(), walk).await;
        }
        self.log.log(ServiceEvent::OrderReady(order.clone()));
        self.workplace.tally.prepared(order.id);

        if self.should_serve_directly() {
            self.serve_directly(order).await
        } else {
            let _guard = delivery_lock.lock().await;
            self.workplace.delivery.push(order.clone());
            self.workplace.intake.task_done()?;
            self.log.log(ServiceEvent::PlacedForDelivery(order));
            Ok(())
        }
    }

    fn should_serve_directly(&self) -> bool {
        self.busy
            .as_ref()
            .is_some_and(|board| self.workplace.delivery.is_empty() && board.all_idle())
    }

    async fn serve_directly(&mut self, order: Order) -> Result<(), ServiceError> {
        self.log.log(ServiceEvent::HelpingOut(order.clone()));
        for item in &order.items {
            self.log.log(ServiceEvent::ItemServedDirectly(item.clone()));
            let walk = self.config.direct_walk;
            self.work(self.config.direct_item_delay(), walk).await;
        }
        self.workplace.intake.task_done()?;
        self.workplace
            .tally
            .delivered(order.id, &self.config.name, Route::Direct);
        Ok(())
    }

    async fn work(&mut self, base: Duration, walk: WalkRange) {
        tokio::time::sleep(self.productivity.pace(base)).await;
        let value = self.productivity.perturb(walk);
        debug!(preparer = %self.config.name, productivity = value, "Pace updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderId;
    use crate::staff::delivery_lock;
    use pipeline_framework::{BusyFlag, Journal};
    use tokio::time::Instant;

    fn preparer(busy: Option<BusyBoard>) -> (Preparer, Workplace) {
        let workplace = Workplace::new(false, Journal::disabled());
        let preparer = Preparer::new(
            PreparerConfig::default(),
            0.1,
            Some(3),
            busy,
            workplace.clone(),
        );
        (preparer, workplace)
    }

    #[tokio::test(start_paused = true)]
    async fn test_exits_at_once_when_stopped_and_empty() {
        let (preparer, workplace) = preparer(None);
        let stopped = Latch::new();
        stopped.set();

        let start = Instant::now();
        preparer.run(stopped, delivery_lock()).await.unwrap();

        assert_eq!(Instant::now(), start);
        assert!(workplace.tally.report().prepared.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drains_intake_after_stop() {
        let (preparer, workplace) = preparer(None);
        workplace.intake.push(Order::new(1, ["espresso"]));
        workplace.intake.push(Order::new(2, ["latte", "tea"]));
        let stopped = Latch::new();
        stopped.set();

        preparer.run(stopped, delivery_lock()).await.unwrap();

        assert!(workplace.intake.is_empty());
        assert_eq!(workplace.intake.unfinished(), 0);
        assert_eq!(workplace.delivery.len(), 2);
        assert_eq!(workplace.tally.report().prepared, vec![OrderId(1), OrderId(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_serves_directly_when_everyone_idle() {
        let board = BusyBoard::new(vec![BusyFlag::new(), BusyFlag::new()]);
        let (preparer, workplace) = preparer(Some(board));
        workplace.intake.push(Order::new(1, ["espresso", "latte"]));
        let stopped = Latch::new();
        stopped.set();

        preparer.run(stopped, delivery_lock()).await.unwrap();

        let report = workplace.tally.report();
        assert!(workplace.delivery.is_empty());
        assert_eq!(workplace.delivery.unfinished(), 0);
        assert_eq!(workplace.intake.unfinished(), 0);
        assert_eq!(report.direct_deliveries(), 1);
        assert_eq!(report.delivered[0].by, "Bob");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_order_served_directly_with_idle_waiters() {
        let board = BusyBoard::new(vec![BusyFlag::new(), BusyFlag::new()]);
        let (preparer, workplace) = preparer(Some(board.clone()));
        workplace.intake.push(Order::new(1, ["espresso", "latte"]));
        workplace.intake.push(Order::new(2, ["tea"]));
        let stopped = Latch::new();
        stopped.set();

        preparer.run(stopped, delivery_lock()).await.unwrap();

        let report = workplace.tally.report();
        assert!(board.all_idle());
        assert!(workplace.delivery.is_empty());
        assert_eq!(workplace.intake.unfinished(), 0);
        assert_eq!(report.prepared, vec![OrderId(1), OrderId(2)]);
        let second = report
            .delivered
            .iter()
            .find(|d| d.order == OrderId(2))
            .expect("second order delivered");
        assert_eq!(second.route, Route::Direct);
        assert_eq!(second.by, "Bob");
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_waiter_means_counter() {
        let busy = BusyFlag::new();
        busy.set();
        let (preparer, workplace) = preparer(Some(BusyBoard::new(vec![BusyFlag::new(), busy])));
        workplace.intake.push(Order::new(1, ["espresso"]));
        let stopped = Latch::new();
        stopped.set();

        preparer.run(stopped, delivery_lock()).await.unwrap();

        assert_eq!(workplace.delivery.len(), 1);
        assert_eq!(workplace.tally.report().direct_deliveries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_order_on_counter_means_counter() {
        let (preparer, workplace) = preparer(Some(BusyBoard::new(vec![BusyFlag::new()])));
        workplace.delivery.push(Order::new(9, ["scone"]));
        workplace.intake.push(Order::new(1, ["espresso"]));
        let stopped = Latch::new();
        stopped.set();

        preparer.run(stopped, delivery_lock()).await.unwrap();

        assert_eq!(workplace.delivery.len(), 2);
        assert_eq!(workplace.tally.report().direct_deliveries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_orders_until_stopped() {
        let (preparer, workplace) = preparer(None);
        let stopped = Latch::new();
        let task = tokio::spawn(preparer.run(stopped.clone(), delivery_lock()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        workplace.intake.push(Order::new(1, ["tea"]));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!task.is_finished());
        assert_eq!(workplace.delivery.len(), 1);

        stopped.set();
        task.await.unwrap().unwrap();
    }
}
