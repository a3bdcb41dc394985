//! Background task that periodically generates subscription orders.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use log::debug;
use log::error;
use log::info;

use crate::service::order_scheduler_service::OrderSchedulerService;

/// Task that periodically runs the order scheduling pass.
pub struct OrderSchedulerTask {
    service: Arc<OrderSchedulerService>,
    poll_interval: Duration,
    running: AtomicBool,
}

impl OrderSchedulerTask {
    /// Creates a new scheduler task with the given configuration.
    pub fn new(service: Arc<OrderSchedulerService>, poll_interval: Duration) -> Arc<Self> {
        info!(
            "Initializing OrderSchedulerTask with poll interval {:?}",
            poll_interval
        );
        Arc::new(Self {
            service,
            poll_interval,
            running: AtomicBool::new(false),
        })
    }

    /// Starts the scheduling loop.
    pub fn start(self: Arc<Self>) -> anyhow::Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            self.running.store(true, Ordering::SeqCst);
            info!("Starting OrderSchedulerTask loop.");
            self.spawn_check_loop();
        }
        Ok(())
    }

    /// Stops the scheduling loop.
    pub fn stop(self: Arc<Self>) -> anyhow::Result<()> {
        info!("Stopping OrderSchedulerTask loop.");
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn spawn_check_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        tokio::spawn(async move {
            loop {
                interval.tick().await;
                if !self.running.load(Ordering::SeqCst) {
                    info!("Stopping check loop.");
                    break;
                }
                if let Err(e) = self.run_pass().await {
                    error!("Order scheduling pass failed: {e}");
                }
            }
        });
    }

    /// Runs a single scheduling pass and logs its summary.
    ///
    /// A pass is awaited inline, so the loop never overlaps itself; overlap
    /// across processes is handled by the orders uniqueness constraint.
    pub async fn run_pass(&self) -> anyhow::Result<()> {
        debug!("Running order scheduling pass.");
        let summary = self.service.run_today().await?;
        info!(
            "Order scheduling summary: {}",
            serde_json::to_string(&summary)?
        );
        Ok(())
    }
}
