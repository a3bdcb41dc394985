//! Daily subscription-to-order generation.

use std::sync::Arc;

use chrono::NaiveDate;
use chrono::Utc;
use log::error;
use log::info;
use serde::Serialize;

use crate::repository::OrderStore;
use crate::repository::error::DatabaseError;
use crate::repository::model::OrderModel;
use crate::repository::model::OrderStatus;
use crate::repository::model::SubscriptionModel;
use crate::service::error::ServiceError;

/// Service that converts active subscriptions into daily orders.
pub struct OrderSchedulerService {
    pub store: Arc<dyn OrderStore>,
}

impl OrderSchedulerService {
    /// Creates a new order scheduler service.
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Runs one scheduling pass for the current UTC day.
    ///
    /// "Today" is date-only and always UTC, so a pass produces the same
    /// result no matter where the process happens to run.
    pub async fn run_today(&self) -> Result<RunSummary, ServiceError> {
        self.run_for_date(Utc::now().date_naive()).await
    }

    /// Runs one scheduling pass for `today`.
    ///
    /// Fails only when the initial subscription listing fails; there is
    /// nothing to process in that case. Every per-subscription error is
    /// caught, logged with the subscription id, and recorded in the
    /// returned summary instead of aborting the batch.
    ///
    /// # Performance
    /// * DB calls: 1 + up to 3 per subscription
    pub async fn run_for_date(&self, today: NaiveDate) -> Result<RunSummary, ServiceError> {
        // DB 1
        let subscriptions = self.store.list_active_subscriptions(today).await?;
        info!(
            "Found {} active subscriptions for {}.",
            subscriptions.len(),
            today
        );

        let mut summary = RunSummary::new(subscriptions.len());
        for subscription in subscriptions {
            let id = subscription.id;
            match self.place_daily_order(&subscription, today).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    error!("Failed to process subscription `{id}`: {e}");
                    summary.record_failure(id, e.to_string());
                }
            }
        }

        info!(
            "Scheduling pass for {} complete: {} created, {} without menu, {} duplicate, {} failed.",
            today,
            summary.created,
            summary.skipped.no_menu,
            summary.skipped.duplicate,
            summary.errors.len()
        );
        Ok(summary)
    }

    /// Resolves the day's menu for one subscription and places its order.
    ///
    /// # Performance
    /// * DB calls: 1 + 1? + 1?
    async fn place_daily_order(
        &self,
        subscription: &SubscriptionModel,
        today: NaiveDate,
    ) -> Result<SubscriptionOutcome, ServiceError> {
        // DB 1
        let menu = match self
            .store
            .find_available_menu_item(subscription.mess_id, today)
            .await?
        {
            Some(menu) => menu,
            None => {
                info!(
                    "No available menu for mess {} on {}.",
                    subscription.mess_id, today
                );
                return Ok(SubscriptionOutcome::SkippedNoMenu);
            }
        };

        // DB 1? -- idempotency pre-check for reruns.
        if self.store.order_exists(subscription.id, today).await? {
            return Ok(SubscriptionOutcome::SkippedDuplicate);
        }

        let order = OrderModel {
            id: 0,
            user_id: subscription.user_id.clone(),
            mess_id: subscription.mess_id,
            menu_id: menu.id,
            subscription_id: subscription.id,
            order_date: today,
            status: OrderStatus::Placed,
            total_amount: menu.price,
            created_at: Utc::now(),
        };

        // DB 1? -- orders is UNIQUE on (subscription_id, order_date); a lost
        // race against an overlapping run surfaces here as a violation.
        match self.store.create_order(&order).await {
            Ok(order) => Ok(SubscriptionOutcome::Created { order }),
            Err(DatabaseError::UniqueViolation { .. }) => Ok(SubscriptionOutcome::SkippedDuplicate),
            Err(err) => Err(err.into()),
        }
    }
}

/// Terminal outcome for one subscription within a single day's pass.
pub enum SubscriptionOutcome {
    /// A new order was placed.
    Created { order: OrderModel },
    /// The mess published no available menu item for the day.
    SkippedNoMenu,
    /// An order for this subscription and day already exists.
    SkippedDuplicate,
}

/// What one scheduling pass did, in the shape the job trigger reports.
#[derive(Serialize, Default, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub ok: bool,
    /// Subscriptions eligible for the day and considered by the pass.
    pub considered: usize,
    pub created: u32,
    pub skipped: SkipCounts,
    pub errors: Vec<SubscriptionFailure>,
}

#[derive(Serialize, Default, Clone, Copy, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SkipCounts {
    pub no_menu: u32,
    pub duplicate: u32,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFailure {
    pub subscription_id: i32,
    pub message: String,
}

impl RunSummary {
    fn new(considered: usize) -> Self {
        Self {
            ok: true,
            considered,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: &SubscriptionOutcome) {
        match outcome {
            SubscriptionOutcome::Created { .. } => self.created += 1,
            SubscriptionOutcome::SkippedNoMenu => self.skipped.no_menu += 1,
            SubscriptionOutcome::SkippedDuplicate => self.skipped.duplicate += 1,
        }
    }

    fn record_failure(&mut self, subscription_id: i32, message: String) {
        self.errors.push(SubscriptionFailure {
            subscription_id,
            message,
        });
    }
}
