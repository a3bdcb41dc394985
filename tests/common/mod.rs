use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use tifinnity_scheduler::repository::OrderStore;
use tifinnity_scheduler::repository::Repository;
use tifinnity_scheduler::repository::error::DatabaseError;
use tifinnity_scheduler::repository::model::MenuItemModel;
use tifinnity_scheduler::repository::model::OrderModel;
use tifinnity_scheduler::repository::model::SubscriptionModel;
use tifinnity_scheduler::repository::model::SubscriptionStatus;
use uuid::Uuid;

#[allow(dead_code)]
pub async fn setup_db() -> (Arc<Repository>, PathBuf) {
    let uuid = Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("tifinnity-scheduler-test-{}.db", uuid));
    let db_url = format!("sqlite://{}", db_path.to_str().unwrap());

    let db = Repository::new(&db_url, db_path.to_str().unwrap())
        .await
        .expect("Failed to create database");

    db.run_migrations().await.expect("Failed to run migrations");

    (Arc::new(db), db_path)
}

#[allow(dead_code)]
pub async fn teardown_db(db_path: PathBuf) {
    if db_path.exists() {
        let _ = std::fs::remove_file(db_path);
    }
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// MOCK STORE

/// In-memory [`OrderStore`] with injectable failures.
#[derive(Default)]
#[allow(dead_code)]
pub struct MockOrderStore {
    pub state: Arc<RwLock<MockStoreState>>,
}

#[derive(Default)]
#[allow(dead_code)]
pub struct MockStoreState {
    pub subscriptions: Vec<SubscriptionModel>,
    pub menus: Vec<MenuItemModel>,
    pub orders: Vec<OrderModel>,
    pub next_order_id: i32,
    /// Fail the initial subscription listing (job-level failure).
    pub fail_listing: bool,
    /// Mess ids whose menu lookup fails.
    pub fail_menu_for: Vec<i32>,
    /// Subscription ids whose order insert fails.
    pub fail_insert_for: Vec<i32>,
    /// Report a unique violation on every insert, as if an overlapping run
    /// placed the order between the existence check and the insert.
    pub conflict_on_insert: bool,
}

#[allow(dead_code)]
impl MockOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_subscription(&self, subscription: SubscriptionModel) {
        self.state.write().unwrap().subscriptions.push(subscription);
    }

    pub fn add_menu(&self, menu: MenuItemModel) {
        self.state.write().unwrap().menus.push(menu);
    }

    pub fn orders(&self) -> Vec<OrderModel> {
        self.state.read().unwrap().orders.clone()
    }
}

#[async_trait]
impl OrderStore for MockOrderStore {
    async fn list_active_subscriptions(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<SubscriptionModel>, DatabaseError> {
        let state = self.state.read().unwrap();
        if state.fail_listing {
            return Err(DatabaseError::InternalError {
                message: "store unreachable".to_string(),
            });
        }
        Ok(state
            .subscriptions
            .iter()
            .filter(|s| {
                s.status == SubscriptionStatus::Active
                    && s.start_date <= today
                    && s.end_date >= today
            })
            .cloned()
            .collect())
    }

    async fn find_available_menu_item(
        &self,
        mess_id: i32,
        today: NaiveDate,
    ) -> Result<Option<MenuItemModel>, DatabaseError> {
        let state = self.state.read().unwrap();
        if state.fail_menu_for.contains(&mess_id) {
            return Err(DatabaseError::InternalError {
                message: format!("menu fetch failed for mess {}", mess_id),
            });
        }
        Ok(state
            .menus
            .iter()
            .filter(|m| m.mess_id == mess_id && m.menu_date == today && m.available)
            .min_by_key(|m| m.id)
            .cloned())
    }

    async fn order_exists(
        &self,
        subscription_id: i32,
        today: NaiveDate,
    ) -> Result<bool, DatabaseError> {
        let state = self.state.read().unwrap();
        Ok(state
            .orders
            .iter()
            .any(|o| o.subscription_id == subscription_id && o.order_date == today))
    }

    async fn create_order(&self, order: &OrderModel) -> Result<OrderModel, DatabaseError> {
        let mut state = self.state.write().unwrap();
        if state.fail_insert_for.contains(&order.subscription_id) {
            return Err(DatabaseError::InternalError {
                message: format!("insert failed for subscription {}", order.subscription_id),
            });
        }
        let duplicate = state
            .orders
            .iter()
            .any(|o| o.subscription_id == order.subscription_id && o.order_date == order.order_date);
        if state.conflict_on_insert || duplicate {
            return Err(DatabaseError::UniqueViolation {
                message: "UNIQUE constraint failed: orders.subscription_id, orders.order_date"
                    .to_string(),
            });
        }
        state.next_order_id += 1;
        let stored = OrderModel {
            id: state.next_order_id,
            ..order.clone()
        };
        state.orders.push(stored.clone());
        Ok(stored)
    }
}
