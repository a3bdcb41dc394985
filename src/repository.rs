//! Database module with SQLite storage and SQLx.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use log::info;
use sqlx::SqlitePool;
use sqlx::error::ErrorKind;
use sqlx::sqlite::SqliteConnectOptions;

use crate::repository::error::DatabaseError;
use crate::repository::model::MenuItemModel;
use crate::repository::model::OrderModel;
use crate::repository::model::SubscriptionModel;
use crate::repository::table::MessMenuTable;
use crate::repository::table::OrderTable;
use crate::repository::table::SubscriptionTable;
use crate::repository::table::Table;

pub mod error;
pub mod model;
pub mod table;

/// Data-access seam the order scheduler runs against.
///
/// Implemented by [`Repository`] for SQLite; tests substitute an in-memory
/// mock to inject failures.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Subscriptions that should produce an order on `today`: status
    /// `active`, with `today` inside their validity window.
    async fn list_active_subscriptions(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<SubscriptionModel>, DatabaseError>;

    /// The menu item an order from `mess_id` should use for `today`, if the
    /// mess published one. Selection is deterministic: the available item
    /// with the lowest id.
    async fn find_available_menu_item(
        &self,
        mess_id: i32,
        today: NaiveDate,
    ) -> Result<Option<MenuItemModel>, DatabaseError>;

    /// Whether an order already exists for `(subscription_id, today)`.
    async fn order_exists(
        &self,
        subscription_id: i32,
        today: NaiveDate,
    ) -> Result<bool, DatabaseError>;

    /// Persists `order` and returns it with its generated id.
    ///
    /// Fails with [`DatabaseError::UniqueViolation`] when an order for the
    /// same `(subscription_id, order_date)` already exists.
    async fn create_order(&self, order: &OrderModel) -> Result<OrderModel, DatabaseError>;
}

/// Main database struct containing all table handlers.
pub struct Repository {
    pool: SqlitePool,
    pub subscription: SubscriptionTable,
    pub mess_menu: MessMenuTable,
    pub order: OrderTable,
}

impl Repository {
    /// Creates a new database connection and initializes table handlers.
    pub async fn new(db_url: &str, db_path: &str) -> anyhow::Result<Self> {
        let path = std::path::Path::new(db_path);
        if !path.exists() {
            debug!("Database path {db_path} does not exist. Creating...");
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, "")?;
            info!("Created {db_path}");
        }

        debug!("Connecting to db...");
        let opts = SqliteConnectOptions::from_str(db_url)?.foreign_keys(true);
        let pool = SqlitePool::connect_with(opts).await?;
        info!("Connected to db.");

        let subscription = SubscriptionTable::new(pool.clone());
        let mess_menu = MessMenuTable::new(pool.clone());
        let order = OrderTable::new(pool.clone());

        Ok(Self {
            pool,
            subscription,
            mess_menu,
            order,
        })
    }

    /// Runs database migrations from the migrations directory.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for Repository {
    async fn list_active_subscriptions(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<SubscriptionModel>, DatabaseError> {
        self.subscription.select_active_on(today).await
    }

    async fn find_available_menu_item(
        &self,
        mess_id: i32,
        today: NaiveDate,
    ) -> Result<Option<MenuItemModel>, DatabaseError> {
        self.mess_menu.select_available_on(mess_id, today).await
    }

    async fn order_exists(
        &self,
        subscription_id: i32,
        today: NaiveDate,
    ) -> Result<bool, DatabaseError> {
        self.order.exists_for_day(subscription_id, today).await
    }

    async fn create_order(&self, order: &OrderModel) -> Result<OrderModel, DatabaseError> {
        match self.order.insert(order).await {
            Ok(id) => Ok(OrderModel {
                id,
                ..order.clone()
            }),
            Err(DatabaseError::BackendError(sqlx_err))
                if sqlx_err
                    .as_database_error()
                    .is_some_and(|e| matches!(e.kind(), ErrorKind::UniqueViolation)) =>
            {
                Err(DatabaseError::UniqueViolation {
                    message: sqlx_err.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }
}
