//! Database table operations and implementations.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteArguments;

use crate::repository::error::DatabaseError;
use crate::repository::model::MenuItemModel;
use crate::repository::model::OrderModel;
use crate::repository::model::OrderStatus;
use crate::repository::model::SubscriptionModel;
use crate::repository::model::SubscriptionPlan;
use crate::repository::model::SubscriptionStatus;

/// Base table struct providing database pool access.
#[derive(Clone)]
pub struct BaseTable {
    pub pool: SqlitePool,
}

impl BaseTable {
    /// Creates a new base table with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Trait for tables with CRUD operations.
///
/// Schema creation lives in the sqlx migrations, not here.
#[async_trait::async_trait]
pub trait Table<T, ID> {
    async fn select_all(&self) -> Result<Vec<T>, DatabaseError>;
    async fn insert(&self, model: &T) -> Result<ID, DatabaseError>;
    async fn select(&self, id: &ID) -> Result<Option<T>, DatabaseError>;
    async fn update(&self, model: &T) -> Result<(), DatabaseError>;
    async fn delete(&self, id: &ID) -> Result<(), DatabaseError>;
}

/// Helper trait to handle binding parameters of mixed field types in the
/// table macro below.
pub trait BindParam<'q> {
    fn bind_param<O>(
        self,
        query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>>;
    fn bind_param_q(
        self,
        query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>;
}

macro_rules! impl_bind_param {
    ($t:ty) => {
        impl<'q> BindParam<'q> for $t {
            fn bind_param<O>(
                self,
                query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>>,
            ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, SqliteArguments<'q>> {
                query.bind(self)
            }
            fn bind_param_q(
                self,
                query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
            ) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
                query.bind(self)
            }
        }
    };
}

// Implement for reference types that are passed to .bind()
impl_bind_param!(&'q i32);
impl_bind_param!(&'q f64);
impl_bind_param!(&'q bool);
impl_bind_param!(&'q String);
impl_bind_param!(&'q NaiveDate);
impl_bind_param!(&'q chrono::DateTime<chrono::Utc>);
impl_bind_param!(&'q SubscriptionStatus);
impl_bind_param!(&'q SubscriptionPlan);
impl_bind_param!(&'q OrderStatus);

macro_rules! impl_table {
    (
        $struct_name:ident,
        $model:ty,
        $table:expr,
        $pk:ident,
        $id_type:ty,
        $cols:expr,
        $vals:expr,
        $update_set:expr,
        [ $( $field:ident ),+ ]
    ) => {
        #[derive(Clone)]
        pub struct $struct_name {
            base: BaseTable,
        }

        impl $struct_name {
            pub fn new(pool: SqlitePool) -> Self {
                Self {
                    base: BaseTable::new(pool),
                }
            }
        }

        #[async_trait::async_trait]
        impl Table<$model, $id_type> for $struct_name {
            async fn select_all(&self) -> Result<Vec<$model>, DatabaseError> {
                Ok(sqlx::query_as::<_, $model>(concat!("SELECT * FROM ", $table))
                    .fetch_all(&self.base.pool)
                    .await?)
            }

            async fn select(&self, id: &$id_type) -> Result<Option<$model>, DatabaseError> {
                let query = sqlx::query_as::<_, $model>(concat!("SELECT * FROM ", $table, " WHERE ", stringify!($pk), " = ?"));
                let query = BindParam::bind_param(id, query);
                Ok(
                    query
                        .fetch_optional(&self.base.pool)
                        .await?,
                )
            }

            async fn insert(&self, model: &$model) -> Result<$id_type, DatabaseError> {
                let mut query = sqlx::query_as(concat!(
                        "INSERT INTO ", $table, " (", $cols, ") VALUES (", $vals, ") RETURNING ", stringify!($pk)
                    ));

                $(
                    query = BindParam::bind_param(&model.$field, query);
                )+

                let row: ($id_type,) = query.fetch_one(&self.base.pool).await?;
                Ok(row.0)
            }

            async fn update(&self, model: &$model) -> Result<(), DatabaseError> {
                let mut query = sqlx::query(concat!(
                        "UPDATE ", $table, " SET ", $update_set, " WHERE ", stringify!($pk), " = ?"
                    ));

                $(
                    query = BindParam::bind_param_q(&model.$field, query);
                )+
                query = BindParam::bind_param_q(&model.$pk, query);

                query.execute(&self.base.pool).await?;
                Ok(())
            }

            async fn delete(&self, id: &$id_type) -> Result<(), DatabaseError> {
                let query = sqlx::query(concat!("DELETE FROM ", $table, " WHERE ", stringify!($pk), " = ?"));
                let query = BindParam::bind_param_q(id, query);
                query.execute(&self.base.pool).await?;
                Ok(())
            }
        }
    };
}

// ============================================================================
// SubscriptionTable
// ============================================================================

impl_table!(
    SubscriptionTable,
    SubscriptionModel,
    "subscriptions",
    id,
    i32,
    "user_id, mess_id, status, subscription_type, start_date, end_date",
    "?, ?, ?, ?, ?, ?",
    "user_id = ?, mess_id = ?, status = ?, subscription_type = ?, start_date = ?, end_date = ?",
    [
        user_id,
        mess_id,
        status,
        subscription_type,
        start_date,
        end_date
    ]
);

impl SubscriptionTable {
    /// All subscriptions that should generate an order on `day`: status
    /// `active` with `day` inside `[start_date, end_date]`.
    pub async fn select_active_on(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<SubscriptionModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, SubscriptionModel>(
            "SELECT * FROM subscriptions WHERE status = ? AND start_date <= ? AND end_date >= ?",
        )
        .bind(SubscriptionStatus::Active)
        .bind(day)
        .bind(day)
        .fetch_all(&self.base.pool)
        .await?)
    }
}

// ============================================================================
// MessMenuTable
// ============================================================================

impl_table!(
    MessMenuTable,
    MenuItemModel,
    "mess_menus",
    id,
    i32,
    "mess_id, item_name, price, menu_date, available",
    "?, ?, ?, ?, ?",
    "mess_id = ?, item_name = ?, price = ?, menu_date = ?, available = ?",
    [mess_id, item_name, price, menu_date, available]
);

impl MessMenuTable {
    /// The menu item an order for `mess_id` should use on `day`.
    ///
    /// Lowest id wins when a mess publishes several available items for the
    /// same date, so repeated runs always resolve to the same dish.
    pub async fn select_available_on(
        &self,
        mess_id: i32,
        day: NaiveDate,
    ) -> Result<Option<MenuItemModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, MenuItemModel>(
            r#"
            SELECT * FROM mess_menus
            WHERE mess_id = ? AND menu_date = ? AND available = 1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(mess_id)
        .bind(day)
        .fetch_optional(&self.base.pool)
        .await?)
    }
}

// ============================================================================
// OrderTable
// ============================================================================

impl_table!(
    OrderTable,
    OrderModel,
    "orders",
    id,
    i32,
    "user_id, mess_id, menu_id, subscription_id, order_date, status, total_amount, created_at",
    "?, ?, ?, ?, ?, ?, ?, ?",
    "user_id = ?, mess_id = ?, menu_id = ?, subscription_id = ?, order_date = ?, status = ?, total_amount = ?, created_at = ?",
    [
        user_id,
        mess_id,
        menu_id,
        subscription_id,
        order_date,
        status,
        total_amount,
        created_at
    ]
);

impl OrderTable {
    /// Check if an order exists for `(subscription_id, day)`.
    pub async fn exists_for_day(
        &self,
        subscription_id: i32,
        day: NaiveDate,
    ) -> Result<bool, DatabaseError> {
        let count: (i32,) = sqlx::query_as(
            "SELECT COUNT(*) FROM orders WHERE subscription_id = ? AND order_date = ?",
        )
        .bind(subscription_id)
        .bind(day)
        .fetch_one(&self.base.pool)
        .await?;
        Ok(count.0 > 0)
    }

    /// All orders placed for `day`, oldest id first.
    pub async fn select_all_by_day(&self, day: NaiveDate) -> Result<Vec<OrderModel>, DatabaseError> {
        Ok(sqlx::query_as::<_, OrderModel>(
            "SELECT * FROM orders WHERE order_date = ? ORDER BY id",
        )
        .bind(day)
        .fetch_all(&self.base.pool)
        .await?)
    }
}
