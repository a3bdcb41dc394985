use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sqlx::FromRow;

/// Lifecycle state of a subscription.
///
/// Only `Active` subscriptions generate orders; `Skipped` and `Cancelled`
/// are customer/partner actions and invisible to the scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, Default, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Skipped,
    Cancelled,
}

/// Plan the customer picked at subscribe time. Determines the length of the
/// validity window, nothing else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, Default, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// Order lifecycle state.
///
/// The scheduler only ever creates `Placed` orders; `Delivered` and
/// `Cancelled` are later partner transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, Default, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Placed,
    Delivered,
    Cancelled,
}

/// A customer's recurring commitment to receive meals from a mess over a
/// date range.
///
/// Eligible for order generation on day `d` iff `status` is `Active` and
/// `start_date <= d <= end_date`. Read-only to the scheduler.
#[derive(FromRow, Serialize, Default, Clone, Debug)]
pub struct SubscriptionModel {
    #[serde(default)]
    pub id: i32,
    /// Auth user id of the subscribing customer.
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub mess_id: i32,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub subscription_type: SubscriptionPlan,
    #[serde(default)]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: NaiveDate,
}

/// A dish a mess offers on a specific date.
///
/// Usable for an order only when `menu_date` matches the run date and
/// `available` is set. Owned and mutated by the partner.
#[derive(FromRow, Serialize, Default, Clone, Debug)]
pub struct MenuItemModel {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub mess_id: i32,
    #[serde(default)]
    pub item_name: String,
    /// Copied onto the order as `total_amount` at creation time.
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub menu_date: NaiveDate,
    #[serde(default)]
    pub available: bool,
}

/// A generated daily order.
///
/// At most one order exists per `(subscription_id, order_date)`; the orders
/// table enforces this with a UNIQUE constraint, which is what keeps reruns
/// and overlapping runs from double-ordering.
#[derive(FromRow, Serialize, Default, Clone, Debug)]
pub struct OrderModel {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub mess_id: i32,
    #[serde(default)]
    pub menu_id: i32,
    #[serde(default)]
    pub subscription_id: i32,
    #[serde(default)]
    pub order_date: NaiveDate,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}
