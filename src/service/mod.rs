use std::sync::Arc;

use crate::repository::Repository;
use crate::service::order_scheduler_service::OrderSchedulerService;

pub mod error;
pub mod order_scheduler_service;

pub struct Services {
    pub order_scheduler: Arc<OrderSchedulerService>,
}

impl Services {
    pub fn new(db: Arc<Repository>) -> Self {
        Self {
            order_scheduler: Arc::new(OrderSchedulerService::new(db)),
        }
    }
}
