//! Background task driving the daily order scheduler.

pub mod order_scheduler;
