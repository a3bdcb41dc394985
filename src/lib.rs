//! tifinnity-scheduler - recurring subscription-to-order generation.
//!
//! This crate provides the batch scheduler for a food-subscription platform:
//! - Daily conversion of active mess subscriptions into placed orders
//! - Deterministic menu selection and duplicate-order protection
//! - SQLite persistence for subscriptions, menus, and orders

pub mod config;
pub mod error;
pub mod logging;
pub mod repository;
pub mod service;
pub mod task;
