//! Replenish Worker - repurchase reminder batch jobs.
//!
//! Two scheduled jobs live here:
//!
//! - [`reminder::ReminderJob`] - scans recent orders for customers who bought
//!   low-stock, reminder-eligible products and emails each of them at most
//!   once per product per run, recording every attempt in the email log.
//! - [`reminder::PruneJob`] - deletes email log entries older than the
//!   retention window.
//!
//! Both jobs are invoked by an external scheduler through the CLI and never
//! propagate errors to it: failures are logged, counted in the run summary,
//! and swallowed.
//!
//! # Modules
//!
//! - [`config`] - Environment-based worker configuration
//! - [`models`] - Domain structs (orders, products, email log rows)
//! - [`db`] - `PostgreSQL` pool and the email log repository
//! - [`sources`] - Read-only collaborator traits + Postgres implementations
//! - [`services`] - Store-scoped settings and the SMTP mail transport
//! - [`reminder`] - The evaluation/dedup/dispatch pipeline and both jobs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod reminder;
pub mod services;
pub mod sources;
