//! Replenish Core - Shared types library.
//!
//! This crate provides the common types used across the Replenish components:
//! - `worker` - Repurchase reminder batch jobs
//! - `cli` - Command-line entry points for the scheduler
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no mail
//! transport. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
