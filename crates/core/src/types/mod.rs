//! Core types for Replenish.
//!
//! Type-safe wrappers for the domain concepts the reminder pipeline passes
//! around: entity IDs, customer emails, and dispatch statuses.

pub mod email;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use status::EmailStatus;
