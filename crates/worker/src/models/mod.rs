//! Domain structs for the reminder pipeline.

pub mod email_log;
pub mod order;
pub mod product;

pub use email_log::{EmailLogEntry, NewEmailLogEntry};
pub use order::{Order, OrderItem};
pub use product::{ProductSnapshot, StockItem};
