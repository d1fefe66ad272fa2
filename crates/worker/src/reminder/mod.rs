//! The repurchase reminder pipeline.
//!
//! One run flows `evaluate -> dedup -> dispatch` per visible order item:
//!
//! - [`evaluate::Evaluator`] decides whether an item qualifies for a
//!   reminder given current catalog and stock state.
//! - [`dedup::DedupTracker`] admits each (product, customer) pair once per
//!   run. The tracker lives for exactly one run and is dropped with it.
//! - [`dispatch::Dispatcher`] renders and sends the email, then records the
//!   attempt in the email log.
//!
//! [`run::ReminderJob`] drives the loop; [`prune::PruneJob`] ages out old
//! log rows. Both swallow every error: the scheduler that triggers them
//! only ever observes logs and the audit table.

pub mod dedup;
pub mod dispatch;
pub mod evaluate;
pub mod prune;
pub mod run;

pub use dedup::{DedupKey, DedupTracker};
pub use dispatch::{DispatchOutcome, Dispatcher, SenderIdentity};
pub use evaluate::{EvalOutcome, Evaluator, ReminderCandidate, SkipReason};
pub use prune::{PruneJob, RETENTION_DAYS};
pub use run::{ORDER_WINDOW_DAYS, ReminderJob, RunSummary};
