//! Worker services: store-scoped settings and the mail transport.

pub mod email;
pub mod settings;

pub use email::{EmailError, MailTransport, ReminderEmail, SmtpMailer};
pub use settings::{PgSettings, SettingsSource};
