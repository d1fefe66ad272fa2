//! Status enums for reminder dispatch outcomes.

use serde::{Deserialize, Serialize};

/// Outcome of one reminder email attempt, as recorded in the audit log.
///
/// Stored in the `email_status` column as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    /// The transport accepted the message.
    Sent,
    /// The transport rejected the message or the send timed out.
    Failed,
}

impl EmailStatus {
    /// Database representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Parse a database value back into a status.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl core::fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_db_representation() {
        for status in [EmailStatus::Sent, EmailStatus::Failed] {
            assert_eq!(EmailStatus::from_str_opt(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_unknown_value_is_none() {
        assert_eq!(EmailStatus::from_str_opt("bounced"), None);
        assert_eq!(EmailStatus::from_str_opt(""), None);
    }

    #[test]
    fn test_display_matches_column_value() {
        assert_eq!(EmailStatus::Sent.to_string(), "sent");
        assert_eq!(EmailStatus::Failed.to_string(), "failed");
    }
}
