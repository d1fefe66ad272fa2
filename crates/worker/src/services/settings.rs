//! Store-scoped configuration.
//!
//! Settings are slash-separated paths (`product_reminder/settings/enable`)
//! resolved against a store scope with fallback to the default scope, the
//! same way the storefront resolves its configuration. Missing or
//! unparseable values never fail a run; callers fall back to defaults.

use async_trait::async_trait;
use sqlx::PgPool;

use replenish_core::StoreId;

use crate::db::RepositoryError;

/// Read access to store-scoped settings.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// A boolean flag at `path`, `false` when unset.
    async fn flag(&self, path: &str, store: StoreId) -> Result<bool, RepositoryError>;

    /// The raw string value at `path`, `None` when unset.
    async fn value(&self, path: &str, store: StoreId)
    -> Result<Option<String>, RepositoryError>;
}

/// Interpret a stored setting value as a flag.
///
/// Mirrors the storefront's truthiness rules: "1", "true", and "yes" enable,
/// anything else (including absence) disables.
#[must_use]
pub fn parse_flag(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "yes"))
}

/// `PostgreSQL`-backed settings, from the `store_settings` table.
#[derive(Clone)]
pub struct PgSettings {
    pool: PgPool,
}

impl PgSettings {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsSource for PgSettings {
    async fn flag(&self, path: &str, store: StoreId) -> Result<bool, RepositoryError> {
        let value = self.value(path, store).await?;
        Ok(parse_flag(value.as_deref()))
    }

    async fn value(
        &self,
        path: &str,
        store: StoreId,
    ) -> Result<Option<String>, RepositoryError> {
        // Store-specific value wins over the default-scope value.
        let value = sqlx::query_scalar::<_, String>(
            r"
            SELECT value
            FROM store_settings
            WHERE path = $1 AND store_id IN ($2, $3)
            ORDER BY store_id DESC
            LIMIT 1
            ",
        )
        .bind(path)
        .bind(StoreId::DEFAULT)
        .bind(store)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_truthy_values() {
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("yes")));
    }

    #[test]
    fn test_parse_flag_falsy_values() {
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(Some("TRUE")));
        assert!(!parse_flag(None));
    }
}
