//! Settings table accessors
//!
//! Key-value pattern: every value is stored as text and parsed on read.

use crate::{Error, Result};
use sqlx::{Pool, Sqlite};

/// Read a setting, parsing it into `T`
///
/// **Returns:** Some(value) if set, None if missing or NULL
pub async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(Option<String>,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match row {
        Some((Some(value),)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting '{}' failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}

/// Write a setting (insert or replace)
pub async fn set_setting<T>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;

    #[tokio::test]
    async fn test_get_setting_missing_returns_none() {
        let pool = init_memory_database().await.unwrap();

        let value: Option<u64> = get_setting(&pool, "import_fetch_timeout_secs").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_then_get_setting() {
        let pool = init_memory_database().await.unwrap();

        set_setting(&pool, "import_fetch_timeout_secs", 30u64).await.unwrap();
        set_setting(&pool, "import_fetch_timeout_secs", 45u64).await.unwrap();

        let value: Option<u64> = get_setting(&pool, "import_fetch_timeout_secs").await.unwrap();
        assert_eq!(value, Some(45));
    }

    #[tokio::test]
    async fn test_unparsable_setting_is_config_error() {
        let pool = init_memory_database().await.unwrap();

        set_setting(&pool, "import_fetch_timeout_secs", "soon").await.unwrap();

        let result: Result<Option<u64>> = get_setting(&pool, "import_fetch_timeout_secs").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
