//! Settings database access
//!
//! Read/write settings from the settings table (key-value store). All
//! settings are service-wide; per-organization rule configuration lives in
//! its own tables.

use crate::error::{Error, Result};
use crate::pricing::AddonSettings;
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Load the caller-side add-on knobs, falling back to defaults for any
/// missing key.
pub async fn get_addon_settings(db: &Pool<Sqlite>) -> Result<AddonSettings> {
    let defaults = AddonSettings::default();

    let fast_track_fee_cents = get_setting::<i64>(db, "fast_track_fee_cents")
        .await?
        .unwrap_or(defaults.fast_track_fee_cents);

    let bundle_discount_percent = get_setting::<i64>(db, "bundle_discount_percent")
        .await?
        .unwrap_or(defaults.bundle_discount_percent)
        .clamp(0, 100);

    Ok(AddonSettings {
        fast_track_fee_cents,
        bundle_discount_percent,
    })
}

/// Set the flat fast-track fee
pub async fn set_fast_track_fee(db: &Pool<Sqlite>, fee_cents: i64) -> Result<()> {
    set_setting(db, "fast_track_fee_cents", fee_cents.max(0)).await
}

/// Set the bundle discount percentage (0-100)
pub async fn set_bundle_discount(db: &Pool<Sqlite>, percent: i64) -> Result<()> {
    set_setting(db, "bundle_discount_percent", percent.clamp(0, 100)).await
}

/// Generic setting getter
///
/// Returns None if key doesn't exist in database. Parses value from string
/// using FromStr.
pub async fn get_setting<T: FromStr>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter
///
/// Inserts or updates setting in database.
pub async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    let value_str = value.to_string();

    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value_str)
    .execute(db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> Pool<Sqlite> {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();
        spinreq_common::db::init::create_settings_table(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_generic_setting_get_set() {
        let db = setup_test_db().await;

        set_setting(&db, "test_int", 42).await.unwrap();
        let value: Option<i32> = get_setting(&db, "test_int").await.unwrap();
        assert_eq!(value, Some(42));

        // Non-existent key should return None
        let value: Option<String> = get_setting(&db, "nonexistent").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_setting_update_is_upsert() {
        let db = setup_test_db().await;

        set_setting(&db, "test_key", "value1".to_string()).await.unwrap();
        set_setting(&db, "test_key", "value2".to_string()).await.unwrap();
        let value: Option<String> = get_setting(&db, "test_key").await.unwrap();
        assert_eq!(value, Some("value2".to_string()));
    }

    #[tokio::test]
    async fn test_addon_settings_defaults_when_missing() {
        let db = setup_test_db().await;

        let addons = get_addon_settings(&db).await.unwrap();
        assert_eq!(addons.fast_track_fee_cents, 1000);
        assert_eq!(addons.bundle_discount_percent, 0);
    }

    #[tokio::test]
    async fn test_addon_settings_read_back() {
        let db = setup_test_db().await;

        set_fast_track_fee(&db, 2500).await.unwrap();
        set_bundle_discount(&db, 150).await.unwrap(); // clamped

        let addons = get_addon_settings(&db).await.unwrap();
        assert_eq!(addons.fast_track_fee_cents, 2500);
        assert_eq!(addons.bundle_discount_percent, 100);
    }
}
