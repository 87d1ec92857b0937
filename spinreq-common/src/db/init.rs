//! Database initialization
//!
//! Creates the SQLite database and schema on first run. All statements are
//! idempotent (`CREATE TABLE IF NOT EXISTS`) so calling this on every
//! startup is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    // Wait on locks instead of failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Create all tables and indexes. Safe to call repeatedly.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_organizations_table(pool).await?;
    create_settings_table(pool).await?;
    create_blacklist_table(pool).await?;
    create_music_library_table(pool).await?;
    create_pricing_rules_table(pool).await?;
    create_duplicate_rules_table(pool).await?;
    create_crowd_requests_table(pool).await?;
    Ok(())
}

/// Create the organizations table
///
/// Library-boundary configuration lives directly on the organization row;
/// there is exactly one boundary config per organization.
async fn create_organizations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS organizations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            library_enabled INTEGER NOT NULL DEFAULT 0,
            library_action TEXT NOT NULL DEFAULT 'allow'
                CHECK (library_action IN ('deny', 'premium_price', 'allow')),
            library_premium_multiplier REAL NOT NULL DEFAULT 1.0,
            library_premium_fixed_cents INTEGER,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (library_premium_multiplier >= 0.0),
            CHECK (library_premium_fixed_cents IS NULL OR library_premium_fixed_cents >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores service configuration key-value pairs (caller-side add-on knobs
/// like the fast-track fee live here).
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the song_blacklist table
///
/// A normalized (title, artist) match here denies the request outright,
/// regardless of every other rule. Entries have no expiry.
async fn create_blacklist_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_blacklist (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
            song_title TEXT NOT NULL,
            song_artist TEXT NOT NULL,
            normalized_title TEXT NOT NULL,
            normalized_artist TEXT NOT NULL,
            reason TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_blacklist_org_track
         ON song_blacklist(organization_id, normalized_title, normalized_artist)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the music_library table (boundary list)
///
/// Defines the "known" set consulted by the library boundary check. Only
/// used when the organization has library_enabled set.
async fn create_music_library_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS music_library (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
            song_title TEXT NOT NULL,
            song_artist TEXT NOT NULL,
            normalized_title TEXT NOT NULL,
            normalized_artist TEXT NOT NULL,
            genre TEXT,
            bpm INTEGER,
            key_signature TEXT,
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (bpm IS NULL OR bpm > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_library_org_track
         ON music_library(organization_id, normalized_title, normalized_artist)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the song_pricing_rules table
///
/// custom_price_cents: -1 = deny, 0 = free, >0 = fixed price. An exact
/// match within the rule's applicability scope replaces the computed price
/// entirely.
async fn create_pricing_rules_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_pricing_rules (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
            song_title TEXT NOT NULL,
            song_artist TEXT NOT NULL,
            normalized_title TEXT NOT NULL,
            normalized_artist TEXT NOT NULL,
            custom_price_cents INTEGER NOT NULL,
            applies_to_fast_track INTEGER NOT NULL DEFAULT 1,
            applies_to_regular INTEGER NOT NULL DEFAULT 1,
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (custom_price_cents >= -1)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pricing_org_track
         ON song_pricing_rules(organization_id, normalized_title, normalized_artist)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the song_duplicate_rules table
///
/// At most one row per organization. A missing row means duplicate
/// detection is disabled (safe defaults, never an error).
async fn create_duplicate_rules_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_duplicate_rules (
            organization_id TEXT PRIMARY KEY REFERENCES organizations(id) ON DELETE CASCADE,
            enabled INTEGER NOT NULL DEFAULT 0,
            action TEXT NOT NULL DEFAULT 'allow'
                CHECK (action IN ('deny', 'premium_price', 'allow')),
            time_window_minutes INTEGER NOT NULL DEFAULT 60,
            premium_multiplier REAL NOT NULL DEFAULT 1.0,
            premium_fixed_cents INTEGER,
            match_by_exact_title INTEGER NOT NULL DEFAULT 1,
            match_by_exact_artist INTEGER NOT NULL DEFAULT 1,
            match_case_sensitive INTEGER NOT NULL DEFAULT 0,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (time_window_minutes > 0),
            CHECK (premium_multiplier >= 0.0),
            CHECK (premium_fixed_cents IS NULL OR premium_fixed_cents >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the crowd_requests table
///
/// Accepted requests only; this is the prior-request set that duplicate
/// detection scans. The intake flow inserts here in the same transaction
/// that commits the admission decision.
async fn create_crowd_requests_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS crowd_requests (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
            song_title TEXT NOT NULL,
            song_artist TEXT NOT NULL,
            normalized_title TEXT NOT NULL,
            normalized_artist TEXT NOT NULL,
            is_fast_track INTEGER NOT NULL DEFAULT 0,
            base_price_cents INTEGER NOT NULL,
            final_price_cents INTEGER NOT NULL,
            accepted_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_requests_org_accepted
         ON crowd_requests(organization_id, accepted_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Ensures all required settings exist with default values, and resets
/// NULL values back to defaults.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Caller-side add-ons, applied after admission (never by the evaluator)
    ensure_setting(pool, "fast_track_fee_cents", "1000").await?;
    ensure_setting(pool, "bundle_discount_percent", "0").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    // INSERT OR IGNORE handles concurrent initialization races
    sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(default_value)
        .execute(pool)
        .await?;

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;
    }

    Ok(())
}
