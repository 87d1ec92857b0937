//! Rule store access
//!
//! Fetches an organization's rule set as an immutable [`RuleSnapshot`] for
//! the evaluator, and provides the thin CRUD the admin surface edits rules
//! through. Every write populates the normalized matching columns so reads
//! never have to normalize stored data.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::policy::{
    BlacklistEntry, DuplicateDetectionConfig, LibraryBoundaryConfig, LibraryEntry,
    PricingOverrideRule, RuleAction, RuleSnapshot,
};
use spinreq_common::db::models::{BlacklistRow, DuplicateRulesRow, LibraryRow, PricingRuleRow};
use spinreq_common::normalize_track_string;

/// Assemble one consistent snapshot of an organization's rules plus the
/// recent accepted requests duplicate detection needs.
///
/// Missing singleton config rows become safe defaults (feature disabled),
/// never an error.
pub async fn load_snapshot(
    db: &Pool<Sqlite>,
    organization_id: &str,
    now: DateTime<Utc>,
) -> Result<RuleSnapshot> {
    let blacklist = list_blacklist(db, organization_id)
        .await?
        .into_iter()
        .map(|row| BlacklistEntry {
            song_title: row.song_title,
            song_artist: row.song_artist,
            normalized_title: row.normalized_title,
            normalized_artist: row.normalized_artist,
            reason: row.reason,
        })
        .collect();

    let library = list_library(db, organization_id)
        .await?
        .into_iter()
        .map(|row| LibraryEntry {
            song_title: row.song_title,
            song_artist: row.song_artist,
            normalized_title: row.normalized_title,
            normalized_artist: row.normalized_artist,
            genre: row.genre,
            bpm: row.bpm,
            key_signature: row.key_signature,
            notes: row.notes,
        })
        .collect();

    let pricing_overrides = list_pricing_rules(db, organization_id)
        .await?
        .into_iter()
        .map(|row| PricingOverrideRule {
            song_title: row.song_title,
            song_artist: row.song_artist,
            normalized_title: row.normalized_title,
            normalized_artist: row.normalized_artist,
            custom_price_cents: row.custom_price_cents,
            applies_to_fast_track: row.applies_to_fast_track,
            applies_to_regular: row.applies_to_regular,
            notes: row.notes,
        })
        .collect();

    let duplicate_config = get_duplicate_rules(db, organization_id).await?;
    let library_config = get_library_settings(db, organization_id).await?;

    // Only fetch priors when duplicate detection can use them
    let recent_accepted = if duplicate_config.enabled {
        let since = now - spinreq_common::time::minutes(duplicate_config.time_window_minutes);
        super::requests::recent_accepted(db, organization_id, since).await?
    } else {
        Vec::new()
    };

    Ok(RuleSnapshot {
        blacklist,
        library,
        pricing_overrides,
        duplicate_config,
        library_config,
        recent_accepted,
    })
}

/// Insert an organization row if it does not exist yet. Rule writes need
/// the row for their foreign keys.
pub async fn ensure_organization(db: &Pool<Sqlite>, organization_id: &str) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO organizations (id, name) VALUES (?, ?)")
        .bind(organization_id)
        .bind(organization_id)
        .execute(db)
        .await?;
    Ok(())
}

// ============================================================================
// Blacklist
// ============================================================================

pub async fn list_blacklist(db: &Pool<Sqlite>, organization_id: &str) -> Result<Vec<BlacklistRow>> {
    let rows = sqlx::query_as::<_, BlacklistRow>(
        "SELECT * FROM song_blacklist WHERE organization_id = ? ORDER BY created_at",
    )
    .bind(organization_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn add_blacklist_entry(
    db: &Pool<Sqlite>,
    organization_id: &str,
    song_title: &str,
    song_artist: &str,
    reason: Option<&str>,
) -> Result<String> {
    ensure_organization(db, organization_id).await?;

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO song_blacklist
            (id, organization_id, song_title, song_artist, normalized_title, normalized_artist, reason)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(organization_id)
    .bind(song_title)
    .bind(song_artist)
    .bind(normalize_track_string(song_title))
    .bind(normalize_track_string(song_artist))
    .bind(reason)
    .execute(db)
    .await?;

    Ok(id)
}

pub async fn delete_blacklist_entry(
    db: &Pool<Sqlite>,
    organization_id: &str,
    id: &str,
) -> Result<()> {
    let result = sqlx::query("DELETE FROM song_blacklist WHERE organization_id = ? AND id = ?")
        .bind(organization_id)
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("blacklist entry {}", id)));
    }
    Ok(())
}

// ============================================================================
// Music library (boundary list)
// ============================================================================

pub async fn list_library(db: &Pool<Sqlite>, organization_id: &str) -> Result<Vec<LibraryRow>> {
    let rows = sqlx::query_as::<_, LibraryRow>(
        "SELECT * FROM music_library WHERE organization_id = ? ORDER BY created_at",
    )
    .bind(organization_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

#[allow(clippy::too_many_arguments)]
pub async fn add_library_entry(
    db: &Pool<Sqlite>,
    organization_id: &str,
    song_title: &str,
    song_artist: &str,
    genre: Option<&str>,
    bpm: Option<i64>,
    key_signature: Option<&str>,
    notes: Option<&str>,
) -> Result<String> {
    ensure_organization(db, organization_id).await?;

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO music_library
            (id, organization_id, song_title, song_artist, normalized_title, normalized_artist,
             genre, bpm, key_signature, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(organization_id)
    .bind(song_title)
    .bind(song_artist)
    .bind(normalize_track_string(song_title))
    .bind(normalize_track_string(song_artist))
    .bind(genre)
    .bind(bpm)
    .bind(key_signature)
    .bind(notes)
    .execute(db)
    .await?;

    Ok(id)
}

pub async fn delete_library_entry(
    db: &Pool<Sqlite>,
    organization_id: &str,
    id: &str,
) -> Result<()> {
    let result = sqlx::query("DELETE FROM music_library WHERE organization_id = ? AND id = ?")
        .bind(organization_id)
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("library entry {}", id)));
    }
    Ok(())
}

// ============================================================================
// Pricing overrides
// ============================================================================

pub async fn list_pricing_rules(
    db: &Pool<Sqlite>,
    organization_id: &str,
) -> Result<Vec<PricingRuleRow>> {
    let rows = sqlx::query_as::<_, PricingRuleRow>(
        "SELECT * FROM song_pricing_rules WHERE organization_id = ? ORDER BY created_at",
    )
    .bind(organization_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

#[allow(clippy::too_many_arguments)]
pub async fn add_pricing_rule(
    db: &Pool<Sqlite>,
    organization_id: &str,
    song_title: &str,
    song_artist: &str,
    custom_price_cents: i64,
    applies_to_fast_track: bool,
    applies_to_regular: bool,
    notes: Option<&str>,
) -> Result<String> {
    if custom_price_cents < -1 {
        return Err(Error::BadRequest(format!(
            "custom_price_cents must be -1 (deny), 0 (free), or a positive price; got {}",
            custom_price_cents
        )));
    }

    ensure_organization(db, organization_id).await?;

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO song_pricing_rules
            (id, organization_id, song_title, song_artist, normalized_title, normalized_artist,
             custom_price_cents, applies_to_fast_track, applies_to_regular, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(organization_id)
    .bind(song_title)
    .bind(song_artist)
    .bind(normalize_track_string(song_title))
    .bind(normalize_track_string(song_artist))
    .bind(custom_price_cents)
    .bind(applies_to_fast_track)
    .bind(applies_to_regular)
    .bind(notes)
    .execute(db)
    .await?;

    Ok(id)
}

pub async fn delete_pricing_rule(
    db: &Pool<Sqlite>,
    organization_id: &str,
    id: &str,
) -> Result<()> {
    let result = sqlx::query("DELETE FROM song_pricing_rules WHERE organization_id = ? AND id = ?")
        .bind(organization_id)
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("pricing rule {}", id)));
    }
    Ok(())
}

// ============================================================================
// Singleton configs
// ============================================================================

/// Load duplicate-detection config; a missing row means the feature is off.
pub async fn get_duplicate_rules(
    db: &Pool<Sqlite>,
    organization_id: &str,
) -> Result<DuplicateDetectionConfig> {
    let row = sqlx::query_as::<_, DuplicateRulesRow>(
        "SELECT * FROM song_duplicate_rules WHERE organization_id = ?",
    )
    .bind(organization_id)
    .fetch_optional(db)
    .await?;

    Ok(match row {
        Some(row) => DuplicateDetectionConfig {
            enabled: row.enabled,
            action: RuleAction::from_db(&row.action),
            time_window_minutes: row.time_window_minutes,
            premium_multiplier: row.premium_multiplier,
            premium_fixed_cents: row.premium_fixed_cents,
            match_by_exact_title: row.match_by_exact_title,
            match_by_exact_artist: row.match_by_exact_artist,
            match_case_sensitive: row.match_case_sensitive,
        },
        None => DuplicateDetectionConfig::default(),
    })
}

/// Upsert the organization's duplicate-detection config
pub async fn set_duplicate_rules(
    db: &Pool<Sqlite>,
    organization_id: &str,
    config: &DuplicateDetectionConfig,
) -> Result<()> {
    if config.time_window_minutes <= 0 {
        return Err(Error::BadRequest(
            "time_window_minutes must be positive".to_string(),
        ));
    }

    ensure_organization(db, organization_id).await?;

    sqlx::query(
        r#"
        INSERT INTO song_duplicate_rules
            (organization_id, enabled, action, time_window_minutes, premium_multiplier,
             premium_fixed_cents, match_by_exact_title, match_by_exact_artist, match_case_sensitive)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(organization_id) DO UPDATE SET
            enabled = excluded.enabled,
            action = excluded.action,
            time_window_minutes = excluded.time_window_minutes,
            premium_multiplier = excluded.premium_multiplier,
            premium_fixed_cents = excluded.premium_fixed_cents,
            match_by_exact_title = excluded.match_by_exact_title,
            match_by_exact_artist = excluded.match_by_exact_artist,
            match_case_sensitive = excluded.match_case_sensitive,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(organization_id)
    .bind(config.enabled)
    .bind(config.action.as_db())
    .bind(config.time_window_minutes)
    .bind(config.premium_multiplier)
    .bind(config.premium_fixed_cents)
    .bind(config.match_by_exact_title)
    .bind(config.match_by_exact_artist)
    .bind(config.match_case_sensitive)
    .execute(db)
    .await?;

    Ok(())
}

/// Load library-boundary config from the organization row; a missing
/// organization means the feature is off.
pub async fn get_library_settings(
    db: &Pool<Sqlite>,
    organization_id: &str,
) -> Result<LibraryBoundaryConfig> {
    let row: Option<(bool, String, f64, Option<i64>)> = sqlx::query_as(
        r#"
        SELECT library_enabled, library_action, library_premium_multiplier, library_premium_fixed_cents
        FROM organizations WHERE id = ?
        "#,
    )
    .bind(organization_id)
    .fetch_optional(db)
    .await?;

    Ok(match row {
        Some((enabled, action, premium_multiplier, premium_fixed_cents)) => LibraryBoundaryConfig {
            enabled,
            action: RuleAction::from_db(&action),
            premium_multiplier,
            premium_fixed_cents,
        },
        None => LibraryBoundaryConfig::default(),
    })
}

/// Store library-boundary config on the organization row, creating the
/// organization if needed.
pub async fn set_library_settings(
    db: &Pool<Sqlite>,
    organization_id: &str,
    config: &LibraryBoundaryConfig,
) -> Result<()> {
    if config.premium_multiplier < 0.0 {
        return Err(Error::BadRequest(
            "premium_multiplier must not be negative".to_string(),
        ));
    }

    ensure_organization(db, organization_id).await?;

    sqlx::query(
        r#"
        UPDATE organizations SET
            library_enabled = ?,
            library_action = ?,
            library_premium_multiplier = ?,
            library_premium_fixed_cents = ?
        WHERE id = ?
        "#,
    )
    .bind(config.enabled)
    .bind(config.action.as_db())
    .bind(config.premium_multiplier)
    .bind(config.premium_fixed_cents)
    .bind(organization_id)
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
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        spinreq_common::db::init::create_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn blacklist_round_trip_normalizes_on_write() {
        let db = setup_test_db().await;

        let id = add_blacklist_entry(&db, "org-1", "  Wonderwall! ", "OASIS", Some("no"))
            .await
            .unwrap();

        let rows = list_blacklist(&db, "org-1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].normalized_title, "wonderwall");
        assert_eq!(rows[0].normalized_artist, "oasis");

        delete_blacklist_entry(&db, "org-1", &id).await.unwrap();
        assert!(list_blacklist(&db, "org-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_entry_is_not_found() {
        let db = setup_test_db().await;
        let err = delete_blacklist_entry(&db, "org-1", "nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_configs_load_as_disabled_defaults() {
        let db = setup_test_db().await;

        let dup = get_duplicate_rules(&db, "org-1").await.unwrap();
        assert!(!dup.enabled);
        assert_eq!(dup.action, RuleAction::Allow);

        let lib = get_library_settings(&db, "org-1").await.unwrap();
        assert!(!lib.enabled);
    }

    #[tokio::test]
    async fn duplicate_rules_upsert_round_trip() {
        let db = setup_test_db().await;

        let config = DuplicateDetectionConfig {
            enabled: true,
            action: RuleAction::PremiumPrice,
            time_window_minutes: 45,
            premium_multiplier: 1.5,
            premium_fixed_cents: None,
            match_by_exact_title: true,
            match_by_exact_artist: false,
            match_case_sensitive: false,
        };
        set_duplicate_rules(&db, "org-1", &config).await.unwrap();

        let loaded = get_duplicate_rules(&db, "org-1").await.unwrap();
        assert!(loaded.enabled);
        assert_eq!(loaded.action, RuleAction::PremiumPrice);
        assert_eq!(loaded.time_window_minutes, 45);
        assert!(!loaded.match_by_exact_artist);

        // Second write updates in place
        let mut updated = config.clone();
        updated.time_window_minutes = 90;
        set_duplicate_rules(&db, "org-1", &updated).await.unwrap();
        let loaded = get_duplicate_rules(&db, "org-1").await.unwrap();
        assert_eq!(loaded.time_window_minutes, 90);
    }

    #[tokio::test]
    async fn library_settings_round_trip() {
        let db = setup_test_db().await;

        let config = LibraryBoundaryConfig {
            enabled: true,
            action: RuleAction::Deny,
            premium_multiplier: 2.0,
            premium_fixed_cents: Some(1500),
        };
        set_library_settings(&db, "org-1", &config).await.unwrap();

        let loaded = get_library_settings(&db, "org-1").await.unwrap();
        assert!(loaded.enabled);
        assert_eq!(loaded.action, RuleAction::Deny);
        assert_eq!(loaded.premium_fixed_cents, Some(1500));
    }

    #[tokio::test]
    async fn snapshot_assembles_all_collections() {
        let db = setup_test_db().await;

        add_blacklist_entry(&db, "org-1", "Bad Song", "Bad Artist", None)
            .await
            .unwrap();
        add_library_entry(&db, "org-1", "Good Song", "Good Artist", Some("house"), Some(124), None, None)
            .await
            .unwrap();
        add_pricing_rule(&db, "org-1", "Pricey Song", "Some Artist", 5000, true, true, None)
            .await
            .unwrap();

        // Another org's rules must not leak in
        add_blacklist_entry(&db, "org-2", "Other Song", "Other Artist", None)
            .await
            .unwrap();

        let snapshot = load_snapshot(&db, "org-1", chrono::Utc::now()).await.unwrap();
        assert_eq!(snapshot.blacklist.len(), 1);
        assert_eq!(snapshot.library.len(), 1);
        assert_eq!(snapshot.pricing_overrides.len(), 1);
        assert!(snapshot.recent_accepted.is_empty());
        assert!(!snapshot.duplicate_config.enabled);
    }

    #[tokio::test]
    async fn rejects_invalid_pricing_rule() {
        let db = setup_test_db().await;
        let err = add_pricing_rule(&db, "org-1", "Song", "Artist", -2, true, true, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}
