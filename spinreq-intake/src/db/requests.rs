//! Accepted-request persistence
//!
//! The intake flow records every accepted request here; this table is the
//! prior-request set duplicate detection scans. Recording the decision and
//! the request is a single row write, so the set stays accurate for
//! subsequent evaluations.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::error::Result;
use crate::policy::{AcceptedRequest, RequestCandidate};
use spinreq_common::db::models::CrowdRequestRow;
use spinreq_common::normalize_track_string;

/// Persist an accepted request together with its final price.
/// Returns the new request id.
pub async fn record_accepted(
    db: &Pool<Sqlite>,
    candidate: &RequestCandidate,
    final_price_cents: i64,
) -> Result<String> {
    super::rules::ensure_organization(db, &candidate.organization_id).await?;

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO crowd_requests
            (id, organization_id, song_title, song_artist, normalized_title, normalized_artist,
             is_fast_track, base_price_cents, final_price_cents, accepted_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&candidate.organization_id)
    .bind(&candidate.song_title)
    .bind(&candidate.song_artist)
    .bind(normalize_track_string(&candidate.song_title))
    .bind(normalize_track_string(&candidate.song_artist))
    .bind(candidate.is_fast_track)
    .bind(candidate.base_price_cents)
    .bind(final_price_cents)
    .bind(candidate.submitted_at)
    .execute(db)
    .await?;

    Ok(id)
}

/// Fetch accepted requests for an organization since the given instant,
/// newest first. Feeds duplicate detection; the evaluator re-applies the
/// exact window bounds itself.
pub async fn recent_accepted(
    db: &Pool<Sqlite>,
    organization_id: &str,
    since: DateTime<Utc>,
) -> Result<Vec<AcceptedRequest>> {
    let rows: Vec<CrowdRequestRow> = sqlx::query_as(
        r#"
        SELECT * FROM crowd_requests
        WHERE organization_id = ? AND accepted_at >= ?
        ORDER BY accepted_at DESC
        "#,
    )
    .bind(organization_id)
    .bind(since)
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| AcceptedRequest {
            song_title: row.song_title,
            song_artist: row.song_artist,
            accepted_at: row.accepted_at,
        })
        .collect())
}
