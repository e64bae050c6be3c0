//! Wayback Machine CDX index queries.
//!
//! Builds the CDX lookup URL for a video's watch page, issues it through the
//! resilient fetcher, and parses the tabular JSON response into ranked
//! [`SnapshotRecord`]s. The query shape is fixed by design:
//!
//! - `output=json` — rows as JSON arrays, first row is the field header
//! - `fl=original,timestamp,mimetype,statuscode,digest`
//! - `filter=statuscode:200`, `filter=mimetype:text/html` — successful HTML
//!   captures only
//! - `collapse=digest` — byte-identical captures deduplicated index-side
//! - `limit=5` (configurable) — newest captures only

use std::time::Duration;

use thiserror::Error;

use crate::config::ArchiveConfig;
use crate::fetch::{fetch_with_retry, RetryPolicy, Transport};
use crate::models::SnapshotRecord;

/// Fixed self-throttle before every index query. Not a correctness
/// requirement, just politeness toward the archive.
const PRE_QUERY_PAUSE: Duration = Duration::from_millis(500);

/// CDX field selection, in row order.
const CDX_FIELDS: &str = "original,timestamp,mimetype,statuscode,digest";

/// The index query could not be completed (fetcher retries already
/// exhausted, or the response was not valid CDX JSON).
#[derive(Debug, Error)]
#[error("CDX query failed for video {video_id}: {reason}")]
pub struct IndexError {
    pub video_id: String,
    pub reason: String,
}

/// Canonical watch-page URL for a video ID.
pub fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Pull a video ID out of CLI input: a bare ID is passed through, a
/// `watch?v=` or `youtu.be/` URL has the ID extracted.
pub fn parse_video_id(input: &str) -> Option<String> {
    if !input.contains('/') && !input.contains('?') {
        return Some(input.to_string());
    }
    if let Some(rest) = input.split("watch?v=").nth(1) {
        let id = rest.split(&['&', '#'][..]).next()?;
        return (!id.is_empty()).then(|| id.to_string());
    }
    if let Some(rest) = input.split("youtu.be/").nth(1) {
        let id = rest.split(&['?', '&', '#'][..]).next()?;
        return (!id.is_empty()).then(|| id.to_string());
    }
    None
}

/// Build the full CDX lookup URL for one video.
pub fn build_query_url(archive: &ArchiveConfig, video_id: &str) -> anyhow::Result<String> {
    let url = reqwest::Url::parse_with_params(
        &archive.cdx_api,
        [
            ("url", video_url(video_id).as_str()),
            ("output", "json"),
            ("fl", CDX_FIELDS),
            ("filter", "statuscode:200"),
            ("filter", "mimetype:text/html"),
            ("collapse", "digest"),
            ("limit", archive.snapshot_limit.to_string().as_str()),
        ],
    )?;
    Ok(url.into())
}

/// Parse a CDX JSON response body into snapshot records.
///
/// The first row is the field-name header and is discarded. Fewer than two
/// rows means no captures exist — an empty result, not an error. Data rows
/// with an unexpected field count are skipped.
pub fn parse_response(body: &str) -> anyhow::Result<Vec<SnapshotRecord>> {
    let rows: Vec<Vec<String>> = serde_json::from_str(body)?;
    if rows.len() < 2 {
        return Ok(Vec::new());
    }

    let mut records = Vec::with_capacity(rows.len() - 1);
    for row in &rows[1..] {
        if row.len() != 5 {
            tracing::warn!(fields = row.len(), "skipping malformed CDX row");
            continue;
        }
        records.push(SnapshotRecord {
            original_url: row[0].clone(),
            timestamp: row[1].clone(),
            digest: row[4].clone(),
        });
    }
    Ok(records)
}

/// Query the CDX index for a video's capture history.
///
/// Returns candidates in the order the index serves them (newest first).
/// Retries happened inside the fetch; a failure here is final.
pub async fn query_index(
    transport: &dyn Transport,
    archive: &ArchiveConfig,
    policy: &RetryPolicy,
    video_id: &str,
) -> Result<Vec<SnapshotRecord>, IndexError> {
    let url = build_query_url(archive, video_id).map_err(|e| IndexError {
        video_id: video_id.to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!(video_id, "querying CDX index");
    tokio::time::sleep(PRE_QUERY_PAUSE).await;

    let body = fetch_with_retry(transport, &url, policy)
        .await
        .map_err(|e| IndexError {
            video_id: video_id.to_string(),
            reason: e.to_string(),
        })?;

    let records = parse_response(&body).map_err(|e| IndexError {
        video_id: video_id.to_string(),
        reason: format!("invalid CDX response: {}", e),
    })?;

    tracing::debug!(video_id, candidates = records.len(), "CDX query complete");
    Ok(records)
}
