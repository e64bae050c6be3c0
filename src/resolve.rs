//! Resolution orchestrator: index query → candidate trial → first title wins.
//!
//! One [`resolve`] call runs one video ID through the whole pipeline.
//! Candidates are tried strictly sequentially, newest capture first, so the
//! first success short-circuits the remaining outbound requests. A failure
//! on one candidate never aborts the resolution; only a failure of the index
//! query itself (the one step with no fallback) is fatal, and even that is
//! returned as a [`Resolution::Failed`] value rather than an error.

use crate::cdx;
use crate::config::Config;
use crate::extract;
use crate::fetch::{fetch_with_retry, Transport};
use crate::models::Resolution;

/// Resolve one video ID to a historical title.
pub async fn resolve(transport: &dyn Transport, config: &Config, video_id: &str) -> Resolution {
    let policy = config.retry.policy();

    let candidates =
        match cdx::query_index(transport, &config.archive, &policy, video_id).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(video_id, error = %e, "index query failed");
                return Resolution::Failed {
                    error: e.to_string(),
                };
            }
        };

    if candidates.is_empty() {
        tracing::info!(video_id, "no snapshots found");
        return Resolution::NotFound;
    }

    for candidate in &candidates {
        let url = candidate.retrieval_url(&config.archive.wayback_api);

        let html = match fetch_with_retry(transport, &url, &policy).await {
            Ok(html) => html,
            Err(e) => {
                // This candidate yielded nothing; move on to the next.
                tracing::warn!(video_id, url, error = %e, "snapshot fetch failed");
                continue;
            }
        };

        if let Some(found) = extract::extract_title(&html) {
            tracing::info!(video_id, title = %found.title, rule = found.rule, "title resolved");
            return Resolution::Found {
                title: found.title,
                rule: found.rule.to_string(),
                timestamp: candidate.timestamp.clone(),
                url,
            };
        }

        tracing::debug!(video_id, url, "no title in snapshot");
    }

    tracing::info!(video_id, "no title found in any snapshot");
    Resolution::NotFound
}
