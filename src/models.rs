//! Core data types flowing through the resolution pipeline.

use serde::Serialize;

/// One archive-index result row: a historical capture of a video page.
///
/// Constructed only by parsing a CDX response; immutable; discarded after
/// one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    /// The video page URL as archived.
    pub original_url: String,
    /// Capture time, an opaque fixed-format CDX timestamp (e.g. `20190815023412`).
    pub timestamp: String,
    /// Content hash; the index collapses byte-identical captures by this,
    /// so no two records in one result set share a digest.
    pub digest: String,
}

impl SnapshotRecord {
    /// The stable Wayback serving URL for this capture:
    /// `{base}/{timestamp}/{original_url}`.
    pub fn retrieval_url(&self, wayback_base: &str) -> String {
        format!(
            "{}/{}/{}",
            wayback_base.trim_end_matches('/'),
            self.timestamp,
            self.original_url
        )
    }
}

/// Outcome of one resolution call. Always returned to the caller — a failed
/// index query is a representable result, not a stray error.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// A snapshot yielded a title.
    Found {
        /// Normalized title.
        title: String,
        /// Identifier of the extraction rule that matched.
        rule: String,
        /// Capture timestamp of the snapshot the title came from.
        timestamp: String,
        /// Wayback URL the title was extracted from.
        url: String,
    },
    /// No candidates existed, or none yielded a title.
    NotFound,
    /// The index query itself could not be completed.
    Failed { error: String },
}
