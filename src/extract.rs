//! Title extraction from snapshot HTML.
//!
//! An ordered list of regex rules is applied to the raw page text; the first
//! rule producing a non-empty match wins and later rules are never consulted.
//! Rules run from most-structured metadata (og:title) down to the loosest
//! heading heuristic. Pure text processing, no I/O.

use std::sync::LazyLock;

use regex::Regex;

/// Site suffix stripped from the end of a normalized title.
const SITE_SUFFIX: &str = "- YouTube";

struct ExtractionRule {
    /// Stable identifier reported back in the resolution result.
    name: &'static str,
    pattern: Regex,
}

static RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    let rule = |name, pattern: &str| ExtractionRule {
        name,
        pattern: Regex::new(pattern).expect("extraction rule regex must compile"),
    };
    vec![
        rule("og:title", r#"(?i)<meta\s+property="og:title"\s+content="([^"]+)""#),
        rule("meta-title", r#"(?i)<meta\s+name="title"\s+content="([^"]+)""#),
        rule("title-tag", r"(?i)<title[^>]*>([^<]+)</title>"),
        rule("h1", r"(?i)<h1[^>]*>([^<]+)</h1>"),
        rule("h1-title-class", r#"(?i)<h1 class="[^"]*title[^"]*"[^>]*>([^<]+)</h1>"#),
    ]
});

/// A successfully extracted title and the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub rule: &'static str,
}

/// Collapse whitespace runs to single spaces, trim, and strip a trailing
/// `- YouTube` site suffix.
pub fn normalize_title(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.strip_suffix(SITE_SUFFIX) {
        Some(stripped) => stripped.trim_end().to_string(),
        None => collapsed,
    }
}

/// Apply the extraction rules in priority order against page content.
///
/// Returns `None` if no rule yields a title that survives normalization.
pub fn extract_title(content: &str) -> Option<Extracted> {
    for rule in RULES.iter() {
        let Some(captures) = rule.pattern.captures(content) else {
            continue;
        };
        let Some(raw) = captures.get(1) else {
            continue;
        };
        let title = normalize_title(raw.as_str());
        if title.is_empty() {
            continue;
        }
        tracing::debug!(rule = rule.name, %title, "extracted title");
        return Some(Extracted {
            title,
            rule: rule.name,
        });
    }
    None
}
