//! Content-addressed cache key layout.
//!
//! The persisted layout is part of the system's compatibility surface and
//! must not change:
//!
//! ```text
//! organizations:slug:{slug}
//! articles:newest:{sha256}      registry: articles:newest:keys
//! articles:search:{sha256}      registry: articles:search:keys
//! articles:similar:{sha256}     registry: articles:similar:keys
//! articles:day-summary:{sha256}
//! ```

use sha2::{Digest, Sha256};

use newswire_core::slugify;

/// Sentinel stored for negative organization-slug lookups. A fixed literal
/// distinct from any valid JSON payload.
pub const NULL_SENTINEL: &str = "__null__";

/// Parameterized cache key families that carry a registry of written keys
/// for bulk invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Newest,
    Search,
    Similar,
}

impl Family {
    /// All families invalidated by an article mutation.
    pub const ALL: [Family; 3] = [Family::Newest, Family::Search, Family::Similar];

    pub fn prefix(self) -> &'static str {
        match self {
            Family::Newest => "articles:newest:",
            Family::Search => "articles:search:",
            Family::Similar => "articles:similar:",
        }
    }

    /// The set key recording every key written under this family.
    pub fn registry(self) -> &'static str {
        match self {
            Family::Newest => "articles:newest:keys",
            Family::Search => "articles:search:keys",
            Family::Similar => "articles:similar:keys",
        }
    }
}

fn hash(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest)
}

/// Key for a cached organization-by-slug lookup (positive or sentinel).
pub fn organization_slug_key(normalized_slug: &str) -> String {
    format!("organizations:slug:{normalized_slug}")
}

/// Key for a newest-articles read; the empty parameter set is the
/// no-filter variant.
pub fn newest_key(organization: Option<&str>) -> String {
    let normalized = organization
        .map(|o| o.trim().to_lowercase())
        .unwrap_or_default();
    format!("{}{}", Family::Newest.prefix(), hash(&normalized))
}

/// Key for a search read: lowercased term plus normalized organization slug.
pub fn search_key(term: &str, organization_slug: Option<&str>) -> String {
    let normalized_slug = organization_slug.map(slugify).unwrap_or_default();
    let material = format!("{}|{}", term.trim().to_lowercase(), normalized_slug);
    format!("{}{}", Family::Search.prefix(), hash(&material))
}

/// Key for a similar-articles read, addressed by the source article link.
pub fn similar_key(link: &str) -> String {
    format!("{}{}", Family::Similar.prefix(), hash(&link.trim().to_lowercase()))
}

/// Key for a day-summary read. The hour bucket keeps entries from outliving
/// their look-back window even under constant traffic.
pub fn day_summary_key(query: &str, organization_slug: Option<&str>, hour_bucket: &str) -> String {
    let normalized_slug = organization_slug.map(slugify).unwrap_or_default();
    let material = format!(
        "{}|{}|{}",
        query.trim().to_lowercase(),
        normalized_slug,
        hour_bucket
    );
    format!("articles:day-summary:{}", hash(&material))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_layout_is_stable() {
        assert_eq!(Family::Newest.prefix(), "articles:newest:");
        assert_eq!(Family::Newest.registry(), "articles:newest:keys");
        assert_eq!(Family::Search.registry(), "articles:search:keys");
        assert_eq!(Family::Similar.registry(), "articles:similar:keys");
    }

    #[test]
    fn test_newest_key_normalizes_organization() {
        assert_eq!(newest_key(Some("  The Verge ")), newest_key(Some("the verge")));
        assert_ne!(newest_key(None), newest_key(Some("the verge")));
    }

    #[test]
    fn test_newest_key_none_matches_empty_filter() {
        assert_eq!(newest_key(None), newest_key(Some("   ")));
    }

    #[test]
    fn test_search_key_depends_on_term_and_slug() {
        let base = search_key("Climate Report", None);
        assert_eq!(base, search_key("climate report", None));
        assert_ne!(base, search_key("climate report", Some("The Verge")));
        assert_eq!(
            search_key("x", Some("The Verge")),
            search_key("x", Some("the-verge"))
        );
    }

    #[test]
    fn test_similar_key_case_insensitive_on_link() {
        assert_eq!(
            similar_key("https://Example.com/A"),
            similar_key("https://example.com/a")
        );
    }

    #[test]
    fn test_day_summary_key_varies_with_hour_bucket() {
        let a = day_summary_key("top stories", None, "2026083009");
        let b = day_summary_key("top stories", None, "2026083010");
        assert_ne!(a, b);
    }

    #[test]
    fn test_keys_are_prefixed_hex() {
        let key = search_key("query", None);
        let digest = key.strip_prefix("articles:search:").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sentinel_is_not_valid_json() {
        assert!(serde_json::from_str::<serde_json::Value>(NULL_SENTINEL).is_err());
    }
}
