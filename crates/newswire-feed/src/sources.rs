//! Feed source resolution: maps a feed list to its owning organization.
//!
//! A source is a plain-text file of feed URLs, one per line. The owning
//! organization is resolved from the file name for known publishers, and
//! otherwise derived from the host of the first feed URL. A source that
//! resolves to neither is skipped by the ingestion pipeline.

use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use newswire_core::{Result, SourceDefinition};

/// Known publisher keywords matched against the feed-list identifier.
const KNOWN_PUBLISHERS: &[(&str, &str, &str)] = &[
    ("economist", "The Economist", "https://www.economist.com/"),
    ("theverge", "The Verge", "https://www.theverge.com/"),
    ("zeit", "DIE ZEIT", "https://www.zeit.de/"),
];

/// Resolve the organization definition for a feed list.
///
/// `list_name` is the source identifier (file stem or tag). Known publisher
/// keywords win; otherwise the host of the first absolute feed URL names the
/// organization. `None` means the source cannot be attributed and should be
/// skipped with a warning, not treated as an error.
pub fn resolve_source(list_name: &str, feed_urls: &[String]) -> Option<SourceDefinition> {
    let normalized = list_name.to_lowercase();

    for (keyword, name, url) in KNOWN_PUBLISHERS {
        if normalized.contains(keyword) {
            return Some(SourceDefinition {
                name: (*name).to_string(),
                url: (*url).to_string(),
            });
        }
    }

    feed_urls
        .iter()
        .find_map(|candidate| Url::parse(candidate).ok())
        .and_then(|url| {
            let host = url.host_str()?.to_string();
            let origin = format!("{}://{}/", url.scheme(), host);
            Some(SourceDefinition {
                name: host,
                url: origin,
            })
        })
}

/// A feed list on disk: its identifier and resolved path.
#[derive(Debug, Clone)]
pub struct FeedList {
    /// Source identifier: the file stem.
    pub name: String,
    pub path: PathBuf,
}

impl FeedList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    /// Read the feed URLs from this list: one per line, trimmed, blank
    /// lines and `#` comments ignored.
    pub async fn read_urls(&self) -> Result<Vec<String>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let urls: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();

        debug!(
            subsystem = "feed",
            component = "sources",
            source = %self.name,
            item_count = urls.len(),
            "Read feed list"
        );
        Ok(urls)
    }
}

/// Resolve the configured set of feed lists.
///
/// `NEWSWIRE_FEED_LISTS` is a comma-separated list of paths; when unset, the
/// default corpus lists under `root` are used.
pub fn feed_lists_from_env(root: &Path) -> Vec<FeedList> {
    if let Ok(configured) = std::env::var("NEWSWIRE_FEED_LISTS") {
        let lists: Vec<FeedList> = configured
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                let path = Path::new(p);
                if path.is_absolute() {
                    FeedList::new(path)
                } else {
                    FeedList::new(root.join(path))
                }
            })
            .collect();
        if !lists.is_empty() {
            return lists;
        }
    }

    [
        "economist.txt",
        "theverge.txt",
        "arstechnica.txt",
        "zeit.txt",
        "semafor.txt",
        "dw.txt",
    ]
    .iter()
    .map(|file| FeedList::new(root.join("corpus").join(file)))
    .collect()
}
