//! Feed document parser: normalizes RSS and Atom XML into `FeedItem`s.
//!
//! RSS `item` and Atom `entry` containers are treated synonymously and
//! matched by local name, so namespaced feeds parse the same as plain ones.
//! Items without a resolvable absolute link are dropped; every other field
//! is optional.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use roxmltree::{Document, Node};
use tracing::trace;
use url::Url;

use newswire_core::{Error, FeedItem, Result};

/// Parse a raw feed document into normalized items, in document order.
///
/// Malformed XML is a `Parse` error; a well-formed document with no item
/// containers yields an empty vector.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let doc = Document::parse(xml).map_err(|e| Error::Parse(e.to_string()))?;

    let items: Vec<FeedItem> = doc
        .descendants()
        .filter(|n| {
            n.is_element() && matches!(n.tag_name().name(), "item" | "entry")
        })
        .filter_map(extract_item)
        .collect();

    Ok(items)
}

fn extract_item(container: Node) -> Option<FeedItem> {
    let link = match extract_link(container) {
        Some(link) => link,
        None => {
            trace!(subsystem = "feed", component = "parser", "Dropping item without resolvable link");
            return None;
        }
    };

    Some(FeedItem {
        link,
        headline: child_text(container, "title"),
        description: child_text(container, "description"),
        summary: child_text(container, "summary"),
        publication_date: extract_publication_date(container),
    })
}

/// Resolve an item's link: text of a `link` child, else the `href`
/// attribute of a link-typed child (Atom), else the `guid` field. The value
/// must parse as an absolute URL.
fn extract_link(container: Node) -> Option<String> {
    let mut value = child_text(container, "link");

    if value.is_none() {
        value = container
            .children()
            .find(|c| c.is_element() && c.tag_name().name().eq_ignore_ascii_case("link"))
            .and_then(|c| c.attribute("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty());
    }

    if value.is_none() {
        value = child_text(container, "guid");
    }

    let candidate = value?;
    Url::parse(&candidate).ok().map(|url| url.to_string())
}

/// First child element matching `name` case-insensitively by local name,
/// with non-empty trimmed text.
fn child_text(container: Node, name: &str) -> Option<String> {
    container
        .children()
        .find(|c| c.is_element() && c.tag_name().name().eq_ignore_ascii_case(name))
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Publication date candidates in priority order: RSS `pubDate`, Atom
/// `published`, Atom `updated`, generic `date`. The first one that parses
/// leniently wins.
fn extract_publication_date(container: Node) -> Option<DateTime<Utc>> {
    ["pubDate", "published", "updated", "date"]
        .iter()
        .filter_map(|field| child_text(container, field))
        .find_map(|value| parse_date_lenient(&value))
}

/// Lenient date-time parsing: RFC 2822 (RSS), RFC 3339 (Atom), then naive
/// date-times with a missing timezone assumed to be UTC.
fn parse_date_lenient(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <rss version="2.0">
          <channel>
            <title>Example</title>
            <item>
              <title>First story</title>
              <link>https://example.com/first</link>
              <description>First description</description>
              <pubDate>Tue, 10 Feb 2026 08:49:37 GMT</pubDate>
            </item>
            <item>
              <title>Second story</title>
              <link>https://example.com/second</link>
            </item>
          </channel>
        </rss>"#;

    const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
        <feed xmlns="http://www.w3.org/2005/Atom">
          <title>Example Atom</title>
          <entry>
            <title>Atom story</title>
            <link href="https://example.com/atom-story" rel="alternate" type="text/html"/>
            <summary>Atom summary</summary>
            <published>2026-02-10T08:49:37Z</published>
          </entry>
        </feed>"#;

    #[test]
    fn test_parse_rss_items_in_document_order() {
        let items = parse_feed(RSS_FEED).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link, "https://example.com/first");
        assert_eq!(items[0].headline.as_deref(), Some("First story"));
        assert_eq!(items[0].description.as_deref(), Some("First description"));
        assert_eq!(items[1].link, "https://example.com/second");
        assert!(items[1].description.is_none());
    }

    #[test]
    fn test_parse_atom_entry_with_href_link() {
        let items = parse_feed(ATOM_FEED).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "https://example.com/atom-story");
        assert_eq!(items[0].summary.as_deref(), Some("Atom summary"));
        assert_eq!(
            items[0].publication_date,
            Some(Utc.with_ymd_and_hms(2026, 2, 10, 8, 49, 37).unwrap())
        );
    }

    #[test]
    fn test_rss_pub_date_parses_rfc2822() {
        let items = parse_feed(RSS_FEED).unwrap();
        assert_eq!(
            items[0].publication_date,
            Some(Utc.with_ymd_and_hms(2026, 2, 10, 8, 49, 37).unwrap())
        );
        assert!(items[1].publication_date.is_none());
    }

    #[test]
    fn test_guid_fallback_when_no_link() {
        let xml = r#"<rss><channel><item>
            <title>Guid only</title>
            <guid>https://example.com/guid-link</guid>
        </item></channel></rss>"#;
        let items = parse_feed(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "https://example.com/guid-link");
    }

    #[test]
    fn test_item_without_any_link_is_dropped() {
        let xml = r#"<rss><channel><item>
            <title>No link at all</title>
        </item></channel></rss>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_relative_link_is_dropped() {
        let xml = r#"<rss><channel><item>
            <title>Relative</title>
            <link>/relative/path</link>
        </item></channel></rss>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let err = parse_feed("<rss><channel><item>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_empty_document_yields_no_items() {
        let items = parse_feed("<rss><channel></channel></rss>").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_field_names_match_case_insensitively() {
        let xml = r#"<rss><channel><item>
            <TITLE>Upper</TITLE>
            <Link>https://example.com/upper</Link>
        </item></channel></rss>"#;
        let items = parse_feed(xml).unwrap();
        assert_eq!(items[0].headline.as_deref(), Some("Upper"));
    }

    #[test]
    fn test_date_fallback_order_updated_then_date() {
        let xml = r#"<feed><entry>
            <link href="https://example.com/e"/>
            <updated>2026-02-09T10:00:00Z</updated>
            <date>2020-01-01</date>
        </entry></feed>"#;
        let items = parse_feed(xml).unwrap();
        assert_eq!(
            items[0].publication_date,
            Some(Utc.with_ymd_and_hms(2026, 2, 9, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_naive_datetime_assumed_utc() {
        assert_eq!(
            parse_date_lenient("2026-02-10T08:49:37"),
            Some(Utc.with_ymd_and_hms(2026, 2, 10, 8, 49, 37).unwrap())
        );
        assert_eq!(
            parse_date_lenient("2026-02-10"),
            Some(Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap())
        );
        assert!(parse_date_lenient("next tuesday").is_none());
    }

    #[test]
    fn test_parse_is_restartable() {
        let first = parse_feed(RSS_FEED).unwrap();
        let second = parse_feed(RSS_FEED).unwrap();
        assert_eq!(first, second);
    }
}
