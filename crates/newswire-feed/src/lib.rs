//! # newswire-feed
//!
//! Feed-side building blocks for the ingestion pipeline:
//!
//! - `parser`: RSS/Atom XML → normalized `FeedItem`s
//! - `sources`: feed-list files and feed-to-organization resolution
//! - `fetcher`: bounded-timeout HTTP fetching with a fixed user agent

pub mod fetcher;
pub mod parser;
pub mod sources;

pub use fetcher::FeedFetcher;
pub use parser::parse_feed;
pub use sources::{feed_lists_from_env, resolve_source, FeedList};
