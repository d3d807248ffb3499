//! Feed ingestion pipeline.
//!
//! Walks the configured feed lists, resolves each list to its owning
//! organization, and pulls every feed URL in turn. A fetch or parse failure
//! only skips that one feed; the rest of the run continues.
//!
//! Dedup stops early: feed items are scanned in document order and the scan
//! aborts at the first link already in the store. Feeds are assumed
//! newest-first, so everything after a known link has been seen in a prior
//! run. A feed that violates that ordering loses later new items until they
//! resurface at the top.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use newswire_core::{
    ArticleRepository, CreateArticleRequest, CreateOrganizationRequest, IngestionReport,
    OrganizationRepository, Result,
};
use newswire_feed::{parse_feed, resolve_source, FeedFetcher, FeedList};

use crate::cancel::Cancel;

/// The ingestion job: feed lists in, new articles out.
pub struct IngestionJob {
    organizations: Arc<dyn OrganizationRepository>,
    articles: Arc<dyn ArticleRepository>,
    fetcher: FeedFetcher,
    lists: Vec<FeedList>,
}

impl IngestionJob {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        articles: Arc<dyn ArticleRepository>,
        lists: Vec<FeedList>,
    ) -> Result<Self> {
        Ok(Self {
            organizations,
            articles,
            fetcher: FeedFetcher::new()?,
            lists,
        })
    }

    /// Replace the default fetcher (shorter timeouts in tests).
    pub fn with_fetcher(mut self, fetcher: FeedFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Run one full ingestion pass over every configured feed list.
    ///
    /// Individual feed failures are logged and counted, never propagated;
    /// the returned report summarizes the whole run. The cancellation
    /// signal is polled before every feed; work past a fired signal stays
    /// for the next run.
    pub async fn run(&self, cancel: &Cancel) -> Result<IngestionReport> {
        let started = Instant::now();
        let mut report = IngestionReport::default();

        for list in &self.lists {
            if cancel.is_cancelled() {
                info!(
                    subsystem = "jobs",
                    component = "ingestion",
                    "Shutdown requested, stopping ingestion run"
                );
                break;
            }
            self.run_list(list, cancel, &mut report).await;
        }

        info!(
            subsystem = "jobs",
            component = "ingestion",
            duration_ms = started.elapsed().as_millis() as u64,
            sources = report.sources,
            feeds_ok = report.feeds_ok,
            feeds_failed = report.feeds_failed,
            inserted_count = report.inserted,
            "Ingestion run finished"
        );
        Ok(report)
    }

    async fn run_list(&self, list: &FeedList, cancel: &Cancel, report: &mut IngestionReport) {
        let urls = match list.read_urls().await {
            Ok(urls) => urls,
            Err(e) => {
                warn!(
                    subsystem = "jobs",
                    component = "ingestion",
                    source = %list.name,
                    error = %e,
                    "Failed to read feed list, skipping source"
                );
                return;
            }
        };

        let Some(source) = resolve_source(&list.name, &urls) else {
            warn!(
                subsystem = "jobs",
                component = "ingestion",
                source = %list.name,
                "No organization resolvable for source, skipping"
            );
            return;
        };

        let organization = match self
            .organizations
            .get_or_create(CreateOrganizationRequest {
                name: source.name.clone(),
                url: source.url.clone(),
            })
            .await
        {
            Ok(org) => org,
            Err(e) => {
                warn!(
                    subsystem = "jobs",
                    component = "ingestion",
                    source = %list.name,
                    organization = %source.name,
                    error = %e,
                    "Failed to resolve organization row, skipping source"
                );
                return;
            }
        };

        report.sources += 1;

        for url in &urls {
            if cancel.is_cancelled() {
                info!(
                    subsystem = "jobs",
                    component = "ingestion",
                    source = %list.name,
                    "Shutdown requested, leaving remaining feeds for the next run"
                );
                return;
            }
            match self.ingest_feed(url, organization.id).await {
                Ok(inserted) => {
                    report.feeds_ok += 1;
                    report.inserted += inserted;
                }
                Err(e) if e.is_feed_recoverable() => {
                    report.feeds_failed += 1;
                    warn!(
                        subsystem = "jobs",
                        component = "ingestion",
                        feed_url = %url,
                        error = %e,
                        "Feed ingestion failed"
                    );
                }
                Err(e) => {
                    // Persistence failure. The remaining feeds of this
                    // source wait for the next scheduled run.
                    report.feeds_failed += 1;
                    error!(
                        subsystem = "jobs",
                        component = "ingestion",
                        source = %list.name,
                        feed_url = %url,
                        error = %e,
                        "Persistence failure, abandoning source until next run"
                    );
                    return;
                }
            }
        }
    }

    /// Ingest one feed: fetch, parse, early-stop dedup, bulk insert.
    /// Returns the number of newly inserted articles.
    async fn ingest_feed(&self, url: &str, organization_id: Uuid) -> Result<usize> {
        let body = self.fetcher.fetch(url).await?;
        let items = parse_feed(&body)?;

        if items.is_empty() {
            debug!(
                subsystem = "jobs",
                component = "ingestion",
                feed_url = %url,
                "Feed contained no items"
            );
            return Ok(0);
        }

        let mut queued = Vec::new();
        for item in items {
            if self.articles.exists_by_link(&item.link).await? {
                // Newest-first feed: everything below this item is older
                // than the last successful run.
                break;
            }
            queued.push(CreateArticleRequest {
                link: item.link,
                organization_id: Some(organization_id),
                headline: item.headline,
                description: item.description,
                summary: item.summary,
                content: None,
                publication_date: item.publication_date,
            });
        }

        if queued.is_empty() {
            return Ok(0);
        }

        let inserted = self.articles.insert_bulk(queued).await?;
        if inserted > 0 {
            info!(
                subsystem = "jobs",
                component = "ingestion",
                feed_url = %url,
                inserted_count = inserted,
                "Inserted new articles"
            );
        }
        Ok(inserted)
    }
}
