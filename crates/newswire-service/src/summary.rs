//! Day summaries: an LLM digest of the last 24 hours of articles.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use newswire_cache::keys;
use newswire_core::{defaults, slugify, Article, Error, Result};

use crate::reads::Cached;
use crate::service::NewsService;

const SYSTEM_PROMPT: &str = "You are a news editor. Summarize the following \
articles into a concise briefing that answers the reader's question. Group \
related stories, lead with the most important developments, and do not \
invent facts that are not in the articles.";

/// One article rendered for the summary prompt: headline plus the first
/// non-empty body field, capped.
fn render_article(article: &Article) -> Option<String> {
    let headline = article.headline.as_deref().map(str::trim).unwrap_or("");
    let body = [&article.summary, &article.description, &article.content]
        .into_iter()
        .filter_map(|f| f.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("");

    if headline.is_empty() && body.is_empty() {
        return None;
    }

    let snippet: String = body.chars().take(defaults::DAY_SUMMARY_SNIPPET_LEN).collect();
    Some(format!("## {headline}\n{snippet}"))
}

impl NewsService {
    /// Summarize the last 24 hours of articles against a reader query.
    ///
    /// Cached per query, organization, and clock hour; the hour bucket in
    /// the key retires stale summaries without explicit invalidation.
    pub async fn day_summary(
        &self,
        query: &str,
        organization_slug: Option<&str>,
    ) -> Result<Cached<String>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("empty summary query".to_string()));
        }

        let normalized_slug = organization_slug.map(slugify);
        let organization_id = match &normalized_slug {
            Some(slug) => Some(
                self.resolve_organization_by_slug(slug)
                    .await?
                    .ok_or_else(|| {
                        Error::OrganizationNotFound(
                            organization_slug.unwrap_or_default().to_string(),
                        )
                    })?
                    .id,
            ),
            None => None,
        };

        let hour_bucket = Utc::now().format("%Y-%m-%dT%H").to_string();
        let key = keys::day_summary_key(query, normalized_slug.as_deref(), &hour_bucket);
        if let Some(cached) = self.cache.get_json::<String>(&key).await {
            return Ok(Cached {
                value: cached,
                outcome: newswire_cache::CacheOutcome::Hit,
            });
        }

        let cutoff = Utc::now() - chrono::Duration::hours(defaults::DAY_SUMMARY_WINDOW_HOURS);
        // Unfiltered summaries cap the window to the newest N; a single
        // organization's day is small enough to take whole.
        let limit = if organization_id.is_none() {
            Some(defaults::DAY_SUMMARY_LIMIT)
        } else {
            None
        };
        let articles = self
            .articles
            .published_since(cutoff, organization_id, limit)
            .await?;

        if articles.is_empty() {
            return Err(Error::NotFound(
                "no articles published in the last 24 hours".to_string(),
            ));
        }

        let rendered: Vec<String> = articles.iter().filter_map(render_article).collect();
        let prompt = format!(
            "Reader question: {query}\n\nArticles:\n\n{}",
            rendered.join("\n\n")
        );

        debug!(
            subsystem = "service",
            component = "summary",
            item_count = articles.len(),
            "Generating day summary"
        );
        let summary = self.generator.generate_with_system(SYSTEM_PROMPT, &prompt).await?;

        self.cache
            .set_json(
                &key,
                &summary,
                Duration::from_secs(defaults::CACHE_TTL_DAY_SUMMARY_SECS),
            )
            .await;
        Ok(Cached {
            value: summary,
            outcome: newswire_cache::CacheOutcome::Miss,
        })
    }
}
