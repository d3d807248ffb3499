//! Service-level tests against in-memory repositories with the cache
//! disabled. Cache behavior itself is covered by `cache_behavior_test.rs`.

use std::sync::Arc;

use chrono::{Duration, Utc};

use newswire_cache::ReadCache;
use newswire_core::memory::MemoryStore;
use newswire_core::{
    ArticleRepository, CreateArticleRequest, CreateOrganizationRequest, Error,
    OrganizationRepository,
};
use newswire_inference::MockBackend;
use newswire_service::{CacheOutcome, NewsService};

fn service(store: &MemoryStore, backend: Arc<MockBackend>) -> NewsService {
    NewsService::new(
        Arc::new(store.organizations()),
        Arc::new(store.articles()),
        backend.clone(),
        backend,
        ReadCache::disabled(),
    )
}

fn article_request(link: &str, org: Option<uuid::Uuid>, hours_ago: i64) -> CreateArticleRequest {
    CreateArticleRequest {
        link: link.to_string(),
        organization_id: org,
        headline: Some(format!("Headline for {link}")),
        description: Some("Shared description".to_string()),
        summary: None,
        content: None,
        publication_date: Some(Utc::now() - Duration::hours(hours_ago)),
    }
}

#[tokio::test]
async fn test_newest_articles_caps_at_ten_newest_first() {
    let store = MemoryStore::new();
    let articles = store.articles();
    for i in 0..12 {
        articles
            .insert(article_request(&format!("https://news.test/{i}"), None, i))
            .await
            .unwrap();
    }

    let svc = service(&store, Arc::new(MockBackend::new(8)));
    let newest = svc.newest_articles(None).await.unwrap();

    assert_eq!(newest.outcome, CacheOutcome::Miss);
    assert_eq!(newest.value.len(), 10);
    assert_eq!(newest.value[0].link, "https://news.test/0");
    assert_eq!(newest.value[9].link, "https://news.test/9");
}

#[tokio::test]
async fn test_find_organization_by_slug_matches_recomputed_slug() {
    let store = MemoryStore::new();
    store
        .organizations()
        .insert(CreateOrganizationRequest {
            name: "The Verge".to_string(),
            url: "https://www.theverge.com/".to_string(),
        })
        .await
        .unwrap();

    let svc = service(&store, Arc::new(MockBackend::new(8)));

    let found = svc.find_organization_by_slug("the-verge").await.unwrap();
    assert_eq!(found.value.unwrap().name, "The Verge");

    let missing = svc.find_organization_by_slug("missing-org").await.unwrap();
    assert!(missing.value.is_none());

    assert!(matches!(
        svc.find_organization_by_slug("!!!").await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_search_scoped_by_slug_and_unknown_slug_errors() {
    let store = MemoryStore::new();
    let org = store
        .organizations()
        .insert(CreateOrganizationRequest {
            name: "DIE ZEIT".to_string(),
            url: "https://www.zeit.de/".to_string(),
        })
        .await
        .unwrap();
    let articles = store.articles();
    articles
        .insert(article_request("https://news.test/owned", Some(org.id), 1))
        .await
        .unwrap();
    articles
        .insert(article_request("https://news.test/other", None, 1))
        .await
        .unwrap();

    let svc = service(&store, Arc::new(MockBackend::new(8)));

    let scoped = svc
        .search_articles("shared description", Some("die-zeit"))
        .await
        .unwrap();
    assert_eq!(scoped.value.len(), 1);
    assert_eq!(scoped.value[0].link, "https://news.test/owned");

    let unscoped = svc.search_articles("shared description", None).await.unwrap();
    assert_eq!(unscoped.value.len(), 2);

    assert!(matches!(
        svc.search_articles("anything", Some("no-such-org")).await,
        Err(Error::OrganizationNotFound(_))
    ));
    assert!(matches!(
        svc.search_articles("   ", None).await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_similar_to_article_excludes_source_and_requires_embedding() {
    let store = MemoryStore::new();
    let articles = store.articles();
    let a = articles
        .insert(article_request("https://news.test/a", None, 1))
        .await
        .unwrap();
    let b = articles
        .insert(article_request("https://news.test/b", None, 2))
        .await
        .unwrap();

    let svc = service(&store, Arc::new(MockBackend::new(4)));

    assert!(matches!(
        svc.similar_to_article("https://news.test/missing").await,
        Err(Error::ArticleNotFound(_))
    ));

    // Known link but not embedded yet: empty result, not an error.
    let unembedded = svc.similar_to_article("https://news.test/a").await.unwrap();
    assert!(unembedded.value.is_empty());

    articles
        .store_embeddings(vec![
            (a.id, newswire_core::Vector::from(vec![0.0, 0.0, 0.0, 0.0])),
            (b.id, newswire_core::Vector::from(vec![0.1, 0.0, 0.0, 0.0])),
        ])
        .await
        .unwrap();

    let similar = svc.similar_to_article("https://news.test/a").await.unwrap();
    assert_eq!(similar.value.len(), 1);
    assert_eq!(similar.value[0].id, b.id);
}

#[tokio::test]
async fn test_similar_to_text_embeds_query() {
    let store = MemoryStore::new();
    let articles = store.articles();
    let a = articles
        .insert(article_request("https://news.test/a", None, 1))
        .await
        .unwrap();

    let backend = Arc::new(MockBackend::new(4));
    articles
        .store_embeddings(vec![(a.id, backend.vector_for("some query"))])
        .await
        .unwrap();

    let svc = service(&store, backend.clone());
    let results = svc.similar_to_text("some query", None).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(backend.embedded_texts(), vec!["some query"]);

    assert!(matches!(
        svc.similar_to_text("  ", None).await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_day_summary_generates_from_recent_articles() {
    let store = MemoryStore::new();
    let articles = store.articles();
    articles
        .insert(article_request("https://news.test/recent", None, 2))
        .await
        .unwrap();
    articles
        .insert(article_request("https://news.test/stale", None, 48))
        .await
        .unwrap();

    let backend = Arc::new(MockBackend::new(4).with_response("the briefing"));
    let svc = service(&store, backend);

    let summary = svc.day_summary("what happened today?", None).await.unwrap();
    assert_eq!(summary.value, "the briefing");

    assert!(matches!(
        svc.day_summary("anything", Some("no-such-org")).await,
        Err(Error::OrganizationNotFound(_))
    ));
}

#[tokio::test]
async fn test_day_summary_errors_when_window_is_empty() {
    let store = MemoryStore::new();
    store
        .articles()
        .insert(article_request("https://news.test/stale", None, 48))
        .await
        .unwrap();

    let svc = service(&store, Arc::new(MockBackend::new(4)));
    assert!(matches!(
        svc.day_summary("anything", None).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_mutations_and_cascade() {
    let store = MemoryStore::new();
    let svc = service(&store, Arc::new(MockBackend::new(4)));

    let org = svc
        .create_organization(CreateOrganizationRequest {
            name: "The Economist".to_string(),
            url: "https://www.economist.com/".to_string(),
        })
        .await
        .unwrap();

    let article = svc
        .create_article(article_request("https://news.test/a", Some(org.id), 1))
        .await
        .unwrap();
    assert!(matches!(
        svc.create_article(article_request("https://news.test/a", Some(org.id), 1))
            .await,
        Err(Error::Conflict(_))
    ));

    let owned = svc.articles_for_organization("the-economist").await.unwrap();
    assert_eq!(owned.len(), 1);

    svc.delete_article(article.id).await.unwrap();
    assert!(matches!(
        svc.delete_article(article.id).await,
        Err(Error::ArticleNotFound(_))
    ));

    svc.create_article(article_request("https://news.test/b", Some(org.id), 1))
        .await
        .unwrap();
    svc.delete_organization("the-economist").await.unwrap();
    assert!(matches!(
        svc.delete_organization("the-economist").await,
        Err(Error::OrganizationNotFound(_))
    ));
    assert_eq!(svc.article_counts().await.unwrap().total, 0);
}

#[tokio::test]
async fn test_delete_all_articles_reports_count() {
    let store = MemoryStore::new();
    let articles = store.articles();
    for i in 0..3 {
        articles
            .insert(article_request(&format!("https://news.test/{i}"), None, 1))
            .await
            .unwrap();
    }

    let svc = service(&store, Arc::new(MockBackend::new(4)));
    assert_eq!(svc.delete_all_articles().await.unwrap(), 3);
    assert_eq!(svc.article_counts().await.unwrap().total, 0);
}
