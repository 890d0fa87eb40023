mod common;

use common::{LinkSeed, TestApp};
use snaplink::application::services::{DeleteMode, DeleteTarget};
use snaplink::domain::outcome::Outcome;
use snaplink::domain::repositories::LinkRepository;
use snaplink::domain::request_context::RequestContext;
use snaplink::infrastructure::cache::CacheService;
use std::sync::Arc;
use std::time::Duration;

fn redirect_to(url: &str) -> Outcome {
    Outcome::Redirect {
        destination: url.to_string(),
    }
}

#[tokio::test]
async fn test_click_limit_sequence() {
    let mut app = TestApp::new();
    let link = app
        .seed(LinkSeed::new("abc123", "https://example.com").click_limit(2))
        .await;
    let resolver = app.state.resolution_service.clone();

    let first = resolver
        .resolve("abc123", RequestContext::default())
        .await
        .unwrap();
    assert_eq!(first, redirect_to("https://example.com"));
    app.drain().await;
    assert_eq!(app.store.click_limit_of(link.id).await, Some(Some(1)));

    let second = resolver
        .resolve("abc123", RequestContext::default())
        .await
        .unwrap();
    assert_eq!(second, redirect_to("https://example.com"));
    app.drain().await;
    assert_eq!(app.store.click_limit_of(link.id).await, None);

    let third = resolver
        .resolve("abc123", RequestContext::default())
        .await
        .unwrap();
    assert!(matches!(third, Outcome::NotFound | Outcome::Exhausted));
}

#[tokio::test]
async fn test_decrement_never_goes_below_zero() {
    let mut app = TestApp::without_cache();
    let link = app
        .seed(LinkSeed::new("once", "https://example.com").click_limit(1))
        .await;
    let resolver = app.state.resolution_service.clone();

    // Both reads happen before any accounting runs.
    let outcomes = tokio::join!(
        resolver.resolve("once", RequestContext::default()),
        resolver.resolve("once", RequestContext::default()),
    );
    assert_eq!(outcomes.0.unwrap(), redirect_to("https://example.com"));
    assert_eq!(outcomes.1.unwrap(), redirect_to("https://example.com"));

    assert_eq!(app.drain().await, 2);
    assert_eq!(app.store.click_limit_of(link.id).await, None);
    assert_eq!(app.store.decrement_click_limit(link.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_concurrent_decrements_are_atomic() {
    let app = TestApp::new();
    let link = app
        .seed(LinkSeed::new("many", "https://example.com").click_limit(50))
        .await;

    let mut handles = Vec::new();
    for _ in 0..80 {
        let store = app.store.clone();
        handles.push(tokio::spawn(async move {
            store.decrement_click_limit(link.id).await.unwrap()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            successes += 1;
        }
    }

    assert_eq!(successes, 50);
    assert_eq!(app.store.click_limit_of(link.id).await, Some(Some(0)));
}

#[tokio::test]
async fn test_worker_drains_after_senders_drop() {
    let app = TestApp::new();
    app.seed(LinkSeed::new("drain1", "https://example.com"))
        .await;
    let store = app.store.clone();

    let TestApp {
        state, worker, rx, ..
    } = app;
    let handle = tokio::spawn(worker.run(rx, 2));

    for _ in 0..5 {
        state
            .resolution_service
            .resolve("drain1", RequestContext::default())
            .await
            .unwrap();
    }
    drop(state);

    handle.await.unwrap();
    assert_eq!(store.click_count().await, 5);
}

#[tokio::test]
async fn test_cached_code_skips_store() {
    let mut app = TestApp::new();
    app.seed(LinkSeed::new("hot1", "https://example.com"))
        .await;
    let resolver = app.state.resolution_service.clone();

    for _ in 0..3 {
        let outcome = resolver
            .resolve("hot1", RequestContext::default())
            .await
            .unwrap();
        assert_eq!(outcome, redirect_to("https://example.com"));
    }

    assert_eq!(app.store.find_by_code_calls(), 1);
    app.drain().await;
    assert_eq!(app.store.click_count().await, 3);
}

#[tokio::test]
async fn test_cache_tracks_decrements() {
    let mut app = TestApp::new();
    let link = app
        .seed(LinkSeed::new("track1", "https://example.com").click_limit(3))
        .await;
    let resolver = app.state.resolution_service.clone();

    resolver
        .resolve("track1", RequestContext::default())
        .await
        .unwrap();
    app.drain().await;

    let cached = app.cache.get("track1").await.unwrap().unwrap();
    assert_eq!(cached.click_limit, Some(2));
    assert_eq!(cached.link_id, link.id);
}

#[tokio::test]
async fn test_failed_click_insert_still_decrements() {
    let mut app = TestApp::new();
    let link = app
        .seed(LinkSeed::new("flaky1", "https://example.com").click_limit(5))
        .await;
    app.store.fail_next_click_inserts(10);

    app.state
        .resolution_service
        .resolve("flaky1", RequestContext::default())
        .await
        .unwrap();
    app.drain().await;

    assert_eq!(app.store.click_count().await, 0);
    assert_eq!(app.store.click_limit_of(link.id).await, Some(Some(4)));
}

#[tokio::test]
async fn test_transient_click_failure_is_retried() {
    let mut app = TestApp::new();
    app.seed(LinkSeed::new("retry1", "https://example.com"))
        .await;
    app.store.fail_next_click_inserts(1);

    app.state
        .resolution_service
        .resolve("retry1", RequestContext::default())
        .await
        .unwrap();
    app.drain().await;

    assert_eq!(app.store.click_count().await, 1);
}

#[tokio::test]
async fn test_deletion_is_idempotent() {
    let app = TestApp::new();
    let link = app
        .seed(LinkSeed::new("del1", "https://example.com"))
        .await;
    let deletion = Arc::clone(&app.state.deletion_coordinator);

    assert!(
        deletion
            .delete_link(DeleteTarget::Id(link.id), DeleteMode::Lazy)
            .await
            .unwrap()
    );
    assert!(
        !deletion
            .delete_link(DeleteTarget::Id(link.id), DeleteMode::Lazy)
            .await
            .unwrap()
    );
    assert!(
        !deletion
            .delete_link(DeleteTarget::Code("del1".to_string()), DeleteMode::Lazy)
            .await
            .unwrap()
    );
    assert!(
        deletion
            .delete_link(DeleteTarget::Id(link.id), DeleteMode::Explicit)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_deletion_evicts_cache() {
    let app = TestApp::new();
    let link = app
        .seed(LinkSeed::new("evict1", "https://example.com"))
        .await;
    let resolver = app.state.resolution_service.clone();

    resolver
        .resolve("evict1", RequestContext::default())
        .await
        .unwrap();
    assert!(app.cache.get("evict1").await.unwrap().is_some());

    app.state
        .deletion_coordinator
        .delete_link(DeleteTarget::Id(link.id), DeleteMode::Explicit)
        .await
        .unwrap();

    assert!(app.cache.get("evict1").await.unwrap().is_none());
    assert_eq!(
        resolver
            .resolve("evict1", RequestContext::default())
            .await
            .unwrap(),
        Outcome::NotFound
    );
}

#[tokio::test]
async fn test_stale_cache_entry_heals_after_deletion() {
    let mut app = TestApp::new();
    let link = app
        .seed(LinkSeed::new("stale1", "https://example.com").click_limit(1))
        .await;
    // A snapshot written by a resolve that raced the deletion.
    let stale = link.snapshot();
    app.store.delete_with_clicks(link.id).await.unwrap();
    app.cache
        .put("stale1", &stale, Duration::from_secs(60))
        .await
        .unwrap();
    let resolver = app.state.resolution_service.clone();

    let mut redirects = 0;
    for _ in 0..2 {
        let outcome = resolver
            .resolve("stale1", RequestContext::default())
            .await
            .unwrap();
        if matches!(outcome, Outcome::Redirect { .. }) {
            redirects += 1;
        }
        app.drain().await;
    }

    assert!(redirects <= 1);
    assert!(app.cache.get("stale1").await.unwrap().is_none());
    assert_eq!(app.store.click_count().await, 0);
}

#[tokio::test]
async fn test_stale_unlimited_entry_heals_after_deletion() {
    let mut app = TestApp::new();
    let link = app
        .seed(LinkSeed::new("stale2", "https://example.com"))
        .await;
    let stale = link.snapshot();
    app.store.delete_with_clicks(link.id).await.unwrap();
    app.cache
        .put("stale2", &stale, Duration::from_secs(60))
        .await
        .unwrap();
    let resolver = app.state.resolution_service.clone();

    resolver
        .resolve("stale2", RequestContext::default())
        .await
        .unwrap();
    app.drain().await;

    assert!(app.cache.get("stale2").await.unwrap().is_none());
    assert_eq!(
        resolver
            .resolve("stale2", RequestContext::default())
            .await
            .unwrap(),
        Outcome::NotFound
    );
}
