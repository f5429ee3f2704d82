//! Ranking property tests over the full engine.
//!
//! Each test ingests real fixtures through the pipeline and checks an
//! observable ranking guarantee on the search output, rather than poking
//! at scoring internals.

use std::time::Duration;

use pretty_assertions::assert_eq;

use digest_types::{Timeframe, TuningOverride, TuningParams};
use e2e_tests::{default_global, last_week, make_batch, make_message, TestHarness, TEST_WORKSPACE};

#[tokio::test]
async fn test_results_respect_top_k_and_quota() {
    let mut global = default_global();
    global.top_k = 10;
    global.topic_quota.insert("rust".to_string(), 2);
    let harness = TestHarness::with_global(global);

    let mut messages = make_batch("rs", 5, "rust modules and visibility rules", "rust");
    messages.extend(make_batch(
        "db",
        2,
        "databases vacuum and bloat cleanup",
        "databases",
    ));
    harness
        .pipeline
        .embed_and_upsert(messages, TEST_WORKSPACE)
        .await
        .unwrap();

    let items = harness
        .engine
        .search_similar("u-1", last_week(), None)
        .await
        .unwrap();

    let rust_count = items.iter().filter(|i| i.topic == "rust").count();
    let db_count = items.iter().filter(|i| i.topic == "databases").count();
    assert_eq!(rust_count, 2, "quota caps the rust group");
    assert_eq!(db_count, 2, "uncapped topic keeps all matches");
    assert_eq!(items.len(), 4);
}

#[tokio::test]
async fn test_diversity_defers_near_duplicates() {
    let harness = TestHarness::new();

    // two literal duplicates and one distinct message, same age
    let messages = vec![
        make_message("m-dup-a", "rust rust rust review", "rust", 1),
        make_message("m-dup-b", "rust rust rust review", "rust", 1),
        make_message("m-distinct", "rust compiler internals notes", "rust", 1),
    ];
    harness
        .pipeline
        .embed_and_upsert(messages, TEST_WORKSPACE)
        .await
        .unwrap();

    // pure relevance keeps both duplicates
    let relevance_only = TuningOverride {
        top_k: Some(2),
        diversity_lambda: Some(1.0),
        ..Default::default()
    };
    let items = harness
        .engine
        .search_similar("u-1", last_week(), Some(&relevance_only))
        .await
        .unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.message_id.as_str()).collect();
    assert!(ids.contains(&"m-dup-a") && ids.contains(&"m-dup-b"));

    // with diversity on, the second duplicate loses its slot
    let diverse = TuningOverride {
        top_k: Some(2),
        diversity_lambda: Some(0.2),
        ..Default::default()
    };
    let items = harness
        .engine
        .search_similar("u-1", last_week(), Some(&diverse))
        .await
        .unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.message_id.as_str()).collect();
    assert!(ids.contains(&"m-distinct"));
    let dups = ids
        .iter()
        .filter(|id| **id == "m-dup-a" || **id == "m-dup-b")
        .count();
    assert_eq!(dups, 1, "only one copy of a duplicate survives");
}

#[tokio::test]
async fn test_lambda_one_orders_by_weighted_score() {
    let harness = TestHarness::new();
    harness
        .pipeline
        .embed_and_upsert(
            make_batch("rs", 6, "rust futures and streams", "rust"),
            TEST_WORKSPACE,
        )
        .await
        .unwrap();

    let knobs = TuningOverride {
        diversity_lambda: Some(1.0),
        ..Default::default()
    };
    let items = harness
        .engine
        .search_similar("u-1", last_week(), Some(&knobs))
        .await
        .unwrap();
    assert!(!items.is_empty());
    for pair in items.windows(2) {
        assert!(pair[0].weighted_score >= pair[1].weighted_score);
    }
}

#[tokio::test]
async fn test_newer_message_outranks_older_equal_content() {
    let harness = TestHarness::new();
    let messages = vec![
        make_message("m-old", "rust lifetimes explained", "rust", 48),
        make_message("m-new", "rust lifetimes explained", "rust", 1),
    ];
    harness
        .pipeline
        .embed_and_upsert(messages, TEST_WORKSPACE)
        .await
        .unwrap();

    let items = harness
        .engine
        .search_similar("u-1", last_week(), None)
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].message_id, "m-new");
    assert!(items[0].decayed_score > items[1].decayed_score);
    // raw similarity is identical; only recency separates them
    assert!((items[0].similarity - items[1].similarity).abs() < 1e-6);
}

#[tokio::test]
async fn test_huge_half_life_disables_decay() {
    let harness = TestHarness::new();
    let messages = vec![
        make_message("m-old", "rust lifetimes explained", "rust", 120),
        make_message("m-new", "rust lifetimes explained", "rust", 1),
    ];
    harness
        .pipeline
        .embed_and_upsert(messages, TEST_WORKSPACE)
        .await
        .unwrap();

    let knobs = TuningOverride {
        recency_half_life: Some(Duration::from_secs(u64::MAX / 1_000_000)),
        ..Default::default()
    };
    let items = harness
        .engine
        .search_similar("u-1", Timeframe::last_days(30), Some(&knobs))
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    for item in &items {
        assert!(
            (item.decayed_score - item.similarity).abs() < 1e-3,
            "decay should be a no-op at an effectively infinite half-life"
        );
    }
}

#[tokio::test]
async fn test_user_override_narrows_top_k() {
    let mut global = TuningParams::default();
    global.top_k = 5;
    global.user_interest_weight.insert("rust".to_string(), 1.0);
    let harness = TestHarness::with_global(global);

    harness
        .tuning
        .set_user_override(
            "u-narrow",
            &TuningOverride {
                top_k: Some(3),
                ..Default::default()
            },
        )
        .unwrap();

    harness
        .pipeline
        .embed_and_upsert(
            make_batch("rs", 8, "rust workspace layouts", "rust"),
            TEST_WORKSPACE,
        )
        .await
        .unwrap();

    let narrowed = harness
        .engine
        .search_similar("u-narrow", last_week(), None)
        .await
        .unwrap();
    assert_eq!(narrowed.len(), 3);

    let default_width = harness
        .engine
        .search_similar("u-other", last_week(), None)
        .await
        .unwrap();
    assert_eq!(default_width.len(), 5);
}

#[tokio::test]
async fn test_knobs_win_for_one_call_without_persisting() {
    let harness = TestHarness::new();
    harness
        .pipeline
        .embed_and_upsert(
            make_batch("rs", 6, "rust proc macro hygiene", "rust"),
            TEST_WORKSPACE,
        )
        .await
        .unwrap();

    let knobs = TuningOverride {
        top_k: Some(1),
        ..Default::default()
    };
    let narrowed = harness
        .engine
        .search_similar("u-1", last_week(), Some(&knobs))
        .await
        .unwrap();
    assert_eq!(narrowed.len(), 1);

    // the knob never lands in the stored scopes
    assert_eq!(harness.tuning.resolve("u-1").top_k, 10);
    let unaffected = harness
        .engine
        .search_similar("u-1", last_week(), None)
        .await
        .unwrap();
    assert_eq!(unaffected.len(), 6);
}

#[tokio::test]
async fn test_min_relevance_filters_on_raw_similarity() {
    let harness = TestHarness::new();
    let messages = vec![
        make_message("m-exact", "rust", "rust", 1),
        make_message("m-partial", "rust compiler", "rust", 1),
    ];
    harness
        .pipeline
        .embed_and_upsert(messages, TEST_WORKSPACE)
        .await
        .unwrap();

    let knobs = TuningOverride {
        min_relevance: Some(0.99),
        ..Default::default()
    };
    let items = harness
        .engine
        .search_similar("u-1", last_week(), Some(&knobs))
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].message_id, "m-exact");
}
