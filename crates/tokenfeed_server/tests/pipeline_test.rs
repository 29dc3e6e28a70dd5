//! Submission pipeline tests over the memory store.

mod test_utils;

use std::collections::HashSet;
use std::sync::Arc;
use tokenfeed_core::{MAX_NICKNAME_CHARS, MAX_TOKEN_CHARS, Rejection};
use tokenfeed_server::{PROCESSING_FAILED, SubmitError};
use tokenfeed_storage::FeedStore;
use test_utils::{FlakyFeedStore, memory_pipeline, pipeline_over};

#[tokio::test]
async fn test_scenario_a_accepts_isolated_801() {
    let pipeline = memory_pipeline(500);
    let mut observer = pipeline.broadcaster().subscribe();

    let post = pipeline.submit("Al", "room801").await.unwrap();
    assert_eq!(post.nickname(), "Al");
    assert_eq!(post.token(), "room801");
    assert_eq!(post.numbers(), &[801]);

    let feed = observer.try_next().expect("accepted post must be broadcast");
    assert_eq!(&*feed, &[post]);
    assert_eq!(pipeline.metrics().accepted(), 1);
}

#[tokio::test]
async fn test_scenario_b_below_threshold_cites_number() {
    let pipeline = memory_pipeline(500);

    let err = pipeline.submit("", "abc123").await.unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::BelowThreshold(123)));
    assert_eq!(err.client_message(), "number below threshold: 123 < 800");
}

#[tokio::test]
async fn test_scenario_c_no_isolated_run() {
    let pipeline = memory_pipeline(500);

    let err = pipeline.submit("", "12345").await.unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::NoThreeDigitNumber));
    assert_eq!(err.client_message(), "no three-digit number found");
}

#[tokio::test]
async fn test_scenario_d_blank_token() {
    let pipeline = memory_pipeline(500);

    let err = pipeline.submit("Al", "   ").await.unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::Empty));
    assert_eq!(err.client_message(), "token empty");
}

#[tokio::test]
async fn test_scenario_e_concurrent_pair_both_land() {
    let pipeline = Arc::new(memory_pipeline(500));

    let first = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.submit("", "900a").await.unwrap() }
    });
    let second = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.submit("", "999b").await.unwrap() }
    });
    let first = first.await.unwrap();
    let second = second.await.unwrap();

    let feed = pipeline.store().list().await.unwrap();
    assert_eq!(feed.len(), 2);

    // Newest first: the later acceptance has the larger id and leads.
    let (later, earlier) = if first.id() > second.id() {
        (first, second)
    } else {
        (second, first)
    };
    assert_eq!(feed, vec![later, earlier]);
}

#[tokio::test]
async fn test_rejection_leaves_store_and_observers_untouched() {
    let pipeline = memory_pipeline(500);
    pipeline.submit("Al", "room 801").await.unwrap();

    let mut observer = pipeline.broadcaster().subscribe();
    for token in ["", "abc", "1234", "room 123", "799 and 100"] {
        assert!(matches!(
            pipeline.submit("Al", token).await,
            Err(SubmitError::Rejected(_))
        ));
    }

    assert_eq!(pipeline.store().list().await.unwrap().len(), 1);
    assert!(observer.try_next().is_none());
    assert_eq!(pipeline.metrics().rejected(), 5);
}

#[tokio::test]
async fn test_mixed_numbers_accepted_and_kept_in_order() {
    let pipeline = memory_pipeline(500);

    let post = pipeline.submit("Al", "123 then 850 then 123").await.unwrap();
    assert_eq!(post.numbers(), &[123, 850, 123]);

    let listed = pipeline.store().list().await.unwrap();
    assert_eq!(listed[0].numbers(), &[123, 850, 123]);
}

#[tokio::test]
async fn test_submission_is_normalized() {
    let pipeline = memory_pipeline(500);

    let long_nickname = "n".repeat(MAX_NICKNAME_CHARS + 10);
    let long_token = format!("801 {}", "t".repeat(MAX_TOKEN_CHARS));

    let post = pipeline
        .submit(&format!("  {long_nickname}  "), &long_token)
        .await
        .unwrap();
    assert_eq!(post.nickname().chars().count(), MAX_NICKNAME_CHARS);
    assert_eq!(post.token().chars().count(), MAX_TOKEN_CHARS);

    let anonymous = pipeline.submit("   ", "  room 801  ").await.unwrap();
    assert_eq!(anonymous.nickname(), "Anonymous");
    assert_eq!(anonymous.token(), "room 801");
}

#[tokio::test]
async fn test_cap_holds_across_many_submissions() {
    let pipeline = memory_pipeline(10);
    let mut observer = pipeline.broadcaster().subscribe();

    for n in 0..25 {
        pipeline.submit("Al", &format!("post {n} 900")).await.unwrap();
        let feed = observer.next().await.unwrap();
        assert!(feed.len() <= 10);
    }

    let feed = pipeline.store().list().await.unwrap();
    assert_eq!(feed.len(), 10);
    assert_eq!(feed[0].token(), "post 24 900");
    assert_eq!(feed[9].token(), "post 15 900");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_each_present_once() {
    let pipeline = Arc::new(memory_pipeline(500));
    let mut observer = pipeline.broadcaster().subscribe();

    let handles: Vec<_> = (0..50)
        .map(|n| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move { pipeline.submit("", &format!("#{n} 900")).await.unwrap() })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        assert!(ids.insert(*handle.await.unwrap().id()));
    }

    let feed = pipeline.store().list().await.unwrap();
    assert_eq!(feed.len(), 50);
    let tokens: HashSet<&str> = feed.iter().map(|p| p.token().as_str()).collect();
    assert_eq!(tokens.len(), 50);

    // Publishes leave in acceptance order, so feed sizes only grow.
    let mut last_len = 0;
    while let Some(feed) = observer.try_next() {
        assert!(feed.len() > last_len);
        last_len = feed.len();
    }
    assert_eq!(last_len, 50);
}

#[tokio::test]
async fn test_backend_failure_is_generic_and_not_published() {
    let store = Arc::new(FlakyFeedStore::new(500));
    let pipeline = pipeline_over(Arc::clone(&store) as Arc<dyn FeedStore>);
    let mut observer = pipeline.broadcaster().subscribe();

    store.fail_appends(true);
    let err = pipeline.submit("Al", "room 801").await.unwrap_err();
    assert!(matches!(err, SubmitError::Failed(_)));
    assert_eq!(err.client_message(), PROCESSING_FAILED);
    assert!(!err.client_message().contains("hunter2"));
    assert_eq!(store.stored(), 0);

    // A failed read after the write leaves nothing behind either.
    store.fail_appends(false);
    store.fail_lists(true);
    let err = pipeline.submit("Al", "room 802").await.unwrap_err();
    assert_eq!(err.client_message(), PROCESSING_FAILED);
    assert_eq!(store.stored(), 0);

    assert!(observer.try_next().is_none());
    assert_eq!(pipeline.metrics().failed(), 2);
    assert_eq!(pipeline.metrics().accepted(), 0);

    store.fail_lists(false);
    let post = pipeline.submit("Al", "room 803").await.unwrap();
    let feed = observer.try_next().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0], post);
}

#[tokio::test]
async fn test_rejection_checked_before_backend() {
    let store = Arc::new(FlakyFeedStore::new(500));
    store.fail_appends(true);
    let pipeline = pipeline_over(Arc::clone(&store) as Arc<dyn FeedStore>);

    let err = pipeline.submit("Al", "room 123").await.unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::BelowThreshold(123)));
    assert_eq!(store.stored(), 0);
}
