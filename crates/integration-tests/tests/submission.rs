//! Submission scenarios: publishing, the daily cap, and album continuation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use domains::{NewPostEvent, PostContent};
use integration_tests::{post, GatewayCall, InMemoryStore, RecordingGateway};
use services::{SubmissionOutcome, SubmissionService};

const PRIMARY: i64 = -100;
const DAILY_CAP: i64 = 5;

fn service(store: &Arc<InMemoryStore>, gateway: &Arc<RecordingGateway>) -> SubmissionService {
    SubmissionService::new(store.clone(), gateway.clone(), PRIMARY, DAILY_CAP)
}

fn text_event(author_id: i64, text: &str) -> NewPostEvent {
    NewPostEvent {
        author_id,
        author_name: Some("Ada".to_string()),
        username: Some("ada_l".to_string()),
        content: PostContent::Text(text.to_string()),
    }
}

#[tokio::test]
async fn publishes_with_keyboard_and_records_the_post() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let submission = service(&store, &gateway);

    let outcome = submission.submit(&text_event(7, "hello")).await.unwrap();

    let SubmissionOutcome::Published { message_id } = outcome else {
        panic!("expected a published outcome, got {outcome:?}");
    };
    let recorded = store.post(message_id).unwrap();
    assert_eq!(recorded.user_id, 7);
    assert_eq!(recorded.comment_count, 0);
    assert_eq!(recorded.popular_id, None);

    let calls = gateway.calls();
    assert_eq!(
        calls[0],
        GatewayCall::Publish {
            chat_id: PRIMARY,
            message_id,
            content: PostContent::Text("Ada:\nhello".to_string()),
            with_keyboard: true,
        }
    );
}

#[tokio::test]
async fn daily_cap_blocks_further_posts() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let submission = service(&store, &gateway);

    for message_id in 1..=DAILY_CAP {
        store.add_post(post(message_id, 7));
    }

    let outcome = submission.submit(&text_event(7, "one more")).await.unwrap();

    assert_eq!(outcome, SubmissionOutcome::LimitReached { cap: DAILY_CAP });
    assert!(gateway.calls().is_empty());
    assert_eq!(store.post_count(), DAILY_CAP as usize);
}

#[tokio::test]
async fn posts_older_than_a_day_do_not_count() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let submission = service(&store, &gateway);

    for message_id in 1..=DAILY_CAP {
        let mut old = post(message_id, 7);
        old.date = Utc::now() - Duration::hours(25);
        store.add_post(old);
    }

    let outcome = submission.submit(&text_event(7, "fresh day")).await.unwrap();
    assert!(matches!(outcome, SubmissionOutcome::Published { .. }));
}

#[tokio::test]
async fn album_continuation_adds_no_post_and_no_keyboard() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let submission = service(&store, &gateway);

    let first = NewPostEvent {
        author_id: 7,
        author_name: Some("Ada".to_string()),
        username: None,
        content: PostContent::Photo {
            file_id: "f1".to_string(),
            caption: Some("album".to_string()),
            media_group: Some("g1".to_string()),
        },
    };
    let outcome = submission.submit(&first).await.unwrap();
    assert!(matches!(outcome, SubmissionOutcome::Published { .. }));
    assert_eq!(store.post_count(), 1);

    let second = NewPostEvent {
        content: PostContent::Photo {
            file_id: "f2".to_string(),
            caption: None,
            media_group: Some("g1".to_string()),
        },
        ..first
    };
    let outcome = submission.submit(&second).await.unwrap();

    assert_eq!(outcome, SubmissionOutcome::AlbumContinued);
    assert_eq!(store.post_count(), 1);
    let last = gateway.calls().pop().unwrap();
    assert!(matches!(
        last,
        GatewayCall::Publish {
            with_keyboard: false,
            ..
        }
    ));
}
