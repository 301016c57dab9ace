//! Discussion-thread scenarios: linking the thread, counting comments, and
//! ignoring traffic that belongs to no post.

use std::sync::Arc;

use domains::{ButtonKind, Keyboard};
use integration_tests::{post, InMemoryStore, RecordingGateway};
use services::{ChannelIds, PromotionPolicy, SyncService};

const PRIMARY: i64 = -100;
const POPULAR: i64 = -200;

fn service(store: &Arc<InMemoryStore>, gateway: &Arc<RecordingGateway>) -> SyncService {
    SyncService::new(
        store.clone(),
        store.clone(),
        gateway.clone(),
        PromotionPolicy::default(),
        ChannelIds {
            primary: PRIMARY,
            popular: POPULAR,
        },
        "@comments".to_string(),
    )
}

fn comments_label(keyboard: &Keyboard) -> Option<&str> {
    keyboard.rows.get(1).and_then(|row| row.first()).map(|button| {
        assert!(matches!(button.kind, ButtonKind::Link(_)));
        button.label.as_str()
    })
}

#[tokio::test]
async fn comment_in_unknown_thread_is_a_noop() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let sync = service(&store, &gateway);

    sync.handle_comment(999).await.unwrap();

    assert!(gateway.calls().is_empty());
    assert_eq!(store.post_count(), 0);
}

#[tokio::test]
async fn comment_bumps_the_counter_on_the_keyboard() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let mut threaded = post(1, 10);
    threaded.comment_thread_id = Some(42);
    store.add_post(threaded);
    let sync = service(&store, &gateway);

    sync.handle_comment(42).await.unwrap();
    sync.handle_comment(42).await.unwrap();

    assert_eq!(store.post(1).unwrap().comment_count, 2);
    let keyboards = gateway.keyboards_for(PRIMARY, 1);
    assert_eq!(keyboards.len(), 2);
    assert_eq!(comments_label(&keyboards[0]), Some("Comments (1) 💬"));
    assert_eq!(comments_label(&keyboards[1]), Some("Comments (2) 💬"));
}

#[tokio::test]
async fn comment_refreshes_the_promoted_copy_too() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let mut threaded = post(1, 10);
    threaded.comment_thread_id = Some(42);
    threaded.popular_id = Some(555);
    store.add_post(threaded);
    let sync = service(&store, &gateway);

    sync.handle_comment(42).await.unwrap();

    assert_eq!(gateway.keyboards_for(PRIMARY, 1).len(), 1);
    assert_eq!(gateway.keyboards_for(POPULAR, 555).len(), 1);
}

#[tokio::test]
async fn thread_link_is_recorded_once_and_shows_the_comments_button() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    store.add_post(post(1, 10));
    let sync = service(&store, &gateway);

    sync.link_thread(1, 42).await.unwrap();
    assert_eq!(store.post(1).unwrap().comment_thread_id, Some(42));
    let keyboards = gateway.keyboards_for(PRIMARY, 1);
    assert_eq!(keyboards.len(), 1);
    assert_eq!(comments_label(&keyboards[0]), Some("Comments 💬"));

    // A repeated automatic forward changes nothing.
    sync.link_thread(1, 43).await.unwrap();
    assert_eq!(store.post(1).unwrap().comment_thread_id, Some(42));
    assert_eq!(gateway.keyboards_for(PRIMARY, 1).len(), 1);
}
