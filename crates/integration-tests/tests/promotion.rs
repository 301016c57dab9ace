//! Promotion scenarios: the threshold crossing, at-most-once promotion, and
//! the compare-and-set cleanup path when two events race.

use std::sync::Arc;

use domains::{
    ButtonValue, MockChannelGateway, MockPostStore, MockVoteStore, Rating, Vote, VoteEvent,
    VoteStore,
};
use integration_tests::{post, GatewayCall, InMemoryStore, RecordingGateway};
use services::{ChannelIds, PromotionPolicy, SyncService};

const PRIMARY: i64 = -100;
const POPULAR: i64 = -200;

fn channels() -> ChannelIds {
    ChannelIds {
        primary: PRIMARY,
        popular: POPULAR,
    }
}

fn tap(message_id: i64, user_id: i64) -> VoteEvent {
    VoteEvent {
        message_id,
        user_id,
        button: ButtonValue::Up,
        interaction_id: format!("q-{user_id}"),
    }
}

#[tokio::test]
async fn promotes_exactly_when_the_floor_is_reached() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    store.add_post(post(1, 10));
    let sync = SyncService::new(
        store.clone(),
        store.clone(),
        gateway.clone(),
        PromotionPolicy::default(), // 80% and at least 20 up-votes
        channels(),
        "@comments".to_string(),
    );

    for user in 100..119 {
        sync.handle_vote(&tap(1, user)).await.unwrap();
    }
    // 19 unanimous up-votes: 100% but below the absolute floor.
    assert!(gateway.copies().is_empty());
    assert_eq!(store.post(1).unwrap().popular_id, None);

    sync.handle_vote(&tap(1, 119)).await.unwrap();

    let copies = gateway.copies();
    assert_eq!(copies.len(), 1);
    let GatewayCall::Copy {
        from_chat,
        message_id,
        to_chat,
        new_id,
    } = copies[0].clone()
    else {
        unreachable!()
    };
    assert_eq!((from_chat, message_id, to_chat), (PRIMARY, 1, POPULAR));
    assert_eq!(store.post(1).unwrap().popular_id, Some(new_id));
    // The fresh copy got the current keyboard.
    assert_eq!(gateway.keyboards_for(POPULAR, new_id).len(), 1);
}

#[tokio::test]
async fn never_promotes_twice() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    store.add_post(post(1, 10));
    let sync = SyncService::new(
        store.clone(),
        store.clone(),
        gateway.clone(),
        PromotionPolicy {
            min_percent: 80,
            min_up_votes: 2,
        },
        channels(),
        "@comments".to_string(),
    );

    for user in 100..110 {
        sync.handle_vote(&tap(1, user)).await.unwrap();
    }

    assert_eq!(gateway.copies().len(), 1);
    let popular_id = store.post(1).unwrap().popular_id.unwrap();
    // Later votes keep updating the promoted copy's keyboard instead.
    assert!(gateway.keyboards_for(POPULAR, popular_id).len() > 1);
}

#[tokio::test]
async fn lost_promotion_claim_deletes_the_duplicate_copy() {
    let mut posts = MockPostStore::new();
    let mut votes = MockVoteStore::new();
    let mut gateway = MockChannelGateway::new();

    posts.expect_get().returning(|id| Ok(Some(post(id, 10))));
    votes.expect_get_user_vote().returning(|_, _| Ok(None));
    votes.expect_insert_vote().returning(|_, _, _| Ok(()));
    votes
        .expect_get_rating()
        .returning(|_| Ok(Rating { up: 25, down: 0 }));
    gateway.expect_answer_interaction().returning(|_, _| Ok(()));
    // Only the origin keyboard is pushed; the lost copy never gets one.
    gateway
        .expect_update_keyboard()
        .withf(|chat, message, _| (*chat, *message) == (PRIMARY, 1))
        .times(1)
        .returning(|_, _, _| Ok(()));
    gateway
        .expect_copy_post()
        .times(1)
        .returning(|_, _, _| Ok(555));
    // Another event already claimed the promotion.
    posts
        .expect_mark_popular()
        .times(1)
        .returning(|_, _| Ok(false));
    gateway
        .expect_delete_post()
        .withf(|chat, message| (*chat, *message) == (POPULAR, 555))
        .times(1)
        .returning(|_, _| Ok(()));

    let sync = SyncService::new(
        Arc::new(votes),
        Arc::new(posts),
        Arc::new(gateway),
        PromotionPolicy::default(),
        channels(),
        "@comments".to_string(),
    );

    sync.handle_vote(&tap(1, 2)).await.unwrap();
}

#[tokio::test]
async fn downvotes_hold_a_post_below_the_ratio() {
    let store = Arc::new(InMemoryStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    store.add_post(post(1, 10));
    let sync = SyncService::new(
        store.clone(),
        store.clone(),
        gateway.clone(),
        PromotionPolicy {
            min_percent: 80,
            min_up_votes: 4,
        },
        channels(),
        "@comments".to_string(),
    );

    store.insert_vote(1, 50, Vote::Down).await.unwrap();
    for user in 100..116 {
        sync.handle_vote(&tap(1, user)).await.unwrap();
    }

    // 16 up / 1 down is about 94%: promoted. But before 5 up / 1 down the
    // ratio never exceeded 80%, so exactly one copy exists.
    assert_eq!(gateway.copies().len(), 1);
}
