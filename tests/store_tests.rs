//! Persistence invariants checked directly against the store.

use kitsudex::config::SecurityConfig;
use kitsudex::db::{MembershipChange, NewUser, Store, is_unique_violation};
use kitsudex::domain::{AnimeId, RatingValue, Role, UserId, user_anime_key};
use kitsudex::entities::{ratings, watchlists};
use kitsudex::models::AnimeDraft;
use kitsudex::services::{AuthError, AuthService, Registration, SeaOrmAuthService};
use sea_orm::{EntityTrait, PaginatorTrait};

fn security() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}

async fn temp_store() -> Store {
    let path = std::env::temp_dir().join(format!("kitsudex-store-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", path.display()))
        .await
        .expect("Failed to open store")
}

async fn user(store: &Store, username: &str) -> UserId {
    store
        .create_user(
            NewUser {
                firstname: "Spike".to_string(),
                lastname: "Spiegel".to_string(),
                username: username.to_string(),
                email: format!("{username}@bebop.space"),
                password: "swordfish2".to_string(),
                role: Role::User,
            },
            &security(),
        )
        .await
        .unwrap()
        .id
}

async fn anime(store: &Store, title: &str) -> AnimeId {
    store
        .add_anime(&AnimeDraft {
            title: title.to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

fn value(v: i32) -> RatingValue {
    RatingValue::new(v).unwrap()
}

#[tokio::test]
async fn test_upsert_keeps_one_rating_per_pair() {
    let store = temp_store().await;
    let user_id = user(&store, "spike_s").await;
    let anime_id = anime(&store, "Cowboy Bebop").await;

    let first = store.upsert_rating(user_id, anime_id, value(2)).await.unwrap();
    let second = store.upsert_rating(user_id, anime_id, value(5)).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.value, 5);
    assert_eq!(second.user_anime_key, user_anime_key(user_id, anime_id));

    let by_key = store
        .get_rating_by_key(&user_anime_key(user_id, anime_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_key.id, first.id);
    assert_eq!(store.rating_values_for_anime(anime_id).await.unwrap(), vec![5]);
}

#[tokio::test]
async fn test_concurrent_upserts_leave_one_row() {
    let store = temp_store().await;
    let user_id = user(&store, "jet_black").await;
    let anime_id = anime(&store, "Space Dandy").await;

    let handles: Vec<_> = (1..=5)
        .map(|v| {
            let store = store.clone();
            tokio::spawn(async move { store.upsert_rating(user_id, anime_id, value(v)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let count = ratings::Entity::find().count(&store.conn).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_single_watchlist_per_user() {
    let store = temp_store().await;
    let user_id = user(&store, "ed_wong").await;
    let first = anime(&store, "Ergo Proxy").await;
    let second = anime(&store, "Kino's Journey").await;

    assert_eq!(
        store.remove_from_watchlist(user_id, first).await.unwrap(),
        MembershipChange::NoWatchlist
    );

    assert_eq!(
        store.add_to_watchlist(user_id, first).await.unwrap(),
        MembershipChange::Applied
    );
    assert_eq!(
        store.add_to_watchlist(user_id, second).await.unwrap(),
        MembershipChange::Applied
    );
    assert_eq!(
        store.add_to_watchlist(user_id, first).await.unwrap(),
        MembershipChange::Unchanged
    );

    let count = watchlists::Entity::find().count(&store.conn).await.unwrap();
    assert_eq!(count, 1);

    let watchlist = store.get_watchlist(user_id).await.unwrap().unwrap();
    assert_eq!(watchlist.anime.len(), 2);

    assert_eq!(
        store.remove_from_watchlist(user_id, first).await.unwrap(),
        MembershipChange::Applied
    );
    assert_eq!(
        store.remove_from_watchlist(user_id, first).await.unwrap(),
        MembershipChange::Unchanged
    );
    assert!(store.watchlist_contains(user_id, second).await.unwrap());
}

#[tokio::test]
async fn test_removing_anime_cascades() {
    let store = temp_store().await;
    let user_id = user(&store, "faye_val").await;
    let doomed = anime(&store, "Kaiba").await;
    let kept = anime(&store, "Mononoke").await;

    store.upsert_rating(user_id, doomed, value(4)).await.unwrap();
    store.upsert_rating(user_id, kept, value(3)).await.unwrap();
    let comment = store.add_comment(doomed, user_id, "Memories").await.unwrap();
    store.add_to_watchlist(user_id, doomed).await.unwrap();
    store.add_to_watchlist(user_id, kept).await.unwrap();

    assert!(store.remove_anime(doomed).await.unwrap());
    assert!(!store.remove_anime(doomed).await.unwrap());

    assert!(store.get_comment(comment).await.unwrap().is_none());
    let remaining = store.list_ratings_for_user(user_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].anime_id, kept);

    let watchlist = store.get_watchlist(user_id).await.unwrap().unwrap();
    let ids: Vec<AnimeId> = watchlist.anime.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![kept]);
}

#[tokio::test]
async fn test_removing_user_cascades() {
    let store = temp_store().await;
    let leaving = user(&store, "vicious").await;
    let staying = user(&store, "julia_x").await;
    let anime_id = anime(&store, "Texhnolyze").await;

    store.upsert_rating(leaving, anime_id, value(1)).await.unwrap();
    store.upsert_rating(staying, anime_id, value(5)).await.unwrap();
    store.add_comment(anime_id, leaving, "Gone").await.unwrap();
    store.add_to_watchlist(leaving, anime_id).await.unwrap();

    assert!(store.remove_user(leaving).await.unwrap());

    assert!(store.get_user(leaving).await.unwrap().is_none());
    assert_eq!(store.rating_values_for_anime(anime_id).await.unwrap(), vec![5]);
    assert!(store.list_comments_for_anime(anime_id).await.unwrap().is_empty());
    assert!(store.get_watchlist(leaving).await.unwrap().is_none());
    assert_eq!(
        watchlists::Entity::find().count(&store.conn).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_api_key_lookup_and_rotation() {
    let store = temp_store().await;
    let user_id = user(&store, "gren_ops").await;
    let original = store.get_user(user_id).await.unwrap().unwrap().api_key;

    let found = store.verify_api_key(&original).await.unwrap().unwrap();
    assert_eq!(found.id, user_id);

    let rotated = store.regenerate_user_api_key(user_id).await.unwrap();
    assert_ne!(rotated, original);
    assert!(store.verify_api_key(&original).await.unwrap().is_none());
    assert!(store.verify_api_key(&rotated).await.unwrap().is_some());

    assert!(store.verify_user_password("gren_ops", "swordfish2").await.unwrap());
    assert!(!store.verify_user_password("gren_ops", "swordfish3").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_is_a_unique_violation() {
    let store = temp_store().await;
    user(&store, "annie_e").await;

    let err = store
        .create_user(
            NewUser {
                firstname: "Annie".to_string(),
                lastname: "Edison".to_string(),
                username: "annie_e".to_string(),
                email: "another@bebop.space".to_string(),
                password: "swordfish2".to_string(),
                role: Role::User,
            },
            &security(),
        )
        .await
        .unwrap_err();

    assert!(is_unique_violation(&err));
}

#[tokio::test]
async fn test_racing_registrations_yield_one_conflict() {
    let store = temp_store().await;
    let auth = SeaOrmAuthService::new(store.clone(), security());
    let form = |email: &str| Registration {
        firstname: "Rocco".to_string(),
        lastname: "Bonnaro".to_string(),
        username: "rocco_b".to_string(),
        email: email.to_string(),
        password: "swordfish2".to_string(),
        confirm_password: "swordfish2".to_string(),
    };

    let (first, second) = tokio::join!(
        auth.register(form("rocco@bebop.space")),
        auth.register(form("rocco2@bebop.space"))
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(AuthError::Conflict(_))))
    );
    assert_eq!(
        kitsudex::entities::users::Entity::find()
            .count(&store.conn)
            .await
            .unwrap(),
        1
    );
}
