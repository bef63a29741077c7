//! End-to-end tests of the HTTP API against a temporary SQLite database.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use kitsudex::config::Config;
use kitsudex::db::NewUser;
use kitsudex::domain::Role;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const ADMIN_USERNAME: &str = "site_admin";
const ADMIN_PASSWORD: &str = "admin-pass-123";

struct TestApp {
    router: Router,
    state: Arc<kitsudex::api::AppState>,
    admin_id: i64,
    admin_key: String,
}

async fn spawn_app() -> TestApp {
    let db_path =
        std::env::temp_dir().join(format!("kitsudex-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    // Nothing listens here, so Kitsu calls fail fast
    config.kitsu.base_url = "http://127.0.0.1:9".to_string();
    config.kitsu.connect_timeout_seconds = 1;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let security = config.security.clone();

    let state = kitsudex::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    let admin = state
        .store()
        .create_user(
            NewUser {
                firstname: "Site".to_string(),
                lastname: "Admin".to_string(),
                username: ADMIN_USERNAME.to_string(),
                email: "admin@example.com".to_string(),
                password: ADMIN_PASSWORD.to_string(),
                role: Role::Admin,
            },
            &security,
        )
        .await
        .expect("Failed to create admin");

    TestApp {
        router: kitsudex::api::router(state.clone()),
        state,
        admin_id: i64::from(i32::from(admin.id)),
        admin_key: admin.api_key,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = api_key {
            builder = builder.header("X-Api-Key", key);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get(&self, uri: &str, api_key: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, api_key, None).await
    }

    /// Registers and logs in a user, returning its id and API key.
    async fn register(&self, username: &str) -> (i64, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "firstname": "Test",
                    "lastname": "User",
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "password123",
                    "confirm_password": "password123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");

        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"username": username, "password": "password123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        (
            body["data"]["user"]["id"].as_i64().unwrap(),
            body["data"]["api_key"].as_str().unwrap().to_string(),
        )
    }

    async fn create_anime(&self, body: Value) -> i64 {
        let (status, body) = self
            .send(Method::POST, "/api/anime", Some(&self.admin_key), Some(body))
            .await;
        assert_eq!(status, StatusCode::OK, "create anime failed: {body}");
        body["data"]["id"].as_i64().unwrap()
    }
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/system/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["data"]["database"], true);
    assert_eq!(body["data"]["anime_count"], 0);
}

#[tokio::test]
async fn test_anonymous_access() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/anime", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = app.get("/api/watchlist", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/auth/me", Some("not-a-key")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let app = spawn_app().await;

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.admin_key))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["username"], ADMIN_USERNAME);
    assert_eq!(body["data"]["role"], "ADMIN");
}

#[tokio::test]
async fn test_no_builtin_admin_credentials() {
    let app = spawn_app().await;
    let legacy_key = "kitsudex_default_api_key_please_regenerate";

    let (status, _) = app.get("/api/auth/me", Some(legacy_key)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/users", Some(legacy_key)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"username": "admin", "password": "password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admins = app
        .state
        .store()
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.role == Role::Admin)
        .count();
    assert_eq!(admins, 1);
}

#[tokio::test]
async fn test_catalog_management_requires_admin() {
    let app = spawn_app().await;
    let (_, user_key) = app.register("plain_user").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/anime",
            Some(&user_key),
            Some(json!({"title": "Trigun"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let id = app.create_anime(json!({"title": "Trigun"})).await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/anime/{id}"),
            Some(&user_key),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/anime",
            Some(&app.admin_key),
            Some(json!({"title": "Trigun"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/anime/{id}"),
            Some(&app.admin_key),
            Some(json!({"title": "Trigun", "subtype": "TV", "episode_count": 26})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["episode_count"], 26);
}

#[tokio::test]
async fn test_catalog_query_filters_and_sorts() {
    let app = spawn_app().await;
    app.create_anime(json!({"title": "Cowboy Bebop", "subtype": "TV", "start_date": "1998-04-03", "episode_count": 26}))
        .await;
    app.create_anime(json!({"title": "Akira", "subtype": "movie", "start_date": "1988-07-16", "episode_count": 1}))
        .await;
    app.create_anime(json!({"title": "Samurai Champloo", "subtype": "TV", "start_date": "2004-05-20", "episode_count": 26}))
        .await;
    app.create_anime(json!({"title": "Haibane Renmei", "subtype": "TV"}))
        .await;

    let (status, body) = app.get("/api/anime?subtype=tv&sortBy=newest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        titles(&body),
        vec!["Samurai Champloo", "Cowboy Bebop", "Haibane Renmei"]
    );

    let (_, body) = app.get("/api/anime?title=BEBOP", None).await;
    assert_eq!(titles(&body), vec!["Cowboy Bebop"]);

    let (_, body) = app.get("/api/anime?sortBy=lowest&subtype=", None).await;
    assert_eq!(titles(&body)[..2], ["Haibane Renmei", "Akira"]);

    let (status, _) = app.get("/api/anime?sortBy=popular", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rating_upsert_and_summary() {
    let app = spawn_app().await;
    let anime = app.create_anime(json!({"title": "Planetes"})).await;
    let (_, alice) = app.register("alice_rates").await;
    let (_, bob) = app.register("bob_rates").await;
    let uri = format!("/api/anime/{anime}/ratings");

    let (status, first) = app
        .send(Method::PUT, &uri, Some(&alice), Some(json!({"value": 3})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, second) = app
        .send(Method::PUT, &uri, Some(&alice), Some(json!({"value": 4})))
        .await;
    assert_eq!(first["data"]["id"], second["data"]["id"]);
    assert_eq!(second["data"]["value"], 4);

    app.send(Method::PUT, &uri, Some(&bob), Some(json!({"value": 5})))
        .await;

    let (_, summary) = app.get(&format!("{uri}/summary"), None).await;
    assert_eq!(summary["data"]["count"], 2);
    assert_eq!(summary["data"]["average"], 4.5);

    let (_, detail) = app.get(&format!("/api/anime/{anime}"), None).await;
    assert_eq!(detail["data"]["average_rating"], 4.5);
    assert_eq!(detail["data"]["title"], "Planetes");

    let (status, _) = app
        .send(Method::PUT, &uri, Some(&alice), Some(json!({"value": 6})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/anime/9999/ratings",
            Some(&alice),
            Some(json!({"value": 3})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, mine) = app.get(&format!("{uri}/mine"), Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["data"]["value"], 5);
}

#[tokio::test]
async fn test_rating_ownership() {
    let app = spawn_app().await;
    let anime = app.create_anime(json!({"title": "Mushishi"})).await;
    let other = app.create_anime(json!({"title": "Kaiba"})).await;
    let (_, alice) = app.register("alice_owns").await;
    let (_, bob) = app.register("bob_snoops").await;

    let (_, rating) = app
        .send(
            Method::PUT,
            &format!("/api/anime/{anime}/ratings"),
            Some(&alice),
            Some(json!({"value": 2})),
        )
        .await;
    let rating_id = rating["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/anime/{anime}/ratings/{rating_id}"),
            Some(&bob),
            Some(json!({"value": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/anime/{other}/ratings/{rating_id}"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, mine) = app
        .get(&format!("/api/anime/{anime}/ratings/mine"), Some(&alice))
        .await;
    assert_eq!(mine["data"]["value"], 2);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/anime/{anime}/ratings/{rating_id}"),
            Some(&alice),
            Some(json!({"value": 5})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/anime/{anime}/ratings/{rating_id}"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/anime/{anime}/ratings/{rating_id}"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_top_rated() {
    let app = spawn_app().await;
    let (_, key) = app.register("top_rater").await;

    for (title, value) in [
        ("A1", 3),
        ("A2", 5),
        ("A3", 1),
        ("A4", 4),
        ("A5", 2),
        ("A6", 5),
        ("A7", 4),
    ] {
        let id = app.create_anime(json!({ "title": title })).await;
        app.send(
            Method::PUT,
            &format!("/api/anime/{id}/ratings"),
            Some(&key),
            Some(json!({ "value": value })),
        )
        .await;
    }

    let (status, body) = app.get("/api/users/me/top-rated", Some(&key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["A2", "A6", "A4", "A7", "A1"]);

    let (_, body) = app
        .get("/api/users/me/top-rated?limit=2", Some(&key))
        .await;
    assert_eq!(titles(&body), vec!["A2", "A6"]);

    let (status, _) = app
        .get("/api/users/me/top-rated?limit=0", Some(&key))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comments_lifecycle() {
    let app = spawn_app().await;
    let anime = app.create_anime(json!({"title": "Texhnolyze"})).await;
    let (_, alice) = app.register("alice_talks").await;
    let (_, bob) = app.register("bob_talks").await;
    let uri = format!("/api/anime/{anime}/comments");

    let (status, _) = app
        .send(Method::POST, &uri, Some(&alice), Some(json!({"content": "   "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            &uri,
            Some(&alice),
            Some(json!({"content": " Bleak and brilliant "})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "Bleak and brilliant");
    assert_eq!(body["data"]["username"], "alice_talks");
    let comment_id = body["data"]["id"].as_i64().unwrap();
    let comment_uri = format!("{uri}/{comment_id}");

    let (status, _) = app
        .send(
            Method::PUT,
            &comment_uri,
            Some(&bob),
            Some(json!({"content": "hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&comment_uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::PUT,
            &comment_uri,
            Some(&alice),
            Some(json!({"content": "Bleak, brilliant, slow"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["updated_at"].is_string());

    let (_, listed) = app.get(&uri, None).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let (_, mine) = app.get("/api/users/me/comments", Some(&alice)).await;
    assert_eq!(mine["data"][0]["id"], comment_id);

    let (status, _) = app
        .send(Method::DELETE, &comment_uri, Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Moderators may delete any comment
    let (status, _) = app
        .send(Method::DELETE, &comment_uri, Some(&app.admin_key), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&comment_uri, Some(&alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_watchlist_conflicts() {
    let app = spawn_app().await;
    let first = app.create_anime(json!({"title": "Ergo Proxy"})).await;
    let second = app.create_anime(json!({"title": "Paranoia Agent"})).await;
    let (_, key) = app.register("watcher_1").await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/watchlist/{first}"),
            Some(&key),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/watchlist", Some(&key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["anime"], json!([]));

    for id in [first, second] {
        let (status, _) = app
            .send(Method::POST, &format!("/api/watchlist/{id}"), Some(&key), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/watchlist/{first}"),
            Some(&key),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.get("/api/watchlist", Some(&key)).await;
    assert_eq!(titles_of_watchlist(&body), vec!["Ergo Proxy", "Paranoia Agent"]);

    let (status, _) = app
        .send(Method::POST, "/api/watchlist/424242", Some(&key), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .send(
            Method::DELETE,
            &format!("/api/watchlist/{first}"),
            Some(&key),
            None,
        )
        .await;
    assert_eq!(titles_of_watchlist(&body), vec!["Paranoia Agent"]);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/watchlist/{first}"),
            Some(&key),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send(Method::DELETE, "/api/watchlist/424242", Some(&key), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Anime 424242 not found");

    let (_, body) = app
        .get(&format!("/api/watchlist/{second}"), Some(&key))
        .await;
    assert_eq!(body["data"]["in_watchlist"], true);
}

fn titles_of_watchlist(body: &Value) -> Vec<String> {
    body["data"]["anime"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_delete_anime_cascades() {
    let app = spawn_app().await;
    let anime = app.create_anime(json!({"title": "Serial Experiments Lain"})).await;
    let keep = app.create_anime(json!({"title": "Boogiepop Phantom"})).await;
    let (_, key) = app.register("lain_fan").await;

    app.send(
        Method::PUT,
        &format!("/api/anime/{anime}/ratings"),
        Some(&key),
        Some(json!({"value": 5})),
    )
    .await;
    app.send(
        Method::POST,
        &format!("/api/anime/{anime}/comments"),
        Some(&key),
        Some(json!({"content": "Present day, present time"})),
    )
    .await;
    app.send(Method::POST, &format!("/api/watchlist/{anime}"), Some(&key), None)
        .await;
    app.send(Method::POST, &format!("/api/watchlist/{keep}"), Some(&key), None)
        .await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/anime/{anime}"),
            Some(&app.admin_key),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/anime/{anime}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, comments) = app.get("/api/users/me/comments", Some(&key)).await;
    assert_eq!(comments["data"], json!([]));

    let (_, top) = app.get("/api/users/me/top-rated", Some(&key)).await;
    assert_eq!(top["data"], json!([]));

    let (_, watchlist) = app.get("/api/watchlist", Some(&key)).await;
    assert_eq!(titles_of_watchlist(&watchlist), vec!["Boogiepop Phantom"]);
}

#[tokio::test]
async fn test_registration_rules() {
    let app = spawn_app().await;
    let form = |username: &str, email: &str, confirm: &str| {
        json!({
            "firstname": "Faye",
            "lastname": "Valentine",
            "username": username,
            "email": email,
            "password": "gambler123",
            "confirm_password": confirm,
        })
    };

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(form("faye_v", "faye@bebop.space", "gambler124")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(form("faye_v", "faye@bebop.space", "gambler123")),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "USER");
    assert!(body["data"].get("api_key").is_none());

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(form("faye_v", "other@bebop.space", "gambler123")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(form("faye_v2", "faye@bebop.space", "gambler123")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"username": "faye_v", "password": "wrong-pass1"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_login_and_logout() {
    let app = spawn_app().await;

    let login = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}).to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(login).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("login should set a session cookie")
        .to_string();

    let with_cookie = |method: Method, uri: &str| {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie.clone())
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .router
        .clone()
        .oneshot(with_cookie(Method::GET, "/api/auth/me"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(with_cookie(Method::POST, "/api/auth/logout"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(with_cookie(Method::GET, "/api/auth/me"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_change_and_api_key_rotation() {
    let app = spawn_app().await;
    let (_, key) = app.register("rotating_user").await;

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/auth/password",
            Some(&key),
            Some(json!({
                "current_password": "password123",
                "new_password": "password456",
                "confirm_password": "password789",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/auth/password",
            Some(&key),
            Some(json!({
                "current_password": "password123",
                "new_password": "password456",
                "confirm_password": "password456",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(Method::POST, "/api/auth/api-key/regenerate", Some(&key), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let new_key = body["data"]["api_key"].as_str().unwrap().to_string();
    assert_eq!(new_key.len(), 64);
    assert_ne!(new_key, key);

    let (status, _) = app.get("/api/auth/me", Some(&key)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/auth/api-key", Some(&new_key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["api_key"], new_key.as_str());
}

#[tokio::test]
async fn test_user_directory_access() {
    let app = spawn_app().await;
    let (alice_id, alice) = app.register("alice_dir").await;
    let (bob_id, bob) = app.register("bob_dir").await;

    let (status, _) = app.get("/api/users", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/users", Some(&app.admin_key)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, _) = app.get(&format!("/api/users/{bob_id}"), Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .get(&format!("/api/users/{alice_id}"), Some(&alice))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice_dir");

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/users/{bob_id}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/auth/me", Some(&bob)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/users/{alice_id}"),
            Some(&app.admin_key),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        app.state.store().list_users().await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_metrics_is_admin_only() {
    let app = spawn_app().await;
    let (_, key) = app.register("metrics_peek").await;

    let (status, _) = app.get("/api/metrics", Some(&key)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/api/metrics")
        .header("X-Api-Key", &app.admin_key)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_import_reports_unreachable_kitsu() {
    let app = spawn_app().await;
    let (_, key) = app.register("importer_1").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/anime/import",
            Some(&key),
            Some(json!({"title": "Cowboy Bebop"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/anime/import",
            Some(&app.admin_key),
            Some(json!({"title": "Cowboy Bebop"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Kitsu service is unavailable");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/anime/import",
            Some(&app.admin_key),
            Some(json!({"title": "  "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upcoming_reports_unreachable_kitsu() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/anime/upcoming", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Kitsu service is unavailable");
}

#[tokio::test]
async fn test_profile_update() {
    let app = spawn_app().await;
    let (alice_id, alice) = app.register("alice_prof").await;
    let (bob_id, bob) = app.register("bob_prof").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/users/{alice_id}"),
            Some(&alice),
            Some(json!({"username": "alice_renamed", "email": "alice@new.example.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "update failed: {body}");
    assert_eq!(body["data"]["username"], "alice_renamed");

    let (_, body) = app.get("/api/auth/me", Some(&alice)).await;
    assert_eq!(body["data"]["username"], "alice_renamed");
    assert_eq!(body["data"]["email"], "alice@new.example.com");
    assert_eq!(body["data"]["firstname"], "Test");

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/users/{bob_id}"),
            Some(&alice),
            Some(json!({"firstname": "Mallory"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/users/{bob_id}"),
            Some(&bob),
            Some(json!({"username": "alice_renamed"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/users/{bob_id}"),
            Some(&bob),
            Some(json!({"email": "alice@new.example.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/users/{bob_id}"),
            Some(&bob),
            Some(json!({"email": "not-an-email"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/users/{bob_id}"),
            Some(&bob),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/users/{bob_id}"),
            Some(&bob),
            Some(json!({"username": "bob_prof"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/users/{bob_id}"),
            Some(&app.admin_key),
            Some(json!({"firstname": "Robert", "lastname": "Tables"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["firstname"], "Robert");
    assert_eq!(body["data"]["username"], "bob_prof");

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/users/{}", app.admin_id),
            Some(&app.admin_key),
            Some(json!({"lastname": "Operator"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/users/999999",
            Some(&app.admin_key),
            Some(json!({"lastname": "Nobody"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_response_headers() {
    let app = spawn_app().await;

    let request = Request::builder()
        .uri("/api/anime")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));
}
