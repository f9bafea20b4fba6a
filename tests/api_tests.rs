//! End-to-end flows through the router: login, CRUD, settings, error pages.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use watchlist::config::Config;
use watchlist::db::Store;
use watchlist::db::repositories::user::hash_password;

fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("watchlist-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = db_path.display().to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

/// Seeds `{username: "test", password: "123"}` and one movie with id 1.
async fn spawn_app() -> (Store, TestClient) {
    let config = test_config();
    let store = Store::open(&config.general)
        .await
        .expect("failed to open store");

    let hash = hash_password("123", Some(&config.security)).expect("failed to hash password");
    store
        .create_user("Test", Some("test"), Some(&hash))
        .await
        .expect("failed to seed user");
    store
        .create_movie("Test Movie Title", "2019")
        .await
        .expect("failed to seed movie");

    let state = watchlist::api::create_app_state_with_store(config, store.clone());
    (store, TestClient::new(watchlist::api::router(state)))
}

async fn spawn_empty_app() -> (Store, TestClient) {
    let config = test_config();
    let store = Store::open(&config.general)
        .await
        .expect("failed to open store");

    let state = watchlist::api::create_app_state_with_store(config, store.clone());
    (store, TestClient::new(watchlist::api::router(state)))
}

/// Carries the session cookie between requests, like a browser would.
struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    const fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .trim()
                .to_string();
            self.cookie = if pair.ends_with('=') { None } else { Some(pair) };
        }

        response
    }

    async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Follows redirects with GETs and returns the final status and body.
    async fn follow(&mut self, mut response: Response<Body>) -> (StatusCode, String) {
        while response.status().is_redirection() {
            let location = response.headers()[header::LOCATION]
                .to_str()
                .unwrap()
                .to_string();
            response = self.get(&location).await;
        }

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get_page(&mut self, uri: &str) -> (StatusCode, String) {
        let response = self.get(uri).await;
        self.follow(response).await
    }

    async fn submit(&mut self, uri: &str, body: &str) -> (StatusCode, String) {
        let response = self.post_form(uri, body).await;
        self.follow(response).await
    }

    async fn login(&mut self) {
        let (_, body) = self.submit("/login", "username=test&password=123").await;
        assert!(body.contains("Login success."));
    }
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_index_page() {
    let (_, mut client) = spawn_app().await;

    let (status, body) = client.get_page("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Test's Watchlist"));
    assert!(body.contains("Test Movie Title"));
    assert!(body.contains("1 Titles"));
}

#[tokio::test]
async fn test_404_page() {
    let (_, mut client) = spawn_app().await;

    let (status, body) = client.get_page("/nothing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page Not Found - 404"));
    assert!(body.contains("Go Back"));
}

#[tokio::test]
async fn test_login_protect() {
    let (_, mut client) = spawn_app().await;

    let (_, body) = client.get_page("/").await;

    assert!(!body.contains("Logout"));
    assert!(!body.contains("Settings"));
    assert!(!body.contains(r#"<form method="post">"#));
    assert!(!body.contains("Delete"));
    assert!(!body.contains("Edit"));
}

#[tokio::test]
async fn test_login() {
    let (_, mut client) = spawn_app().await;

    let response = client
        .post_form("/login", "username=test&password=123")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let (_, body) = client.follow(response).await;
    assert!(body.contains("Login success."));
    assert!(body.contains("Logout"));
    assert!(body.contains("Settings"));
    assert!(body.contains("Delete"));
    assert!(body.contains("Edit"));
    assert!(body.contains(r#"<form method="post">"#));
}

#[tokio::test]
async fn test_login_failures() {
    let (_, mut client) = spawn_app().await;

    let response = client
        .post_form("/login", "username=test&password=456")
        .await;
    assert_eq!(location(&response), "/login");
    let (_, body) = client.follow(response).await;
    assert!(!body.contains("Login success."));
    assert!(body.contains("Invalid username or password."));

    let (_, body) = client.submit("/login", "username=wrong&password=123").await;
    assert!(!body.contains("Login success."));
    assert!(body.contains("Invalid username or password."));

    let (_, body) = client.submit("/login", "username=&password=123").await;
    assert!(!body.contains("Login success."));
    assert!(body.contains("Invalid input."));

    let (_, body) = client.submit("/login", "username=test&password=").await;
    assert!(!body.contains("Login success."));
    assert!(body.contains("Invalid input."));

    // Still anonymous after all of that
    let (_, body) = client.get_page("/").await;
    assert!(!body.contains("Logout"));
}

#[tokio::test]
async fn test_login_with_empty_user_table() {
    let (_, mut client) = spawn_empty_app().await;

    let response = client
        .post_form("/login", "username=test&password=123")
        .await;
    assert_eq!(location(&response), "/");

    let (status, body) = client.follow(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error, the User Table is Empty."));
    assert!(!body.contains("Logout"));
}

#[tokio::test]
async fn test_create_item() {
    let (store, mut client) = spawn_app().await;
    client.login().await;

    let (_, body) = client.submit("/", "title=New+Movie&year=2019").await;
    assert!(body.contains("Item created."));
    assert!(body.contains("New Movie"));
    assert_eq!(store.count_movies().await.unwrap(), 2);

    let (_, body) = client.submit("/", "title=&year=2019").await;
    assert!(!body.contains("Item created."));
    assert!(body.contains("Invalid input."));

    let (_, body) = client.submit("/", "title=New+Movie&year=").await;
    assert!(!body.contains("Item created."));
    assert!(body.contains("Invalid input."));

    let long_title = "a".repeat(61);
    let (_, body) = client
        .submit("/", &format!("title={long_title}&year=2019"))
        .await;
    assert!(body.contains("Invalid input."));

    let (_, body) = client.submit("/", "title=Short+Year&year=19").await;
    assert!(body.contains("Invalid input."));

    assert_eq!(store.count_movies().await.unwrap(), 2);
}

#[tokio::test]
async fn test_create_item_trims_input() {
    let (store, mut client) = spawn_app().await;
    client.login().await;

    let (_, body) = client.submit("/", "title=++Padded++&year=+1999+").await;
    assert!(body.contains("Item created."));

    let movies = store.list_movies().await.unwrap();
    let created = movies.last().unwrap();
    assert_eq!(created.title, "Padded");
    assert_eq!(created.year, "1999");
}

#[tokio::test]
async fn test_anonymous_create_is_ignored() {
    let (store, mut client) = spawn_app().await;

    let response = client.post_form("/", "title=Sneaky&year=2019").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let (_, body) = client.follow(response).await;
    assert!(!body.contains("Sneaky"));
    assert!(!body.contains("Invalid input."));
    assert_eq!(store.count_movies().await.unwrap(), 1);
}

#[tokio::test]
async fn test_update_item() {
    let (store, mut client) = spawn_app().await;
    client.login().await;

    let (status, body) = client.get_page("/movie/edit/1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Edit item"));
    assert!(body.contains("Cancel"));
    assert!(body.contains("Test Movie Title"));
    assert!(body.contains("2019"));

    let (_, body) = client
        .submit("/movie/edit/1", "title=New+Movie+Edited&year=2019")
        .await;
    assert!(body.contains("Item updated."));
    assert!(body.contains("New Movie Edited"));

    let response = client.post_form("/movie/edit/1", "title=&year=2019").await;
    assert_eq!(location(&response), "/movie/edit/1");
    let (_, body) = client.follow(response).await;
    assert!(!body.contains("Item updated."));
    assert!(body.contains("Invalid input."));

    let (_, body) = client
        .submit("/movie/edit/1", "title=New+Movie+Edited+Again&year=")
        .await;
    assert!(!body.contains("Item updated."));
    assert!(!body.contains("New Movie Edited Again"));
    assert!(body.contains("Invalid input."));

    let movie = store.get_movie(1).await.unwrap().unwrap();
    assert_eq!(movie.title, "New Movie Edited");
    assert_eq!(movie.year, "2019");
}

#[tokio::test]
async fn test_update_missing_item() {
    let (_, mut client) = spawn_app().await;
    client.login().await;

    let response = client
        .post_form("/movie/edit/9999", "title=Ghost&year=2019")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (status, body) = client.get_page("/movie/edit/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page Not Found - 404"));

    let (status, _) = client.get_page("/movie/edit/not-a-number").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_item() {
    let (store, mut client) = spawn_app().await;
    client.login().await;

    let (_, body) = client.submit("/movie/delete/1", "").await;
    assert!(body.contains("Item deleted."));
    assert!(!body.contains("Test Movie Title"));
    assert!(store.get_movie(1).await.unwrap().is_none());

    let response = client.post_form("/movie/delete/1", "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout() {
    let (_, mut client) = spawn_app().await;
    client.login().await;

    let (_, body) = client.get_page("/logout").await;
    assert!(body.contains("Goodbye."));
    assert!(!body.contains("Logout"));
    assert!(!body.contains("Settings"));
    assert!(!body.contains("Delete"));
    assert!(!body.contains("Edit"));
    assert!(!body.contains(r#"<form method="post">"#));

    let response = client.get("/settings").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_settings() {
    let (store, mut client) = spawn_app().await;
    client.login().await;

    let (status, body) = client.get_page("/settings").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Your Name"));
    assert!(body.contains("Settings"));

    let (_, body) = client.submit("/settings", "name=ZHS").await;
    assert!(body.contains("Setting updated."));
    assert!(body.contains("ZHS's Watchlist"));

    let (_, body) = client.submit("/settings", "name=").await;
    assert!(!body.contains("Setting updated."));
    assert!(body.contains("Invalid input."));

    let long_name = "n".repeat(21);
    let (_, body) = client.submit("/settings", &format!("name={long_name}")).await;
    assert!(body.contains("Invalid input."));

    assert_eq!(store.first_user().await.unwrap().unwrap().name, "ZHS");
}

#[tokio::test]
async fn test_protected_routes_redirect_to_login() {
    let (store, mut client) = spawn_app().await;

    for (method, uri) in [
        ("GET", "/logout"),
        ("GET", "/settings"),
        ("POST", "/settings"),
        ("GET", "/movie/edit/1"),
        ("POST", "/movie/edit/1"),
        ("POST", "/movie/delete/1"),
    ] {
        let response = if method == "GET" {
            client.get(uri).await
        } else {
            client.post_form(uri, "title=Changed&year=2000&name=Changed").await
        };

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{method} {uri}");
        assert_eq!(location(&response), "/login", "{method} {uri}");
    }

    let movie = store.get_movie(1).await.unwrap().unwrap();
    assert_eq!(movie.title, "Test Movie Title");
    assert_eq!(store.first_user().await.unwrap().unwrap().name, "Test");

    let (_, body) = client.get_page("/login").await;
    assert!(body.contains("Please log in to access this page."));
}

#[tokio::test]
async fn test_stylesheet_is_served() {
    let (_, mut client) = spawn_app().await;

    let response = client.get("/static/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "text/css"
    );

    let response = client.get("/static/missing.css").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_item_trims_input() {
    let (store, mut client) = spawn_app().await;
    client.login().await;

    let (_, body) = client
        .submit("/movie/edit/1", "title=++Padded++&year=+1999+")
        .await;
    assert!(body.contains("Item updated."));

    let movie = store.get_movie(1).await.unwrap().unwrap();
    assert_eq!(movie.title, "Padded");
    assert_eq!(movie.year, "1999");
}

#[tokio::test]
async fn test_session_of_deleted_user_is_anonymous() {
    use sea_orm::EntityTrait;

    let (store, mut client) = spawn_app().await;
    client.login().await;

    let user = store.first_user().await.unwrap().unwrap();
    watchlist::entities::users::Entity::delete_by_id(user.id)
        .exec(&store.conn)
        .await
        .unwrap();

    let (status, body) = client.get_page("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("Logout"));
    assert!(!body.contains("Settings"));

    let response = client.get("/settings").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_anonymous_create_without_form_body_is_ignored() {
    let (store, mut client) = spawn_app().await;

    let response = client
        .send(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::from("garbage"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(store.count_movies().await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_without_form_body_is_invalid_input() {
    let (store, mut client) = spawn_app().await;
    client.login().await;

    let response = client
        .send(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::from("garbage"))
                .unwrap(),
        )
        .await;
    assert_eq!(location(&response), "/");

    let (_, body) = client.follow(response).await;
    assert!(body.contains("Invalid input."));
    assert_eq!(store.count_movies().await.unwrap(), 1);
}

#[tokio::test]
async fn test_missing_edit_page_keeps_pending_flash() {
    let (_, mut client) = spawn_app().await;
    client.login().await;

    // Queue a flash without following the redirect
    let response = client.post_form("/settings", "name=").await;
    assert_eq!(location(&response), "/settings");

    let response = client.get("/movie/edit/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (_, body) = client.get_page("/").await;
    assert!(body.contains("Invalid input."));
}
