use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService};

mod assets;
pub mod auth;
mod error;
pub mod movies;
pub mod pages;
pub mod session;
pub mod settings;
pub mod validation;

pub use error::ApiError;
pub use session::{AuthSession, Identity};

/// Shared handles every handler receives through `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn auth(&self) -> &dyn AuthService {
        self.auth.as_ref()
    }
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::open(&config.general).await?;
    Ok(create_app_state_with_store(config, store))
}

#[must_use]
pub fn create_app_state_with_store(config: Config, store: Store) -> Arc<AppState> {
    let auth = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.security.clone(),
    )) as Arc<dyn AuthService>;

    Arc::new(AppState {
        config: Arc::new(config),
        store,
        auth,
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let (key, secure, expiry_minutes) = {
        let config = state.config();
        (
            session::signing_key(&config.security.secret_key),
            config.server.secure_cookies,
            config.server.session_expiry_minutes,
        )
    };

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(session::COOKIE_NAME)
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(expiry_minutes)))
        .with_signed(key);

    let protected_routes = Router::new()
        .route("/logout", get(auth::logout))
        .route(
            "/settings",
            get(settings::settings_page).post(settings::update_settings),
        )
        .route(
            "/movie/edit/{movie_id}",
            get(movies::edit_page).post(movies::update_movie),
        )
        .route("/movie/delete/{movie_id}", post(movies::delete_movie))
        .route_layer(middleware::from_fn(session::require_login));

    Router::new()
        .route("/", get(movies::index).post(movies::create_movie))
        .route("/login", get(auth::login_page).post(auth::login))
        .merge(protected_routes)
        .route("/static/{*path}", get(assets::serve_asset))
        .fallback(error::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::load_identity,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
