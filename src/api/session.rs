//! Cookie session state: who is logged in, and one-shot flash messages.
//!
//! The session only stores the user id. The identity middleware turns that id
//! into a [`User`] once per request and leaves it in the request extensions.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sha2::{Digest, Sha512};
use std::sync::Arc;
use tower_sessions::{Session, cookie::Key};

use super::pages::PageContext;
use super::{ApiError, AppState};
use crate::db::User;
use crate::services::AuthService;

pub const COOKIE_NAME: &str = "watchlist_session";

const USER_ID_KEY: &str = "user_id";
const FLASHES_KEY: &str = "_flashes";

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

/// Cookie signing needs 64 bytes of key material; stretch whatever secret we were given.
#[must_use]
pub fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Login state and flash messages for the current browser session.
#[derive(Clone)]
pub struct AuthSession {
    session: Session,
}

impl AuthSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Must only be called after the password has been verified.
    pub async fn login(&self, user: &User) -> Result<(), ApiError> {
        self.session.cycle_id().await?;
        self.session.insert(USER_ID_KEY, user.id).await?;
        tracing::info!("User {} logged in", user.id);
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(id) = self.session.remove::<i32>(USER_ID_KEY).await? {
            tracing::info!("User {} logged out", id);
        }
        self.session.cycle_id().await?;
        Ok(())
    }

    pub async fn user_id(&self) -> Result<Option<i32>, ApiError> {
        Ok(self.session.get::<i32>(USER_ID_KEY).await?)
    }

    /// Resolves the stored id; a deleted user reads as anonymous.
    pub async fn current_user(&self, auth: &dyn AuthService) -> Result<Option<User>, ApiError> {
        match self.user_id().await? {
            Some(id) => Ok(auth.resolve(id).await?),
            None => Ok(None),
        }
    }

    pub async fn flash(&self, message: impl Into<String>) -> Result<(), ApiError> {
        let mut flashes: Vec<String> = self.session.get(FLASHES_KEY).await?.unwrap_or_default();
        flashes.push(message.into());
        self.session.insert(FLASHES_KEY, flashes).await?;
        Ok(())
    }

    /// Returns queued flashes and clears them.
    pub async fn take_flashes(&self) -> Result<Vec<String>, ApiError> {
        Ok(self
            .session
            .remove::<Vec<String>>(FLASHES_KEY)
            .await?
            .unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| ApiError::Session(msg.to_string()))?;
        Ok(Self::new(session))
    }
}

/// Per-request view of who is asking and whose list this is.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub current_user: Option<User>,

    /// First user row; its name heads every page.
    pub owner: Option<User>,
}

impl Identity {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

impl PageContext {
    /// Takes pending flashes, so call it only once the page will really render.
    pub async fn build(identity: Identity, session: &AuthSession) -> Result<Self, ApiError> {
        let flashes = session.take_flashes().await?;

        Ok(Self {
            owner: identity.owner,
            current_user: identity.current_user,
            flashes,
        })
    }
}

/// Everything a rendered page needs. Extracting it consumes pending flashes,
/// so only handlers that actually render should ask for it.
impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        let session = AuthSession::from_request_parts(parts, state).await?;
        Self::build(identity, &session).await
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session's user and the list owner once, before routing.
pub async fn load_identity(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let current_user = session.current_user(state.auth()).await?;
    let owner = state.auth().owner().await?;

    request.extensions_mut().insert(Identity {
        current_user,
        owner,
    });

    Ok(next.run(request).await)
}

/// Guard for login-only routes: anonymous requests go to the login form untouched.
pub async fn require_login(
    identity: Identity,
    session: AuthSession,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !identity.is_authenticated() {
        tracing::debug!("Anonymous request to {} redirected to login", request.uri().path());
        session.flash(LOGIN_REQUIRED_MESSAGE).await?;
        return Ok(Redirect::to("/login").into_response());
    }

    Ok(next.run(request).await)
}
