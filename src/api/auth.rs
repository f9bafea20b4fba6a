use axum::{
    Form,
    extract::State,
    response::{Html, Redirect},
};
use serde::Deserialize;
use std::sync::Arc;

use super::pages::{self, PageContext};
use super::validation::{INVALID_INPUT, valid_credentials};
use super::{ApiError, AppState, AuthSession};
use crate::services::AuthError;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /login
pub async fn login_page(ctx: PageContext) -> Html<String> {
    Html(pages::login_page(&ctx))
}

/// POST /login
/// Every outcome is a flash plus redirect; only store failures escape as errors.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, ApiError> {
    if !valid_credentials(&form.username, &form.password) {
        session.flash(INVALID_INPUT).await?;
        return Ok(Redirect::to("/login"));
    }

    match state.auth().login(&form.username, &form.password).await {
        Ok(user) => {
            session.login(&user).await?;
            session.flash("Login success.").await?;
            Ok(Redirect::to("/"))
        }
        Err(AuthError::EmptyUserTable) => {
            tracing::warn!("Login attempted while the user table is empty");
            session.flash("Error, the User Table is Empty.").await?;
            Ok(Redirect::to("/"))
        }
        Err(AuthError::InvalidCredentials | AuthError::UserNotFound) => {
            tracing::warn!("Failed login for username {:?}", form.username);
            session.flash("Invalid username or password.").await?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout
pub async fn logout(session: AuthSession) -> Result<Redirect, ApiError> {
    session.logout().await?;
    session.flash("Goodbye.").await?;
    Ok(Redirect::to("/"))
}
