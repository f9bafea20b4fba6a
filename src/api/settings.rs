use axum::{
    Form,
    extract::State,
    response::{Html, Redirect},
};
use serde::Deserialize;
use std::sync::Arc;

use super::pages::{self, PageContext};
use super::validation::{INVALID_INPUT, valid_settings_name};
use super::{ApiError, AppState, AuthSession, Identity};

#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub name: String,
}

/// GET /settings
pub async fn settings_page(ctx: PageContext) -> Html<String> {
    Html(pages::settings_page(&ctx))
}

/// POST /settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    session: AuthSession,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, ApiError> {
    if !valid_settings_name(&form.name) {
        session.flash(INVALID_INPUT).await?;
        return Ok(Redirect::to("/settings"));
    }

    // require_login already ran, so this only trips if the row vanished mid-request
    let Some(user) = identity.current_user else {
        return Ok(Redirect::to("/login"));
    };

    state.auth().rename(user.id, &form.name).await?;
    tracing::info!("User {} renamed to {}", user.id, form.name);
    session.flash("Setting updated.").await?;

    Ok(Redirect::to("/"))
}
