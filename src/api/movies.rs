use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    response::{Html, Redirect},
};
use serde::Deserialize;
use std::sync::Arc;

use super::pages::{self, PageContext};
use super::validation::{INVALID_INPUT, valid_movie};
use super::{ApiError, AppState, AuthSession, Identity};

// ============================================================================
// Request Types
// ============================================================================

/// Missing fields decode as empty and fail validation like blank ones.
#[derive(Debug, Default, Deserialize)]
pub struct MovieForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
}

/// Path ids that are not integers match no movie.
fn parse_movie_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::movie_not_found(raw))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    ctx: PageContext,
) -> Result<Html<String>, ApiError> {
    let movies = state.store().list_movies().await?;
    Ok(Html(pages::index_page(&ctx, &movies)))
}

/// POST /
/// Anonymous submissions are ignored rather than sent to the login form,
/// whatever their body looks like.
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    session: AuthSession,
    form: Result<Form<MovieForm>, FormRejection>,
) -> Result<Redirect, ApiError> {
    if !identity.is_authenticated() {
        return Ok(Redirect::to("/"));
    }

    // An undecodable body is treated like an empty form
    let form = form.map(|Form(form)| form).unwrap_or_default();

    let title = form.title.trim();
    let year = form.year.trim();

    if !valid_movie(title, year) {
        session.flash(INVALID_INPUT).await?;
        return Ok(Redirect::to("/"));
    }

    state.store().create_movie(title, year).await?;
    session.flash("Item created.").await?;

    Ok(Redirect::to("/"))
}

/// GET /movie/edit/{movie_id}
/// The movie is looked up before flashes are taken, so a 404 leaves them queued.
pub async fn edit_page(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    identity: Identity,
    session: AuthSession,
) -> Result<Html<String>, ApiError> {
    let id = parse_movie_id(&movie_id)?;

    let movie = state
        .store()
        .get_movie(id)
        .await?
        .ok_or_else(|| ApiError::movie_not_found(id))?;

    let ctx = PageContext::build(identity, &session).await?;
    Ok(Html(pages::edit_page(&ctx, &movie)))
}

/// POST /movie/edit/{movie_id}
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    session: AuthSession,
    Form(form): Form<MovieForm>,
) -> Result<Redirect, ApiError> {
    let id = parse_movie_id(&movie_id)?;

    if state.store().get_movie(id).await?.is_none() {
        return Err(ApiError::movie_not_found(id));
    }

    let title = form.title.trim();
    let year = form.year.trim();

    if !valid_movie(title, year) {
        session.flash(INVALID_INPUT).await?;
        return Ok(Redirect::to(&format!("/movie/edit/{id}")));
    }

    if !state.store().update_movie(id, title, year).await? {
        return Err(ApiError::movie_not_found(id));
    }
    session.flash("Item updated.").await?;

    Ok(Redirect::to("/"))
}

/// POST /movie/delete/{movie_id}
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    session: AuthSession,
) -> Result<Redirect, ApiError> {
    let id = parse_movie_id(&movie_id)?;

    if !state.store().delete_movie(id).await? {
        return Err(ApiError::movie_not_found(id));
    }
    session.flash("Item deleted.").await?;

    Ok(Redirect::to("/"))
}
