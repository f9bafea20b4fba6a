//! HTML pages.
//!
//! Plain string templates; every value that came from a user goes through
//! `html_escape` before it lands in the markup.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::db::{Movie, User};

/// Data shared by every rendered page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub owner: Option<User>,
    pub current_user: Option<User>,
    pub flashes: Vec<String>,
}

impl PageContext {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

/// Base HTML layout wrapper.
#[must_use]
pub fn layout(ctx: &PageContext, title: &str, content: &str) -> String {
    let heading = ctx.owner.as_ref().map_or_else(
        || "Watchlist".to_string(),
        |owner| format!("{}'s Watchlist", encode_text(&owner.name)),
    );

    let nav = if ctx.is_authenticated() {
        r#"<li><a href="/">Home</a></li>
            <li><a href="/settings">Settings</a></li>
            <li><a href="/logout">Logout</a></li>"#
    } else {
        r#"<li><a href="/">Home</a></li>
            <li><a href="/login">Login</a></li>"#
    };

    let flashes: String = ctx
        .flashes
        .iter()
        .map(|message| format!(r#"<div class="alert">{}</div>"#, encode_text(message)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/style.css" type="text/css">
</head>
<body>
    {flashes}
    <h2>{heading}</h2>
    <nav>
        <ul>
            {nav}
        </ul>
    </nav>
    {content}
    <footer>
        <small>&copy; Watchlist</small>
    </footer>
</body>
</html>"#,
        title = encode_text(title),
    )
}

#[must_use]
pub fn index_page(ctx: &PageContext, movies: &[Movie]) -> String {
    let create_form = if ctx.is_authenticated() {
        r#"<form method="post">
        Name <input type="text" name="title" autocomplete="off" required>
        Year <input type="text" name="year" autocomplete="off" required>
        <input class="btn" type="submit" name="submit" value="Add">
    </form>"#
    } else {
        ""
    };

    let rows: String = movies
        .iter()
        .map(|movie| movie_row(ctx, movie))
        .collect();

    let content = format!(
        r#"<p>{count} Titles</p>
    {create_form}
    <ul class="movie-list">
        {rows}
    </ul>"#,
        count = movies.len(),
    );

    layout(ctx, "Watchlist", &content)
}

fn movie_row(ctx: &PageContext, movie: &Movie) -> String {
    let controls = if ctx.is_authenticated() {
        format!(
            r#"<a class="btn" href="/movie/edit/{id}">Edit</a>
                <form class="inline-form" method="post" action="/movie/delete/{id}">
                    <input class="btn" type="submit" name="delete" value="Delete" onclick="return confirm('Are you sure?')">
                </form>"#,
            id = movie.id,
        )
    } else {
        String::new()
    };

    format!(
        r#"<li>{title} - {year}
            <span class="float-right">
                {controls}
            </span>
        </li>"#,
        title = encode_text(&movie.title),
        year = encode_text(&movie.year),
    )
}

#[must_use]
pub fn login_page(ctx: &PageContext) -> String {
    let content = r#"<h3>Login</h3>
    <form method="post">
        Username<br>
        <input type="text" name="username" required><br><br>
        Password<br>
        <input type="password" name="password" required><br><br>
        <input class="btn" type="submit" name="submit" value="Submit">
    </form>"#;

    layout(ctx, "Login", content)
}

#[must_use]
pub fn settings_page(ctx: &PageContext) -> String {
    let name = ctx
        .current_user
        .as_ref()
        .map(|user| user.name.as_str())
        .unwrap_or_default();

    let content = format!(
        r#"<h3>Settings</h3>
    <form method="post">
        Your Name <input type="text" name="name" autocomplete="off" required value="{name}">
        <input class="btn" type="submit" name="submit" value="Save">
    </form>"#,
        name = encode_double_quoted_attribute(name),
    );

    layout(ctx, "Settings", &content)
}

#[must_use]
pub fn edit_page(ctx: &PageContext, movie: &Movie) -> String {
    let content = format!(
        r#"<h3>Edit item</h3>
    <form method="post">
        Name <input type="text" name="title" autocomplete="off" required value="{title}">
        Year <input type="text" name="year" autocomplete="off" required value="{year}">
        <input class="btn" type="submit" name="submit" value="Update">
    </form>
    <a class="btn" href="/">Cancel</a>"#,
        title = encode_double_quoted_attribute(&movie.title),
        year = encode_double_quoted_attribute(&movie.year),
    );

    layout(ctx, "Edit item", &content)
}

#[must_use]
pub fn not_found_page(ctx: &PageContext) -> String {
    let content = r#"<ul class="movie-list">
        <li>
            Page Not Found - 404
            <span class="float-right">
                <a href="/">Go Back</a>
            </span>
        </li>
    </ul>"#;

    layout(ctx, "404", content)
}

#[must_use]
pub fn server_error_page(ctx: &PageContext) -> String {
    let content = r#"<ul class="movie-list">
        <li>
            Internal Server Error - 500
            <span class="float-right">
                <a href="/">Go Back</a>
            </span>
        </li>
    </ul>"#;

    layout(ctx, "500", content)
}
