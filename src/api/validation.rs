//! Field rules checked before any store mutation.
//!
//! Lengths count characters, not bytes, so non-ASCII titles get the same limits.

pub const MAX_TITLE_LEN: usize = 60;
pub const YEAR_LEN: usize = 4;
pub const MAX_NAME_LEN: usize = 20;

/// Message flashed whenever a form fails these checks.
pub const INVALID_INPUT: &str = "Invalid input.";

#[must_use]
pub fn valid_movie(title: &str, year: &str) -> bool {
    let title = title.trim();
    let year = year.trim();

    !title.is_empty()
        && title.chars().count() <= MAX_TITLE_LEN
        && !year.is_empty()
        && year.chars().count() == YEAR_LEN
}

#[must_use]
pub fn valid_settings_name(name: &str) -> bool {
    !name.is_empty() && name.chars().count() <= MAX_NAME_LEN
}

#[must_use]
pub const fn valid_credentials(username: &str, password: &str) -> bool {
    !username.is_empty() && !password.is_empty()
}
