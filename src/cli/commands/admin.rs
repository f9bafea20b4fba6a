//! Administrator account command handler

use anyhow::Context;
use std::io::{BufRead, Write};

use crate::config::Config;
use crate::db::{Store, UpsertOutcome};
use crate::services::{AuthService, SeaOrmAuthService};

pub async fn cmd_admin(
    config: &Config,
    username: Option<String>,
    password: Option<String>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt(input, out, "Username: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => read_password(input, out)?,
    };

    if username.is_empty() || password.is_empty() {
        anyhow::bail!("Username and password must not be empty");
    }

    let store = Store::open(&config.general).await?;
    let auth = SeaOrmAuthService::new(store, config.security.clone());

    match auth.provision_admin(&username, &password).await? {
        UpsertOutcome::Created(_) => writeln!(out, "Creating user...")?,
        UpsertOutcome::Updated(_) => writeln!(out, "Updating user...")?,
    }

    writeln!(out, "Done.")?;
    Ok(())
}

fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str) -> anyhow::Result<String> {
    write!(out, "{label}")?;
    out.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Asks for the password twice and fails when the entries differ.
pub fn read_password(input: &mut impl BufRead, out: &mut impl Write) -> anyhow::Result<String> {
    let password = prompt(input, out, "Password: ")?;
    let confirmation = prompt(input, out, "Repeat for confirmation: ")?;

    if password != confirmation {
        anyhow::bail!("The two entered passwords do not match");
    }

    Ok(password)
}
