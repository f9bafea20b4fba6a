//! Demo data command handler

use std::io::Write;

use crate::config::Config;
use crate::db::Store;

pub const DEMO_USER_NAME: &str = "ZHS";

pub const DEMO_MOVIES: [(&str, &str); 10] = [
    ("My Neighbor Totoro", "1988"),
    ("Dead Poets Society", "1989"),
    ("A Perfect World", "1993"),
    ("Leon", "1994"),
    ("Mahjong", "1996"),
    ("Swallowtail Butterfly", "1996"),
    ("King of Comedy", "1999"),
    ("Devils on the Doorstep", "1999"),
    ("WALL-E", "2008"),
    ("The Pork of Music", "2012"),
];

/// Seeds a display-only user (no credentials) and the demo movies.
pub async fn cmd_forge(config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    let store = Store::open(&config.general).await?;

    store.create_user(DEMO_USER_NAME, None, None).await?;
    for (title, year) in DEMO_MOVIES {
        store.create_movie(title, year).await?;
    }

    writeln!(out, "Done.")?;
    Ok(())
}
