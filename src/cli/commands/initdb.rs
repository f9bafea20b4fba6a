//! Schema creation command handler

use std::io::Write;

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_initdb(config: &Config, drop: bool, out: &mut impl Write) -> anyhow::Result<()> {
    // Opening the store applies pending migrations, which creates missing tables
    let store = Store::open(&config.general).await?;

    if drop {
        store.reset_schema().await?;
        writeln!(out, "Successfully deleted the current database.")?;
    }

    writeln!(out, "Initialized database.")?;
    Ok(())
}
