use std::io::{self, Write};
use std::path::Path;

use race_buddy_core::backup::{encode, BackupStore, MarkerStore};
use race_buddy_core::util::now_millis;

use crate::commands::common::Session;
use crate::error::CliError;

/// Render local data in the backup file format without touching the folder
pub async fn render_export(session: &Session) -> Result<Vec<u8>, CliError> {
    let data = session.db.export_all().await?;
    let at = session
        .backup
        .engine()
        .marker()
        .load()
        .unwrap_or_else(now_millis);
    let mut bytes = encode(data, at).to_json()?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub async fn run_export(session: &Session, output_path: Option<&Path>) -> Result<(), CliError> {
    let bytes = render_export(session).await?;

    if let Some(path) = output_path {
        std::fs::write(path, &bytes)?;
        println!("{}", path.display());
    } else {
        io::stdout().write_all(&bytes)?;
    }

    Ok(())
}
