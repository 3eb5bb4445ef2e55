//! Snapshot command handlers: export, import, and guest sharing

use std::path::PathBuf;

use anyhow::{Context, Result};

use shelfmark_core::{snapshot, ApiClient, GuestStore};

use crate::output::Output;

/// Export the guest library as JSON, to a file or stdout
pub fn export(store: &GuestStore, file: Option<PathBuf>, output: &Output) -> Result<()> {
    let data = snapshot::export_data(store).context("Failed to export guest data")?;

    match file {
        Some(path) => {
            std::fs::write(&path, &data)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output.success(&format!("Exported guest data to {}", path.display()));
        }
        None => println!("{}", data),
    }
    Ok(())
}

/// Import a previously exported snapshot, replacing the guest library
pub fn import(store: &GuestStore, file: PathBuf, output: &Output) -> Result<()> {
    let data = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    snapshot::import_data(store, &data).context("Failed to import guest data")?;

    output.success(&format!(
        "Imported {} entr{}",
        store.entry_count(),
        if store.entry_count() == 1 { "y" } else { "ies" }
    ));
    Ok(())
}

/// Mint a public read-only link for the current guest library
pub async fn share(store: &GuestStore, api: &ApiClient, output: &Output) -> Result<()> {
    let request = snapshot::snapshot_request(store);
    if request.entries.is_empty() {
        output.message("Nothing to share: the guest library is empty.");
        return Ok(());
    }

    let share = api
        .create_snapshot(&request)
        .await
        .context("Failed to create share link")?;

    if output.is_json() {
        println!("{}", serde_json::to_string_pretty(&share)?);
    } else {
        println!("{}", share.share_url);
    }
    Ok(())
}
