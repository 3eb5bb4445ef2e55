//! Status command: a summary of the local library and session

use anyhow::Result;
use serde_json::json;

use shelfmark_core::{AuthState, Config, GuestStore};

use crate::output::Output;

pub fn show(store: &GuestStore, state: &AuthState, config: &Config, output: &Output) -> Result<()> {
    let entry_count = store.entry_count();
    let collection_count = store.collections().len();
    let device_id = store.identity().peek();

    if output.is_json() {
        let value = json!({
            "mode": if state.is_guest() { "guest" } else { "authenticated" },
            "user": state.user().map(|u| u.email.clone()),
            "device_id": device_id.map(|id| id.to_string()),
            "entries": entry_count,
            "collections": collection_count,
            "data_dir": config.data_dir,
            "api_url": config.api_url,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match state.user() {
        Some(user) => println!("Mode:        logged in as {}", user.email),
        None => println!("Mode:        guest"),
    }
    if let Some(id) = device_id {
        println!("Device:      {}", id);
    }
    println!("Entries:     {}", entry_count);
    println!("Collections: {}", collection_count);
    println!("Data dir:    {}", config.data_dir.display());
    println!("API:         {}", config.api_url);
    Ok(())
}

/// Wipe all local guest data and the device identifier
pub fn clear(store: &GuestStore, output: &Output) -> Result<()> {
    store.clear()?;
    output.success("Cleared all local guest data.");
    Ok(())
}
