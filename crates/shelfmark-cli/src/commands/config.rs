//! Config command handlers

use anyhow::{bail, Context, Result};

use shelfmark_core::Config;

use crate::output::Output;

pub fn show(config: &Config, output: &Output) -> Result<()> {
    if output.is_json() {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("Config file: {}", Config::config_file_path().display());
    println!("data_dir = {}", config.data_dir.display());
    println!("api_url  = {}", config.api_url);
    Ok(())
}

pub fn set(config: &mut Config, key: String, value: String, output: &Output) -> Result<()> {
    match key.as_str() {
        "data_dir" => config.data_dir = value.into(),
        "api_url" => config.api_url = value,
        other => bail!("Unknown config key: {} (expected data_dir or api_url)", other),
    }

    config.save().context("Failed to save config")?;
    output.success(&format!("Set {}", key));
    Ok(())
}
