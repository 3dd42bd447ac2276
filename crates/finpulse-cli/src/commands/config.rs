//! Configuration display

use std::path::Path;

use anyhow::{Context, Result};
use finpulse_core::config::default_config_path;

use super::load_config;

pub fn cmd_config(config_path: Option<&Path>, show_path: bool) -> Result<()> {
    if show_path {
        match config_path
            .map(Path::to_path_buf)
            .or_else(default_config_path)
        {
            Some(path) => {
                let state = if path.exists() { "" } else { " (not present)" };
                println!("{}{}", path.display(), state);
            }
            None => println!("(no data directory available)"),
        }
        return Ok(());
    }

    let config = load_config(config_path)?;
    let rendered = config.to_toml().context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
