//! The `campus init` command.

use std::path::Path;

use anyhow::{Context, Result};

use campus_client::config::SAMPLE_CONFIG;

pub fn execute(force: bool) -> Result<()> {
    let path = Path::new("campus.toml");
    if path.exists() && !force {
        println!("campus.toml already exists, skipping. Use --force to overwrite.");
        return Ok(());
    }
    std::fs::write(path, SAMPLE_CONFIG).context("failed to write campus.toml")?;
    println!("Created campus.toml");

    println!("\nNext steps:");
    println!("  1. Point base_url in campus.toml at your LMS backend");
    println!("  2. Run: campus login --username <name> --password <password>");
    println!("  3. Run: campus dashboard");

    Ok(())
}
