//! config command - Write or show the ApiSet.ini configuration

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use crate::core::config::{self, ApiConfig};
use crate::core::paths::StoragePaths;

/// Write the default config file.
pub fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => StoragePaths::discover()
            .context("Failed to locate documents directory")?
            .user_config_path(),
    };

    if target.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            target.display()
        );
    }

    config::write_default(&target)?;
    println!("Wrote default config to {}", target.display());
    Ok(())
}

/// Print the effective config with the token and secret masked.
pub fn show(path: Option<&Path>) -> Result<()> {
    let (config, source) = match path {
        Some(p) => (config::read(p)?, Some(p.to_path_buf())),
        None => {
            let paths =
                StoragePaths::discover().context("Failed to locate documents directory")?;
            let explicit = config::env_config_path();
            let loaded = config::load(&paths, explicit.as_deref())?;
            if let Some(created) = &loaded.created {
                println!("No config found; created {}", created.display());
            }
            (loaded.config, loaded.loaded_from)
        }
    };

    match source {
        Some(p) => println!("Source: {}", p.display()),
        None => println!("Source: defaults"),
    }
    println!("{}", render(&config)?);
    match config.export_target() {
        Ok(_) => println!("Export: enabled"),
        Err(reason) => println!("Export: off ({})", reason),
    }
    Ok(())
}

fn render(config: &ApiConfig) -> Result<String> {
    serde_json::to_string_pretty(&config.redacted()).context("Failed to encode config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ApiSet.ini");

        init(Some(&path), false).unwrap();
        assert!(path.exists());
        assert!(init(Some(&path), false).is_err());
        init(Some(&path), true).unwrap();
    }

    #[test]
    fn rendered_config_masks_secrets() {
        let config = ApiConfig::parse("ApiToken=abc123\nSecret=s3cr3t\nApiEndpoint=https://x.io");
        let text = render(&config).unwrap();
        assert!(!text.contains("abc123"));
        assert!(!text.contains("s3cr3t"));
        assert!(text.contains("https://x.io"));
    }
}
