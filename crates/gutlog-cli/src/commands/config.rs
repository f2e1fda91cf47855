//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use gutlog_core::Config;

use crate::output::{Output, OutputFormat};

const KEYS: &str = "data_dir, log_file, recipe_base_url, future_tolerance_minutes";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "log_file": config.log_file,
                    "recipe_base_url": config.recipe_base_url,
                    "future_tolerance_minutes": config.future_tolerance_minutes
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:                 {}", config.data_dir.display());
            println!(
                "  log_file:                 {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  recipe_base_url:          {}", config.recipe_base_url);
            println!(
                "  future_tolerance_minutes: {}",
                config.future_tolerance_minutes
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            if value.trim().is_empty() {
                bail!("data_dir cannot be empty");
            }
            config.data_dir = value.into();
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        "recipe_base_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                bail!("recipe_base_url must start with http:// or https://");
            }
            config.recipe_base_url = value.trim_end_matches('/').to_string();
        }
        "future_tolerance_minutes" => {
            let minutes: i64 = value
                .parse()
                .context("Invalid value for future_tolerance_minutes. Use a whole number.")?;
            if minutes < 0 {
                bail!("future_tolerance_minutes cannot be negative");
            }
            config.future_tolerance_minutes = minutes;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                KEYS
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "log_file", "/tmp/gutlog.log").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/gutlog.log")));
        apply(&mut config, "log_file", "none").unwrap();
        assert!(config.log_file.is_none());

        apply(&mut config, "recipe_base_url", "http://localhost:8080/api/").unwrap();
        assert_eq!(config.recipe_base_url, "http://localhost:8080/api");

        apply(&mut config, "future_tolerance_minutes", "15").unwrap();
        assert_eq!(config.future_tolerance_minutes, 15);
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply(&mut config, "future_tolerance_minutes", "-1").is_err());
        assert!(apply(&mut config, "future_tolerance_minutes", "soon").is_err());
        assert!(apply(&mut config, "recipe_base_url", "ftp://x").is_err());
        assert!(apply(&mut config, "data_dir", " ").is_err());
        assert!(apply(&mut config, "sync_url", "x").is_err());
    }
}
