//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use microblog_core::Config;

use crate::output::{Output, OutputFormat};

/// Keys accepted by `config set`
const KEYS: &str =
    "data_dir, page_size, log_file, blog.title, blog.author, blog.description, blog.keywords";

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
                    "page_size": config.page_size,
                    "log_file": config.log_file,
                    "blog": config.blog,
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
            println!("  data_dir:         {}", config.data_dir.display());
            println!("  page_size:        {}", config.page_size);
            println!(
                "  log_file:         {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  blog.title:       {}", config.blog.title);
            println!("  blog.author:      {}", config.blog.author);
            println!("  blog.description: {}", config.blog.description);
            println!("  blog.keywords:    {}", config.blog.keywords);
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

    match config_path {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
    .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => config.data_dir = value.into(),
        "page_size" => {
            config.page_size = value
                .parse()
                .context("Invalid value for page_size. Use a whole number.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        "blog.title" => config.blog.title = value.to_string(),
        "blog.author" => config.blog.author = value.to_string(),
        "blog.description" => config.blog.description = value.to_string(),
        "blog.keywords" => config.blog.keywords = value.to_string(),
        _ => bail!(
            "Unknown configuration key: '{}'\nValid keys: {}",
            key,
            KEYS
        ),
    }
    Ok(())
}
