//! Status command handler

use anyhow::Result;

use microblog_core::{Config, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, config: &Config, output: &Output) -> Result<()> {
    let newest = store.len().checked_sub(1).and_then(|i| store.get(i));

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "blog": {
                        "title": config.blog.title,
                        "author": config.blog.author,
                    },
                    "storage": {
                        "path": store.path(),
                        "size": store.file_size(),
                    },
                    "posts": store.len(),
                    "page_size": store.page_size(),
                    "last_post": newest.as_ref().map(|p| p.display_date()),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("{}", config.blog.title);
            println!("{}", "=".repeat(config.blog.title.chars().count()));
            println!();
            println!("Author:    {}", config.blog.author);
            println!();
            println!("Storage:");
            println!("  Location: {}", store.path().display());
            println!("  Size:     {}", human_size(store.file_size()));
            println!();
            println!("Contents:");
            println!("  Posts:     {}", store.len());
            println!("  Page size: {}", store.page_size());
            if let Some(post) = newest {
                println!("  Latest:    {} (#{})", post.display_date(), post.index);
            }
        }
    }

    Ok(())
}

/// Format a byte count for display
fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
