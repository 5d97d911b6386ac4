//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::{Context, Result};
use serde::Serialize;

use microblog_core::{PageEntry, Post};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// JSON body of a page, as served to incremental loaders
#[derive(Serialize)]
struct PageBody {
    data: Vec<PageEntry>,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single post in full
    pub fn print_post(&self, post: &Post) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Index:   {}", post.index);
                println!("Date:    {}", post.display_date());
                if !post.tags.is_empty() {
                    println!("Tags:    {}", post.tags.join(", "));
                }
                println!();
                println!("{}", post.raw_content);
            }
            OutputFormat::Json => print_json(post)?,
            OutputFormat::Quiet => println!("{}", post.index),
        }
        Ok(())
    }

    /// Print one page of posts, in the order given
    pub fn print_posts(&self, posts: &[Post]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if posts.is_empty() {
                    println!("No more posts.");
                    return Ok(());
                }
                for post in posts {
                    println!(
                        "{:>5} | {:>11} | {}",
                        post.index,
                        post.display_date(),
                        truncate_line(&post.raw_content, 60)
                    );
                }
                println!("\n{} post(s)", posts.len());
            }
            OutputFormat::Json => {
                let body = PageBody {
                    data: posts.iter().map(PageEntry::from).collect(),
                };
                print_json(&body)?;
            }
            OutputFormat::Quiet => {
                for post in posts {
                    println!("{}", post.index);
                }
            }
        }
        Ok(())
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[(String, usize)]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return Ok(());
                }
                for (name, count) in tags {
                    println!("#{} ({})", name, count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let json_tags: Vec<_> = tags
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                print_json(&json_tags)?;
            }
            OutputFormat::Quiet => {
                for (name, _) in tags {
                    println!("{}", name);
                }
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte characters are not split
        assert_eq!(truncate("ééééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
        assert_eq!(truncate_line("", 20), "");
    }

    #[test]
    fn test_page_body_shape() {
        let post = Post::from_record(4, "1500000000000\u{1F}hi #there").unwrap();
        let body = PageBody {
            data: vec![PageEntry::from(&post)],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["data"][0]["index"], 4);
        assert_eq!(json["data"][0]["time"], "14 Jul 2017");
        assert!(json["data"][0]["content"]
            .as_str()
            .unwrap()
            .contains("/index?tag=there"));
    }
}
