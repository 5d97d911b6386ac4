//! Post command handlers
//!
//! Publishing and paging through posts.

use std::io::{self, Read};

use anyhow::{anyhow, bail, Context, Result};

use microblog_core::{Query, Store};

use crate::editor::{edit_text, stdin_is_piped};
use crate::output::Output;

/// Publish a new post
///
/// Text comes from the argument, from piped stdin, or from the editor,
/// in that order. Surrounding whitespace is trimmed before appending.
pub fn create(store: &Store, text: Option<String>, output: &Output) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None if stdin_is_piped() => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read post from stdin")?;
            buf
        }
        None => strip_comments(&edit_text(EDITOR_TEMPLATE).context("Failed to edit post")?),
    };

    let text = text.trim();
    if text.is_empty() {
        bail!("Post cannot be empty");
    }

    let post = match store.append(text) {
        Ok(post) => post,
        Err(e) => {
            if let Some(hint) = e.recovery_suggestion() {
                eprintln!("Hint: {}", hint);
            }
            return Err(e).context("Failed to publish post");
        }
    };

    output.success(&format!("Published post {}", post.index));
    output.print_post(&post)
}

/// Print one page of posts
pub fn list(
    store: &Store,
    older: Option<String>,
    newer: Option<String>,
    tag: Option<String>,
    limit: Option<usize>,
    output: &Output,
) -> Result<()> {
    let posts = store.query(&page_query(older, newer, tag, limit));
    output.print_posts(&posts)
}

/// Build the page query for `list`; without `--limit` the store's page
/// size applies
fn page_query(
    older: Option<String>,
    newer: Option<String>,
    tag: Option<String>,
    limit: Option<usize>,
) -> Query {
    let query = Query::from_params(older.as_deref(), newer.as_deref(), tag.as_deref());
    match limit {
        Some(limit) => query.with_limit(limit),
        None => query,
    }
}

/// Show a single post
pub fn show(store: &Store, index: usize, output: &Output) -> Result<()> {
    let post = store
        .get(index)
        .ok_or_else(|| anyhow!("Post not found: {}", index))?;

    output.print_post(&post)
}

const EDITOR_TEMPLATE: &str = "\n<!-- Write your post above. Lines starting with <!-- are ignored. -->\n";

/// Remove the editor's comment lines
fn strip_comments(edited: &str) -> String {
    edited
        .lines()
        .filter(|line| !line.trim_start().starts_with("<!--"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_strip_comments() {
        let edited = "first line #tag\nsecond\n<!-- Write your post above. -->\n";
        assert_eq!(strip_comments(edited), "first line #tag\nsecond");
    }

    #[test]
    fn test_create_trims_and_appends() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("entries.txt")).unwrap();

        create(&store, Some("  hello #cli \n".to_string()), &quiet()).unwrap();

        let post = store.get(0).unwrap();
        assert_eq!(post.raw_content, "hello #cli");
        assert_eq!(post.tags, vec!["cli"]);
    }

    #[test]
    fn test_create_rejects_blank() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("entries.txt")).unwrap();

        assert!(create(&store, Some("   ".to_string()), &quiet()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_rejects_separator() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("entries.txt")).unwrap();

        let err = create(&store, Some("a\u{1F}b".to_string()), &quiet()).unwrap_err();
        assert!(format!("{:#}", err).contains("reserved character"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_show_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("entries.txt")).unwrap();

        let err = show(&store, 3, &quiet()).unwrap_err();
        assert!(err.to_string().contains("Post not found"));
    }

    #[test]
    fn test_page_query_from_flags() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("entries.txt")).unwrap();
        for text in ["one #a", "two", "three #a", "four"] {
            store.append(text).unwrap();
        }
        let indices = |query: Query| -> Vec<usize> {
            store.query(&query).iter().map(|p| p.index).collect()
        };

        // A bad cursor falls back to the latest page
        assert_eq!(
            indices(page_query(Some("nope".to_string()), Some("1".to_string()), None, None)),
            vec![3, 2, 1, 0]
        );
        assert!(indices(page_query(Some("0".to_string()), None, None, Some(5))).is_empty());
        assert_eq!(
            indices(page_query(None, Some("1".to_string()), None, Some(2))),
            vec![1, 2]
        );
        assert_eq!(
            indices(page_query(None, None, Some("a".to_string()), None)),
            vec![2, 0]
        );

        list(&store, Some("nope".to_string()), None, None, None, &quiet()).unwrap();
    }
}
