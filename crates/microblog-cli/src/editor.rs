//! Interactive input
//!
//! Post text can come from $EDITOR when it isn't given on the command
//! line or piped in.

use std::env;
use std::fs;
use std::io::Write;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Editors tried when neither $EDITOR nor $VISUAL is set
const FALLBACK_EDITORS: [&str; 4] = ["nano", "vim", "vi", "notepad"];

/// Open `initial_content` in the user's editor and return what was saved
pub fn edit_text(initial_content: &str) -> Result<String> {
    let editor = find_editor()?;

    let mut draft = tempfile::Builder::new()
        .prefix("microblog-post-")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create draft file")?;
    draft
        .write_all(initial_content.as_bytes())
        .and_then(|_| draft.flush())
        .with_context(|| format!("Failed to write draft file: {:?}", draft.path()))?;

    let status = Command::new(&editor)
        .arg(draft.path())
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        bail!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        );
    }

    // Editors may replace the file rather than write through our handle
    fs::read_to_string(draft.path())
        .with_context(|| format!("Failed to read draft file: {:?}", draft.path()))
}

/// Whether stdin is a pipe or file rather than a terminal
pub fn stdin_is_piped() -> bool {
    !atty::is(atty::Stream::Stdin)
}

fn find_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    if let Some(editor) = FALLBACK_EDITORS.iter().find(|e| command_exists(e)) {
        return Ok(editor.to_string());
    }

    bail!(
        "No editor found. Set $EDITOR, pipe the post on stdin, or pass it as an argument.\n\
         Example: microblog post \"hello #world\""
    )
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_editor_does_not_panic() {
        // Depends on the environment, so only check it returns
        let _ = find_editor();
    }

    #[test]
    fn test_command_exists() {
        #[cfg(unix)]
        assert!(command_exists("ls"));

        assert!(!command_exists("definitely_not_a_real_command_12345"));
    }
}
