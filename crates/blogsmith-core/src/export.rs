//! Markdown download of the displayed blog post.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const MARKDOWN_EXTENSION: &str = "md";
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Base file name for a topic: spaces become underscores. Path separators
/// are replaced too so the file always lands in the output directory.
pub fn file_stem(topic: &str) -> String {
    topic.replace([' ', '/', '\\'], "_")
}

pub fn file_name(topic: &str) -> String {
    format!("{}.{}", file_stem(topic), MARKDOWN_EXTENSION)
}

/// Write `content` to `<dir>/<file_name(topic)>`, replacing any existing file.
pub fn save_markdown(dir: &Path, topic: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(file_name(topic));
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = content.len(), "saved blog markdown");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_stem_replaces_spaces() {
        assert_eq!(file_stem("AI in Education"), "AI_in_Education");
        assert_eq!(file_stem("Rust"), "Rust");
    }

    #[test]
    fn test_file_name_has_markdown_extension() {
        assert_eq!(file_name("AI in Education"), "AI_in_Education.md");
    }

    #[test]
    fn test_path_separators_do_not_escape() {
        assert_eq!(file_name("../etc/passwd"), ".._etc_passwd.md");
    }

    #[test]
    fn test_save_markdown_writes_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("posts");

        let path = save_markdown(&out, "AI in Education", "# Hello").unwrap();

        assert_eq!(path, out.join("AI_in_Education.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Hello");
    }

    #[test]
    fn test_save_markdown_overwrites() {
        let dir = TempDir::new().unwrap();
        save_markdown(dir.path(), "post", "first").unwrap();
        let path = save_markdown(dir.path(), "post", "second").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "second");
    }
}
