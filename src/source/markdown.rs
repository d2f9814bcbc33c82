//! Markdown directory source.
//!
//! Reads `*.md` files recursively, parses their YAML front matter and
//! tokenizes the body into sections.

use super::{Document, DocumentMetadata, DocumentSource};
use crate::error::{Result, SlidecastError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Front matter fields used by Slidecast. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: String,
    pub url: String,
    pub date: Option<String>,
}

impl FrontMatter {
    /// Publication date, accepting `YYYY-MM-DD` and RFC 3339 timestamps.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
            .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
    }
}

/// Split a Markdown file into front matter and body.
///
/// Files without a leading `---` block get empty front matter.
pub fn parse_front_matter(content: &str) -> Result<(FrontMatter, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return Ok((FrontMatter::default(), content));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let front: FrontMatter = if yaml.trim().is_empty() {
                FrontMatter::default()
            } else {
                serde_yaml::from_str(yaml)?
            };
            return Ok((front, body));
        }
        offset += line.len();
    }

    Err(SlidecastError::Parse(
        "front matter block is not closed with '---'".to_string(),
    ))
}

/// Source reading Markdown posts from a content directory.
pub struct MarkdownDirSource {
    root: PathBuf,
}

impl MarkdownDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Collect all Markdown files below the root.
    ///
    /// Symlinks are not followed; entries that cannot be read are skipped.
    fn collect_files(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
            {
                files.push(entry.into_path());
            }
        }
        files
    }

    /// Read one file into a document plus its sort key.
    fn read_document(path: &Path) -> Result<(Option<NaiveDate>, Document)> {
        let content = std::fs::read_to_string(path)?;
        let (front, body) = parse_front_matter(&content)?;
        let date = front.parsed_date();

        let title = if front.title.trim().is_empty() {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        } else {
            front.title.trim().to_string()
        };

        let metadata = DocumentMetadata {
            title,
            url: front.url.trim().to_string(),
            date: date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
        };

        Ok((date, Document::from_body(metadata, body)))
    }
}

#[async_trait]
impl DocumentSource for MarkdownDirSource {
    fn name(&self) -> &str {
        "markdown"
    }

    async fn fetch_documents(&self, limit: usize) -> Result<Vec<Document>> {
        if !self.root.is_dir() {
            return Err(SlidecastError::InvalidInput(format!(
                "Content directory not found: {}",
                self.root.display()
            )));
        }

        let files = Self::collect_files(&self.root);
        info!("Found {} Markdown files in {}", files.len(), self.root.display());

        let mut documents = Vec::new();
        for path in files {
            match Self::read_document(&path) {
                Ok((_, doc)) if doc.sections.is_empty() => {
                    debug!("Skipping {:?}: no content", path);
                }
                Ok(entry) => documents.push(entry),
                Err(e) => warn!("Skipping {:?}: {}", path, e),
            }
        }

        // Newest first; undated posts sort last.
        documents.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(documents.into_iter().take(limit).map(|(_, doc)| doc).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_front_matter() {
        let content = "---\ntitle: Hello World\nurl: https://example.com/hello\ndate: 2024-01-15\ntags: [a, b]\n---\n# Heading\nBody text.\n";
        let (front, body) = parse_front_matter(content).unwrap();
        assert_eq!(front.title, "Hello World");
        assert_eq!(front.url, "https://example.com/hello");
        assert_eq!(front.parsed_date(), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(body, "# Heading\nBody text.\n");
    }

    #[test]
    fn test_no_front_matter() {
        let (front, body) = parse_front_matter("# Just markdown\n").unwrap();
        assert!(front.title.is_empty());
        assert_eq!(body, "# Just markdown\n");
    }

    #[test]
    fn test_unclosed_front_matter() {
        assert!(matches!(
            parse_front_matter("---\ntitle: x\n# body"),
            Err(SlidecastError::Parse(_))
        ));
    }

    #[test]
    fn test_rfc3339_date() {
        let front = FrontMatter {
            date: Some("2023-06-01T10:30:00+02:00".to_string()),
            ..Default::default()
        };
        assert_eq!(front.parsed_date(), NaiveDate::from_ymd_opt(2023, 6, 1));
    }

    #[tokio::test]
    async fn test_fetch_sorted_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024");
        std::fs::create_dir_all(&nested).unwrap();

        std::fs::write(
            dir.path().join("old.md"),
            "---\ntitle: Old\ndate: 2023-01-01\n---\n# A\nOld text.\n",
        )
        .unwrap();
        std::fs::write(
            nested.join("new.md"),
            "---\ntitle: New\ndate: 2024-03-01\n---\n# A\nNew text.\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("empty.md"), "---\ntitle: Empty\n---\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let source = MarkdownDirSource::new(dir.path());
        let docs = source.fetch_documents(10).await.unwrap();

        let titles: Vec<&str> = docs.iter().map(|d| d.metadata.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
        assert_eq!(docs[0].metadata.date, "2024-03-01");

        let limited = source.fetch_documents(1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let source = MarkdownDirSource::new("/definitely/not/here");
        assert!(source.fetch_documents(5).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_loop_does_not_duplicate_posts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("post.md"),
            "---\ntitle: Only\ndate: 2024-01-01\n---\n# A\nText.\n",
        )
        .unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let docs = MarkdownDirSource::new(dir.path())
            .fetch_documents(1000)
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.title, "Only");
    }
}
