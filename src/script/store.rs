//! Saving, loading and listing script files.

use super::model::ScriptDocument;
use crate::error::{Result, SlidecastError};
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Maximum number of title characters used in file names.
const TITLE_CHARS: usize = 30;
const SCRIPT_EXTENSION: &str = "json";
/// Highest `_N` suffix tried before giving up.
const MAX_SUFFIX: u32 = 10_000;

/// Turn a title into a file-name-safe slug of at most `max_chars` characters.
pub fn slugify(title: &str, max_chars: usize) -> String {
    let mut slug = String::new();
    let mut last_was_sep = true;

    for c in title.chars().take(max_chars) {
        if c.is_alphanumeric() {
            slug.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }

    let slug = slug.trim_end_matches('_').to_string();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Base file name (without suffix or extension) for a script.
pub fn script_stem(title: &str, timestamp: DateTime<Local>) -> String {
    format!(
        "script_{}_{}",
        slugify(title, TITLE_CHARS),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Write `contents` to `dir/<stem>.<ext>`, adding `_2`, `_3`, … when taken.
///
/// Uses create-new so concurrent writers never overwrite each other.
pub fn write_unique(dir: &Path, stem: &str, extension: &str, contents: &[u8]) -> Result<PathBuf> {
    write_unique_within(dir, stem, extension, contents, MAX_SUFFIX)
}

fn write_unique_within(
    dir: &Path,
    stem: &str,
    extension: &str,
    contents: &[u8],
    max_attempts: u32,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    for attempt in 1..=max_attempts {
        let name = if attempt == 1 {
            format!("{}.{}", stem, extension)
        } else {
            format!("{}_{}.{}", stem, attempt, extension)
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents)?;
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!("{:?} exists, trying next suffix", path);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(SlidecastError::InvalidInput(format!(
        "{} files named {}.{} already exist in {}",
        max_attempts,
        stem,
        extension,
        dir.display()
    )))
}

/// Persist a script in `dir` and return its path.
pub fn save_script(script: &ScriptDocument, dir: &Path) -> Result<PathBuf> {
    let json = script.to_json()?;
    let stem = script_stem(&script.metadata.title, Local::now());
    let path = write_unique(dir, &stem, SCRIPT_EXTENSION, json.as_bytes())?;
    info!("Script saved to {}", path.display());
    Ok(path)
}

/// Load a script file.
pub fn load_script(path: &Path) -> Result<ScriptDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SlidecastError::Parse(format!("cannot read script {}: {}", path.display(), e))
    })?;
    ScriptDocument::from_json(&content)
}

/// List script files in `dir`, newest first.
pub fn list_scripts(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut scripts: Vec<(std::time::SystemTime, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().and_then(|e| e.to_str()) == Some(SCRIPT_EXTENSION)
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("script_"))
        })
        .filter_map(|p| match p.metadata().and_then(|m| m.modified()) {
            Ok(modified) => Some((modified, p)),
            Err(e) => {
                warn!("Cannot stat {:?}: {}", p, e);
                None
            }
        })
        .collect();

    scripts.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    Ok(scripts.into_iter().map(|(_, p)| p).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{ScriptSection, SectionKind};
    use crate::source::DocumentMetadata;
    use chrono::TimeZone;

    fn script(title: &str) -> ScriptDocument {
        ScriptDocument::new(
            DocumentMetadata {
                title: title.to_string(),
                ..Default::default()
            },
            vec![ScriptSection::new(1, SectionKind::Intro, None)],
        )
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!", 30), "Hello_World");
        assert_eq!(slugify("  ../etc/passwd ", 30), "etc_passwd");
        assert_eq!(slugify("🚀🚀", 30), "untitled");
        assert_eq!(slugify("Perché Rust è veloce", 30), "Perché_Rust_è_veloce");
        assert_eq!(slugify("abcdefghij", 4), "abcd");
    }

    #[test]
    fn test_script_stem_format() {
        let ts = Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(script_stem("My Post", ts), "script_My_Post_20240506_070809");
    }

    #[test]
    fn test_same_second_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_unique(dir.path(), "script_x", "json", b"1").unwrap();
        let second = write_unique(dir.path(), "script_x", "json", b"2").unwrap();
        let third = write_unique(dir.path(), "script_x", "json", b"3").unwrap();

        assert_eq!(first.file_name().unwrap(), "script_x.json");
        assert_eq!(second.file_name().unwrap(), "script_x_2.json");
        assert_eq!(third.file_name().unwrap(), "script_x_3.json");
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "1");
    }

    #[test]
    fn test_save_load_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let a = save_script(&script("Post A"), dir.path()).unwrap();
        let b = save_script(&script("Post A"), dir.path()).unwrap();
        assert_ne!(a, b);
        std::fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let listed = list_scripts(dir.path()).unwrap();
        assert_eq!(listed.len(), 2);

        let loaded = load_script(&a).unwrap();
        assert_eq!(loaded.metadata.title, "Post A");
    }

    #[test]
    fn test_load_missing_is_parse_error() {
        assert!(matches!(
            load_script(Path::new("/no/such/script.json")),
            Err(SlidecastError::Parse(_))
        ));
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        assert!(list_scripts(Path::new("/no/such/dir")).unwrap().is_empty());
    }

    #[test]
    fn test_exhausted_suffixes_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_unique_within(dir.path(), "script_y", "json", b"1", 2).unwrap();
        write_unique_within(dir.path(), "script_y", "json", b"2", 2).unwrap();

        let result = write_unique_within(dir.path(), "script_y", "json", b"3", 2);
        assert!(matches!(result, Err(SlidecastError::InvalidInput(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
