//! Heading-based section tokenizer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid heading regex"))
}

/// A heading-delimited block of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading level (1-6), or 0 for text before the first heading.
    pub level: u8,
    /// Heading text (empty for level 0).
    pub title: String,
    /// Trimmed, non-blank body lines grouped by blank-line separated paragraphs.
    pub paragraphs: Vec<Vec<String>>,
}

impl Section {
    fn new(level: u8, title: String) -> Self {
        Self {
            level,
            title,
            paragraphs: Vec::new(),
        }
    }

    /// All body lines in document order.
    pub fn body_lines(&self) -> impl Iterator<Item = &str> {
        self.paragraphs.iter().flatten().map(String::as_str)
    }

    /// Whether the section has any body text.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(Vec::is_empty)
    }

    fn push_line(&mut self, line: &str, paragraph_open: bool) {
        match self.paragraphs.last_mut() {
            Some(current) if paragraph_open => current.push(line.to_string()),
            _ => self.paragraphs.push(vec![line.to_string()]),
        }
    }
}

/// Split a document body into sections by Markdown heading lines.
///
/// Sections without body lines are dropped. Text before the first heading is
/// returned as a level-0 section with an empty title.
pub fn tokenize_sections(body: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section::new(0, String::new());
    let mut paragraph_open = false;

    for line in body.lines() {
        if let Some(caps) = heading_pattern().captures(line) {
            let finished = std::mem::replace(
                &mut current,
                Section::new(caps[1].len() as u8, caps[2].trim().to_string()),
            );
            if !finished.is_empty() {
                sections.push(finished);
            }
            paragraph_open = false;
        } else if line.trim().is_empty() {
            paragraph_open = false;
        } else {
            current.push_line(line.trim(), paragraph_open);
            paragraph_open = true;
        }
    }

    if !current.is_empty() {
        sections.push(current);
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_open_sections() {
        let text = "# Title\nIntro line.\n\n## Details\nFirst.\nSecond.\n";
        let sections = tokenize_sections(text);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].level, 1);
        assert_eq!(sections[0].title, "Title");
        assert_eq!(sections[1].level, 2);
        assert_eq!(sections[1].title, "Details");
        assert_eq!(
            sections[1].body_lines().collect::<Vec<_>>(),
            vec!["First.", "Second."]
        );
    }

    #[test]
    fn test_leading_text_is_level_zero() {
        let sections = tokenize_sections("Preamble text.\n# Heading\nBody.");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].level, 0);
        assert!(sections[0].title.is_empty());
        assert_eq!(sections[0].paragraphs, vec![vec!["Preamble text.".to_string()]]);
    }

    #[test]
    fn test_empty_sections_dropped() {
        let sections = tokenize_sections("# Empty\n\n## Also empty\n### Full\ncontent");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Full");
    }

    #[test]
    fn test_blank_lines_split_paragraphs() {
        let sections = tokenize_sections("# A\nline one\nline two\n\n   \nline three");
        assert_eq!(
            sections[0].paragraphs,
            vec![
                vec!["line one".to_string(), "line two".to_string()],
                vec!["line three".to_string()],
            ]
        );
    }

    #[test]
    fn test_body_lines_preserve_all_non_heading_lines() {
        let text = "intro\n# One\n  a  \nb\n\n## Two\nc\n\n\nd\n####### not a heading\n#nospace";
        let sections = tokenize_sections(text);

        let joined: Vec<&str> = sections.iter().flat_map(|s| s.body_lines()).collect();
        let expected: Vec<&str> = text
            .lines()
            .filter(|l| !l.trim().is_empty() && !heading_pattern().is_match(l))
            .map(str::trim)
            .collect();

        assert_eq!(joined, expected);
    }

    #[test]
    fn test_heading_needs_whitespace() {
        let sections = tokenize_sections("#hashtag line\n# Real\ntext");
        assert_eq!(sections[0].level, 0);
        assert_eq!(sections[0].paragraphs[0][0], "#hashtag line");
    }
}
