//! Paragraph segmentation into prose runs and item lists.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn numbered_item() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:\d+|[a-z])[.)]\s+(.+)$").expect("valid list regex"))
}

fn bulleted_item() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[-*•]\s+(.+)$").expect("valid bullet regex"))
}

/// A typed chunk of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentUnit {
    /// Running prose, lines joined with single spaces.
    Text { content: String },
    /// An itemized list; never empty.
    List { items: Vec<String> },
}

/// Return the item text if the line is a numbered or bulleted list item.
fn list_item(line: &str) -> Option<&str> {
    let line = line.trim();
    numbered_item()
        .captures(line)
        .or_else(|| bulleted_item().captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Accumulates lines of one paragraph into content units.
#[derive(Default)]
struct Segmenter {
    units: Vec<ContentUnit>,
    text: Vec<String>,
    items: Vec<String>,
}

impl Segmenter {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let content = std::mem::take(&mut self.text).join(" ");
            self.units.push(ContentUnit::Text { content });
        }
    }

    fn flush_list(&mut self) {
        if !self.items.is_empty() {
            let items = std::mem::take(&mut self.items);
            self.units.push(ContentUnit::List { items });
        }
    }

    fn push_line(&mut self, line: &str) {
        match list_item(line) {
            Some(item) => {
                self.flush_text();
                self.items.push(item.to_string());
            }
            None => {
                self.flush_list();
                let line = line.trim();
                if !line.is_empty() {
                    self.text.push(line.to_string());
                }
            }
        }
    }

    fn finish(mut self) -> Vec<ContentUnit> {
        // Only one buffer can be open at a time, so flush order is irrelevant.
        self.flush_text();
        self.flush_list();
        self.units
    }
}

/// Segment one paragraph's physical lines into content units.
pub fn segment_paragraph<S: AsRef<str>>(lines: &[S]) -> Vec<ContentUnit> {
    let mut segmenter = Segmenter::default();
    for line in lines {
        segmenter.push_line(line.as_ref());
    }
    segmenter.finish()
}

/// Split raw body text on blank lines and segment every paragraph.
pub fn segment_body(body: &str) -> Vec<ContentUnit> {
    let mut units = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in body.lines() {
        if line.trim().is_empty() {
            units.extend(segment_paragraph(&paragraph));
            paragraph.clear();
        } else {
            paragraph.push(line);
        }
    }
    units.extend(segment_paragraph(&paragraph));

    units
}
