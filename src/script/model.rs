//! Script document model.
//!
//! The script is the persisted boundary between text processing and media
//! rendering. Section order and entry order are the timeline order.

use crate::error::{Result, SlidecastError};
use crate::source::DocumentMetadata;
use crate::text::NarrationUnit;
use serde::{Deserialize, Serialize};

/// Current script format version.
pub const SCRIPT_VERSION: &str = "1.0";

/// Role of a script section in the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Intro,
    Content,
    Outro,
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionKind::Intro => write!(f, "intro"),
            SectionKind::Content => write!(f, "content"),
            SectionKind::Outro => write!(f, "outro"),
        }
    }
}

/// One narrated entry of a section: a spoken sentence or a list block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptEntry {
    Speech(NarrationUnit),
    List { items: Vec<NarrationUnit> },
}

/// A section of the script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSection {
    pub level: u8,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    /// Background asset name (file in the assets directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Transition effect name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
    #[serde(default)]
    pub entries: Vec<ScriptEntry>,
}

impl ScriptSection {
    pub fn new(level: u8, kind: SectionKind, heading: Option<String>) -> Self {
        Self {
            level,
            kind,
            heading,
            background: None,
            animation: None,
            entries: Vec::new(),
        }
    }

    /// Append a spoken sentence.
    pub fn push_speech(&mut self, unit: NarrationUnit) {
        self.entries.push(ScriptEntry::Speech(unit));
    }

    /// Append a list block; empty lists are ignored.
    pub fn push_list(&mut self, items: Vec<NarrationUnit>) {
        if !items.is_empty() {
            self.entries.push(ScriptEntry::List { items });
        }
    }

    /// All narration units in order, list items flattened in place.
    pub fn narration_units(&self) -> impl Iterator<Item = &NarrationUnit> {
        self.entries.iter().flat_map(|entry| match entry {
            ScriptEntry::Speech(unit) => std::slice::from_ref(unit).iter(),
            ScriptEntry::List { items } => items.iter(),
        })
    }

    /// Label for logs and progress messages.
    pub fn label(&self) -> String {
        match &self.heading {
            Some(heading) => format!("{} '{}'", self.kind, heading),
            None => self.kind.to_string(),
        }
    }
}

/// The complete narration script for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptDocument {
    pub version: String,
    pub metadata: DocumentMetadata,
    pub sections: Vec<ScriptSection>,
}

impl ScriptDocument {
    pub fn new(metadata: DocumentMetadata, sections: Vec<ScriptSection>) -> Self {
        Self {
            version: SCRIPT_VERSION.to_string(),
            metadata,
            sections,
        }
    }

    /// Total number of narration units across all sections.
    pub fn unit_count(&self) -> usize {
        self.sections.iter().map(|s| s.narration_units().count()).sum()
    }

    /// Serialize to pretty JSON with a stable field order.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let script: ScriptDocument = serde_json::from_str(json)
            .map_err(|e| SlidecastError::Parse(format!("invalid script: {}", e)))?;

        if script.version != SCRIPT_VERSION {
            return Err(SlidecastError::Parse(format!(
                "unsupported script version '{}' (expected {})",
                script.version, SCRIPT_VERSION
            )));
        }

        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(text: &str, pause: f64) -> NarrationUnit {
        NarrationUnit {
            text: text.to_string(),
            pause,
        }
    }

    fn sample() -> ScriptDocument {
        let mut intro = ScriptSection::new(1, SectionKind::Intro, Some("Introduction".into()));
        intro.push_speech(unit("Welcome.", 0.5));

        let mut content = ScriptSection::new(2, SectionKind::Content, Some("Details".into()));
        content.background = Some("city.png".into());
        content.animation = Some("zoom_in".into());
        content.push_speech(unit("First point.", 0.7));
        content.push_list(vec![unit("one", 0.3), unit("two", 0.3)]);
        content.push_speech(unit("and a fragment", 0.3));

        let mut outro = ScriptSection::new(1, SectionKind::Outro, Some("Conclusion".into()));
        outro.push_speech(unit("Bye.", 1.0));

        ScriptDocument::new(
            DocumentMetadata {
                title: "Sample".into(),
                url: "https://example.com".into(),
                date: "2024-01-01".into(),
            },
            vec![intro, content, outro],
        )
    }

    #[test]
    fn test_json_round_trip() {
        let script = sample();
        let json = script.to_json().unwrap();
        let parsed = ScriptDocument::from_json(&json).unwrap();
        assert_eq!(parsed, script);
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let script = sample();
        assert_eq!(script.to_json().unwrap(), script.clone().to_json().unwrap());
    }

    #[test]
    fn test_json_shape() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"version\": \"1.0\""));
        assert!(json.contains("\"type\": \"intro\""));
        assert!(json.contains("\"speech\""));
        assert!(json.contains("\"list\""));
        assert!(json.find("Introduction").unwrap() < json.find("Details").unwrap());
    }

    #[test]
    fn test_narration_units_flatten_lists_in_place() {
        let script = sample();
        let texts: Vec<&str> = script.sections[1]
            .narration_units()
            .map(|u| u.text.as_str())
            .collect();
        assert_eq!(texts, vec!["First point.", "one", "two", "and a fragment"]);
        assert_eq!(script.unit_count(), 6);
    }

    #[test]
    fn test_rejects_malformed_script() {
        assert!(matches!(
            ScriptDocument::from_json("{\"version\": \"1.0\"}"),
            Err(SlidecastError::Parse(_))
        ));
        let wrong_version = sample().to_json().unwrap().replace("\"1.0\"", "\"9.9\"");
        assert!(matches!(
            ScriptDocument::from_json(&wrong_version),
            Err(SlidecastError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_list_ignored() {
        let mut section = ScriptSection::new(1, SectionKind::Content, None);
        section.push_list(Vec::new());
        assert!(section.entries.is_empty());
    }
}
