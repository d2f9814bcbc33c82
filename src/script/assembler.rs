//! Builds a script document from a parsed document.

use super::model::{ScriptDocument, ScriptSection, SectionKind};
use crate::config::ScriptSettings;
use crate::source::Document;
use crate::text::{
    narrate_list, narrate_text, sanitize, segment_paragraph, ContentUnit, NarrationUnit, Section,
};
use tracing::{debug, instrument};

/// Pause after each intro line.
pub const INTRO_PAUSE: f64 = 0.5;
/// Pause after the closing line.
pub const OUTRO_PAUSE: f64 = 1.0;

/// Assembles intro, content sections and outro into a script.
#[derive(Debug, Clone)]
pub struct ScriptAssembler {
    settings: ScriptSettings,
}

impl Default for ScriptAssembler {
    fn default() -> Self {
        Self::new(ScriptSettings::default())
    }
}

impl ScriptAssembler {
    pub fn new(settings: ScriptSettings) -> Self {
        Self { settings }
    }

    /// Build the script for a document.
    #[instrument(skip_all, fields(title = %document.metadata.title))]
    pub fn assemble(&self, document: &Document) -> ScriptDocument {
        let mut sections = Vec::with_capacity(document.sections.len() + 2);
        sections.push(self.intro(&document.metadata.title));

        for section in &document.sections {
            let script_section = self.content_section(section);
            debug!(
                "Section '{}' -> {} narration units",
                section.title,
                script_section.narration_units().count()
            );
            sections.push(script_section);
        }

        sections.push(self.outro());
        ScriptDocument::new(document.metadata.clone(), sections)
    }

    fn intro(&self, title: &str) -> ScriptSection {
        let mut intro = ScriptSection::new(
            1,
            SectionKind::Intro,
            Some(self.settings.intro_heading.clone()),
        );
        if let Some(unit) = NarrationUnit::new(&self.settings.intro_text, INTRO_PAUSE) {
            intro.push_speech(unit);
        }
        if !title.trim().is_empty() {
            let line = self.settings.title_template.replace("{title}", title.trim());
            if let Some(unit) = NarrationUnit::new(&line, INTRO_PAUSE) {
                intro.push_speech(unit);
            }
        }
        intro
    }

    fn outro(&self) -> ScriptSection {
        let mut outro = ScriptSection::new(
            1,
            SectionKind::Outro,
            Some(self.settings.outro_heading.clone()),
        );
        if let Some(unit) = NarrationUnit::new(&self.settings.outro_text, OUTRO_PAUSE) {
            outro.push_speech(unit);
        }
        outro
    }

    fn content_section(&self, section: &Section) -> ScriptSection {
        let heading = Some(sanitize(&section.title)).filter(|h| !h.is_empty());
        let mut script_section = ScriptSection::new(section.level, SectionKind::Content, heading);
        script_section.animation = self.settings.animation.clone();

        for paragraph in &section.paragraphs {
            for unit in segment_paragraph(paragraph) {
                match unit {
                    ContentUnit::Text { content } => {
                        for sentence in narrate_text(&content) {
                            script_section.push_speech(sentence);
                        }
                    }
                    ContentUnit::List { items } => script_section.push_list(narrate_list(&items)),
                }
            }
        }

        script_section
    }
}
