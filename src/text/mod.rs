//! Text processing: from raw document bodies to narration units.
//!
//! The stages run in order:
//!
//! - `sections` splits a document body on Markdown headings
//! - `paragraphs` splits a paragraph into prose runs and item lists
//! - `speech` turns those units into sanitized, pause-annotated narration

mod paragraphs;
mod sections;
mod speech;

pub use paragraphs::{segment_body, segment_paragraph, ContentUnit};
pub use sections::{tokenize_sections, Section};
pub use speech::{
    narrate_list, narrate_text, narrate_unit, sanitize, split_sentences, NarrationUnit,
    LIST_ITEM_PAUSE, SENTENCE_PAUSE, SHORT_PAUSE,
};
