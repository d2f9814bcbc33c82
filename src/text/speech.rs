//! Narration units: sentence splitting, pause policy and text sanitation.

use super::ContentUnit;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Pause after a sentence that ends with terminal punctuation.
pub const SENTENCE_PAUSE: f64 = 0.7;
/// Pause after an incomplete fragment.
pub const SHORT_PAUSE: f64 = 0.3;
/// Pause after each list item.
pub const LIST_ITEM_PAUSE: f64 = 0.3;

const TERMINALS: [char; 3] = ['.', '!', '?'];

fn emoji_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"[0-9#*]\x{FE0F}?\x{20E3}",
            r"|\p{Extended_Pictographic}",
            r"|[\x{1F1E6}-\x{1F1FF}]",
            r"|[\x{1F3FB}-\x{1F3FF}]",
            r"|[\x{FE0E}\x{FE0F}\x{200D}\x{20E3}]",
            r"|[\x{E0020}-\x{E007F}]",
        ))
        .expect("valid emoji regex")
    })
}

fn unspeakable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s,.!?;:'-]").expect("valid whitelist regex"))
}

/// One sentence or list item, ready for speech synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationUnit {
    /// Sanitized text.
    pub text: String,
    /// Silence after the spoken text, in seconds.
    pub pause: f64,
}

impl NarrationUnit {
    /// Create a unit, sanitizing the text. Returns None if nothing speakable remains.
    pub fn new(text: &str, pause: f64) -> Option<Self> {
        let text = sanitize(text);
        if !text.chars().any(char::is_alphanumeric) {
            debug!("Dropping unit with no speakable text");
            return None;
        }
        Some(Self {
            text,
            pause: pause.max(0.0),
        })
    }
}

/// Strip emoji and symbols, keep word characters and `,.!?;:'-`, collapse whitespace.
pub fn sanitize(text: &str) -> String {
    let text = emoji_pattern().replace_all(text, "");
    let text = unspeakable_pattern().replace_all(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split prose into sentences after `.`, `!` or `?` followed by whitespace.
///
/// Punctuation stays attached to its sentence; a trailing fragment without
/// terminal punctuation is kept as its own sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !TERMINALS.contains(&c) {
            continue;
        }
        if let Some(&(next_idx, next)) = chars.peek() {
            if next.is_whitespace() {
                sentences.push(&text[start..next_idx]);
                start = next_idx;
            }
        }
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn sentence_pause(sentence: &str) -> f64 {
    match sentence.trim_end().chars().last() {
        Some(c) if TERMINALS.contains(&c) => SENTENCE_PAUSE,
        _ => SHORT_PAUSE,
    }
}

/// Narration units for a prose run, one per sentence.
pub fn narrate_text(content: &str) -> Vec<NarrationUnit> {
    split_sentences(content)
        .iter()
        .filter_map(|sentence| NarrationUnit::new(sentence, sentence_pause(sentence)))
        .collect()
}

/// Narration units for a list, one per item in order.
pub fn narrate_list<S: AsRef<str>>(items: &[S]) -> Vec<NarrationUnit> {
    items
        .iter()
        .filter_map(|item| NarrationUnit::new(item.as_ref(), LIST_ITEM_PAUSE))
        .collect()
}

/// Narration units for any content unit.
pub fn narrate_unit(unit: &ContentUnit) -> Vec<NarrationUnit> {
    match unit {
        ContentUnit::Text { content } => narrate_text(content),
        ContentUnit::List { items } => narrate_list(items),
    }
}
