//! Google Translate text-to-speech.

use super::Synthesizer;
use crate::config::NarrationSettings;
use crate::error::{Result, SlidecastError};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// The endpoint rejects longer inputs.
const MAX_CHUNK_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) slidecast";

/// Split text into chunks of at most `max_chars` characters on word boundaries.
///
/// A single word longer than `max_chars` is split by characters.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if !current.is_empty() && current_len + 1 + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
        }

        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Synthesizer backed by the public Google Translate TTS endpoint.
pub struct GttsSynthesizer {
    client: reqwest::Client,
}

impl GttsSynthesizer {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_settings(settings: &NarrationSettings) -> Result<Self> {
        let secs = if settings.timeout_seconds == 0 {
            120
        } else {
            settings.timeout_seconds
        };
        Self::new(Duration::from_secs(secs))
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
        language: &str,
    ) -> Result<Vec<u8>> {
        let index = index.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language),
                ("client", "tw-ob"),
                ("idx", index.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Synthesizer for GttsSynthesizer {
    fn name(&self) -> &str {
        "gtts"
    }

    fn extension(&self) -> &str {
        "mp3"
    }

    #[instrument(skip(self, text))]
    async fn synthesize(&self, text: &str, output: &Path, language: &str) -> Result<()> {
        let language = language.to_lowercase();
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SlidecastError::Synthesis("nothing to synthesize".into()));
        }

        // MP3 frames can be concatenated directly.
        let mut audio = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, i, chunks.len(), &language).await?);
        }

        if audio.is_empty() {
            return Err(SlidecastError::Synthesis("empty response from gtts".into()));
        }

        tokio::fs::write(output, &audio).await.map_err(|e| {
            SlidecastError::Synthesis(format!("cannot write {}: {}", output.display(), e))
        })?;
        debug!("Wrote {} bytes from {} chunks", audio.len(), chunks.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        assert_eq!(split_text("Hello world.", 100), vec!["Hello world."]);
        assert!(split_text("   ", 100).is_empty());
    }

    #[test]
    fn test_chunks_respect_limit_and_order() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = split_text(text, 15);
        assert!(chunks.iter().all(|c| c.chars().count() <= 15));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_long_word_is_split() {
        let chunks = split_text("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }
}
