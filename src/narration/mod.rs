//! Speech synthesis abstraction for Slidecast.
//!
//! This module provides a trait-based abstraction for text-to-speech
//! providers, plus the renderer that turns a narration unit into a measured
//! audio clip.

mod gtts;
mod local;
mod openai;
mod renderer;

pub use gtts::{split_text, GttsSynthesizer};
pub use local::LocalSynthesizer;
pub use openai::{create_client, OpenAiSynthesizer};
pub use renderer::{AudioClip, NarrationRenderer, Narrator};

use crate::config::{NarrationSettings, ProviderKind};
use crate::error::{Result, SlidecastError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Trait for text-to-speech providers.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// File extension of the audio this provider writes.
    fn extension(&self) -> &str;

    /// Synthesize `text` in `language` and write the audio to `output`.
    async fn synthesize(&self, text: &str, output: &Path, language: &str) -> Result<()>;
}

/// Constructor for a synthesizer from narration settings.
pub type SynthesizerConstructor = fn(&NarrationSettings) -> Result<Arc<dyn Synthesizer>>;

fn build_local(settings: &NarrationSettings) -> Result<Arc<dyn Synthesizer>> {
    Ok(Arc::new(LocalSynthesizer::from_settings(settings)?))
}

fn build_gtts(settings: &NarrationSettings) -> Result<Arc<dyn Synthesizer>> {
    Ok(Arc::new(GttsSynthesizer::from_settings(settings)?))
}

fn build_openai(settings: &NarrationSettings) -> Result<Arc<dyn Synthesizer>> {
    Ok(Arc::new(OpenAiSynthesizer::from_settings(settings)?))
}

/// Look up the constructor registered for a provider.
pub fn constructor(kind: ProviderKind) -> SynthesizerConstructor {
    match kind {
        ProviderKind::Local => build_local,
        ProviderKind::Gtts => build_gtts,
        ProviderKind::OpenAi => build_openai,
    }
}

/// Create the synthesizer selected in the settings.
///
/// A configuration error in the primary provider switches to
/// `settings.fallback` when one is set.
pub fn create_synthesizer(settings: &NarrationSettings) -> Result<Arc<dyn Synthesizer>> {
    match constructor(settings.provider)(settings) {
        Err(SlidecastError::Config(reason)) => match settings.fallback {
            Some(fallback) if fallback != settings.provider => {
                warn!(
                    "{} provider unavailable ({}), falling back to {}",
                    settings.provider, reason, fallback
                );
                constructor(fallback)(settings)
            }
            _ => Err(SlidecastError::Config(reason)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_builds_local() {
        let settings = NarrationSettings::default();
        let synth = create_synthesizer(&settings).unwrap();
        assert_eq!(synth.name(), "espeak-ng");
        assert_eq!(synth.extension(), "wav");
    }

    #[test]
    fn test_registry_builds_gtts() {
        let settings = NarrationSettings {
            provider: ProviderKind::Gtts,
            ..Default::default()
        };
        let synth = create_synthesizer(&settings).unwrap();
        assert_eq!(synth.name(), "gtts");
        assert_eq!(synth.extension(), "mp3");
    }

    #[test]
    fn test_piper_requires_model() {
        let settings = NarrationSettings {
            local_command: "piper".into(),
            local_model: None,
            ..Default::default()
        };
        assert!(create_synthesizer(&settings).is_err());
    }

    #[test]
    fn test_misconfigured_provider_uses_fallback() {
        let settings = NarrationSettings {
            local_command: "piper".into(),
            local_model: None,
            fallback: Some(ProviderKind::Gtts),
            ..Default::default()
        };
        let synth = create_synthesizer(&settings).unwrap();
        assert_eq!(synth.name(), "gtts");
    }

    #[test]
    fn test_fallback_to_same_provider_keeps_error() {
        let settings = NarrationSettings {
            local_command: "piper".into(),
            local_model: None,
            fallback: Some(ProviderKind::Local),
            ..Default::default()
        };
        assert!(matches!(
            create_synthesizer(&settings),
            Err(SlidecastError::Config(_))
        ));
    }
}
