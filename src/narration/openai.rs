//! OpenAI speech synthesis.

use super::Synthesizer;
use crate::config::NarrationSettings;
use crate::error::{Result, SlidecastError};
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequestArgs, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for OpenAI API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// OpenAI limits speech input to 4096 characters.
const MAX_INPUT_CHARS: usize = 4096;

/// Create an OpenAI client with a request timeout.
pub fn create_client(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

fn parse_model(model: &str) -> SpeechModel {
    match model {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

fn parse_voice(voice: &str) -> Voice {
    match voice.to_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        other => {
            warn!("Unknown OpenAI voice '{}', using alloy", other);
            Voice::Alloy
        }
    }
}

/// Synthesizer using the OpenAI speech endpoint.
pub struct OpenAiSynthesizer {
    client: Client<OpenAIConfig>,
    model: String,
    voice: String,
}

impl OpenAiSynthesizer {
    pub fn new(
        client: Client<OpenAIConfig>,
        model: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            voice: voice.into(),
        }
    }

    /// Requires `OPENAI_API_KEY` in the environment.
    pub fn from_settings(settings: &NarrationSettings) -> Result<Self> {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => {}
            _ => {
                return Err(SlidecastError::Config(
                    "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".into(),
                ))
            }
        }

        let secs = if settings.timeout_seconds == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            settings.timeout_seconds
        };
        Ok(Self::new(
            create_client(Duration::from_secs(secs))?,
            &settings.openai_model,
            &settings.openai_voice,
        ))
    }
}

#[async_trait]
impl Synthesizer for OpenAiSynthesizer {
    fn name(&self) -> &str {
        "openai"
    }

    fn extension(&self) -> &str {
        "mp3"
    }

    async fn synthesize(&self, text: &str, output: &Path, language: &str) -> Result<()> {
        if text.chars().count() > MAX_INPUT_CHARS {
            return Err(SlidecastError::Synthesis(format!(
                "input exceeds {} characters",
                MAX_INPUT_CHARS
            )));
        }
        // The model infers the language from the text.
        debug!(model = %self.model, voice = %self.voice, language, "Calling OpenAI TTS");

        let request = CreateSpeechRequestArgs::default()
            .model(parse_model(&self.model))
            .voice(parse_voice(&self.voice))
            .input(text)
            .build()
            .map_err(|e| SlidecastError::Synthesis(format!("invalid speech request: {}", e)))?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| SlidecastError::Synthesis(format!("OpenAI TTS error: {}", e)))?;

        tokio::fs::write(output, &response.bytes).await.map_err(|e| {
            SlidecastError::Synthesis(format!("cannot write {}: {}", output.display(), e))
        })?;
        Ok(())
    }
}
