//! Turns narration units into measured audio clips.

use super::Synthesizer;
use crate::audio::{append_silence, probe_duration};
use crate::config::{NarrationSettings, VideoSettings};
use crate::error::{Result, SlidecastError};
use crate::text::NarrationUnit;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// An audio file and its measured duration in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub path: PathBuf,
    pub duration: f64,
}

/// Produces the audio for one narration unit.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Narrate `unit` into a file named after `stem` (the extension is chosen
    /// by the narrator).
    async fn narrate(&self, unit: &NarrationUnit, stem: &Path) -> Result<AudioClip>;
}

/// Removes a file when dropped unless disarmed.
struct ScratchFile {
    path: PathBuf,
    armed: bool,
}

impl ScratchFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("Failed to remove {:?}: {}", self.path, e);
            }
        }
    }
}

/// Narrator that synthesizes speech and appends each unit's pause.
pub struct NarrationRenderer {
    synthesizer: Arc<dyn Synthesizer>,
    language: String,
    tolerance: f64,
    timeout: Option<Duration>,
    sample_rate: u32,
    channels: u32,
}

impl NarrationRenderer {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, language: impl Into<String>) -> Self {
        Self {
            synthesizer,
            language: language.into(),
            tolerance: 0.01,
            timeout: None,
            sample_rate: 44_100,
            channels: 2,
        }
    }

    pub fn from_settings(
        synthesizer: Arc<dyn Synthesizer>,
        narration: &NarrationSettings,
        video: &VideoSettings,
    ) -> Self {
        let timeout = (narration.timeout_seconds > 0)
            .then(|| Duration::from_secs(narration.timeout_seconds));
        Self::new(synthesizer, &narration.language)
            .with_tolerance(narration.duration_tolerance)
            .with_timeout(timeout)
            .with_audio_format(video.audio_sample_rate, video.audio_channels)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_audio_format(mut self, sample_rate: u32, channels: u32) -> Self {
        self.sample_rate = sample_rate;
        self.channels = channels;
        self
    }

    pub fn synthesizer_name(&self) -> &str {
        self.synthesizer.name()
    }

    /// Warn when `measured` is further than the tolerance from `expected`.
    fn drifted(&self, measured: f64, expected: f64) -> bool {
        let drift = (measured - expected).abs();
        if drift > self.tolerance {
            warn!(
                "Audio duration {:.3}s differs from expected {:.3}s",
                measured, expected
            );
        }
        drift > self.tolerance
    }

    async fn synthesize_with_timeout(&self, text: &str, output: &Path) -> Result<()> {
        let job = self.synthesizer.synthesize(text, output, &self.language);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, job)
                .await
                .map_err(|_| SlidecastError::Timeout(limit.as_secs()))?,
            None => job.await,
        }
    }
}

#[async_trait]
impl Narrator for NarrationRenderer {
    #[instrument(skip(self, unit), fields(provider = %self.synthesizer.name(), pause = unit.pause))]
    async fn narrate(&self, unit: &NarrationUnit, stem: &Path) -> Result<AudioClip> {
        let raw_name = format!("raw.{}", self.synthesizer.extension());
        let raw = ScratchFile::new(stem.with_extension(raw_name));

        self.synthesize_with_timeout(&unit.text, &raw.path).await?;
        if !raw.path.exists() {
            return Err(SlidecastError::Synthesis(format!(
                "{} wrote no audio for '{}'",
                self.synthesizer.name(),
                unit.text
            )));
        }

        let (path, expected) = if unit.pause > 0.0 {
            let spoken = probe_duration(&raw.path).await?;
            let padded = ScratchFile::new(stem.with_extension("wav"));
            append_silence(&raw.path, &padded.path, unit.pause, self.sample_rate, self.channels)
                .await?;
            (padded, Some(spoken + unit.pause))
        } else {
            let target = ScratchFile::new(stem.with_extension(self.synthesizer.extension()));
            tokio::fs::rename(&raw.path, &target.path).await.map_err(|e| {
                SlidecastError::Synthesis(format!(
                    "cannot move {} into place: {}",
                    raw.path.display(),
                    e
                ))
            })?;
            (target, None)
        };

        let duration = probe_duration(&path.path).await?;
        if duration <= 0.0 {
            return Err(SlidecastError::Synthesis(format!(
                "zero-length audio for '{}'",
                unit.text
            )));
        }

        if let Some(expected) = expected {
            self.drifted(duration, expected);
        }

        debug!("Narrated {:.3}s", duration);
        Ok(AudioClip {
            path: path.keep(),
            duration,
        })
    }
}
