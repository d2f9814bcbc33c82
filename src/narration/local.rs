//! Offline synthesis with espeak-ng or piper.

use super::Synthesizer;
use crate::config::NarrationSettings;
use crate::error::{Result, SlidecastError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
enum Engine {
    /// `espeak-ng --stdin -v <lang> -w <out>`
    Espeak,
    /// `piper --model <model> --output_file <out>`
    Piper { model: PathBuf },
}

/// Local command-line TTS engine. Text is passed on stdin.
#[derive(Debug, Clone)]
pub struct LocalSynthesizer {
    command: String,
    engine: Engine,
}

impl LocalSynthesizer {
    /// espeak-ng compatible engine.
    pub fn espeak(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            engine: Engine::Espeak,
        }
    }

    /// piper engine with a voice model.
    pub fn piper(command: impl Into<String>, model: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            engine: Engine::Piper {
                model: model.into(),
            },
        }
    }

    pub fn from_settings(settings: &NarrationSettings) -> Result<Self> {
        let command = settings.local_command.trim();
        if command.is_empty() {
            return Err(SlidecastError::Config("narration.local_command is empty".into()));
        }

        let program = Path::new(command)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(command);

        if program.starts_with("piper") {
            let model = settings.local_model.as_deref().ok_or_else(|| {
                SlidecastError::Config("piper requires narration.local_model".into())
            })?;
            Ok(Self::piper(command, shellexpand::tilde(model).as_ref()))
        } else {
            Ok(Self::espeak(command))
        }
    }

    fn args(&self, output: &Path, language: &str) -> Vec<std::ffi::OsString> {
        match &self.engine {
            Engine::Espeak => vec![
                "--stdin".into(),
                "-v".into(),
                language.into(),
                "-w".into(),
                output.as_os_str().to_owned(),
            ],
            Engine::Piper { model } => vec![
                "--model".into(),
                model.as_os_str().to_owned(),
                "--output_file".into(),
                output.as_os_str().to_owned(),
            ],
        }
    }
}

#[async_trait]
impl Synthesizer for LocalSynthesizer {
    fn name(&self) -> &str {
        &self.command
    }

    fn extension(&self) -> &str {
        "wav"
    }

    #[instrument(skip(self, text), fields(engine = %self.command))]
    async fn synthesize(&self, text: &str, output: &Path, language: &str) -> Result<()> {
        let spawned = Command::new(&self.command)
            .args(self.args(output, language))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SlidecastError::ToolNotFound(self.command.clone()));
            }
            Err(e) => {
                return Err(SlidecastError::Synthesis(format!(
                    "{} execution failed: {}",
                    self.command, e
                )));
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            let written = async {
                stdin.write_all(text.as_bytes()).await?;
                stdin.write_all(b"\n").await
            };
            // An engine that exits early (e.g. unknown voice) closes the pipe.
            written.await.map_err(|e| {
                SlidecastError::Synthesis(format!("{} rejected input: {}", self.command, e))
            })?;
        }

        let result = child.wait_with_output().await.map_err(|e| {
            SlidecastError::Synthesis(format!("{} did not finish: {}", self.command, e))
        })?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(SlidecastError::Synthesis(format!(
                "{} failed: {}",
                self.command,
                stderr.trim()
            )));
        }

        if !output.exists() {
            return Err(SlidecastError::Synthesis(format!(
                "{} produced no audio",
                self.command
            )));
        }

        debug!("Synthesized {} chars", text.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_espeak_args() {
        let synth = LocalSynthesizer::espeak("espeak-ng");
        let args = synth.args(Path::new("/tmp/out.wav"), "en");
        assert_eq!(args, vec!["--stdin", "-v", "en", "-w", "/tmp/out.wav"]);
    }

    #[test]
    fn test_piper_detected_from_path() {
        let settings = NarrationSettings {
            local_command: "/opt/piper/piper".into(),
            local_model: Some("/models/en.onnx".into()),
            ..Default::default()
        };
        let synth = LocalSynthesizer::from_settings(&settings).unwrap();
        let args = synth.args(Path::new("out.wav"), "en");
        assert_eq!(args, vec!["--model", "/models/en.onnx", "--output_file", "out.wav"]);
    }

    #[tokio::test]
    async fn test_missing_engine_is_tool_not_found() {
        let synth = LocalSynthesizer::espeak("slidecast-missing-tts");
        let dir = tempfile::tempdir().unwrap();
        let result = synth.synthesize("hello", &dir.path().join("x.wav"), "en").await;
        assert!(matches!(result, Err(SlidecastError::ToolNotFound(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_closing_input_is_synthesis_error() {
        // `true` exits without reading stdin or writing audio.
        let synth = LocalSynthesizer::espeak("true");
        let dir = tempfile::tempdir().unwrap();
        let text = "word ".repeat(40_000);
        let result = synth.synthesize(&text, &dir.path().join("x.wav"), "en").await;
        match result {
            Err(e) => {
                assert!(matches!(e, SlidecastError::Synthesis(_)), "got {:?}", e);
                assert!(e.is_unit_scoped());
            }
            Ok(()) => panic!("expected a synthesis error"),
        }
    }
}
