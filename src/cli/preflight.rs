//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{ProviderKind, Settings};
use crate::error::{Result, SlidecastError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Script generation only needs the content directory.
    Script,
    /// Video rendering needs ffmpeg, ffprobe and the speech provider.
    Video,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Script => {
            check_content_dir(settings)?;
        }
        Operation::Video => {
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
            check_provider(settings)?;
        }
    }
    Ok(())
}

fn check_content_dir(settings: &Settings) -> Result<()> {
    let dir = settings.content_dir();
    if dir.is_dir() {
        Ok(())
    } else {
        Err(SlidecastError::Config(format!(
            "Content directory {} does not exist. Set general.content_dir or run 'slidecast init'.",
            dir.display()
        )))
    }
}

/// Check what the configured speech provider (or its fallback) needs.
fn check_provider(settings: &Settings) -> Result<()> {
    match check_provider_kind(settings.narration.provider, settings) {
        Err(SlidecastError::Config(reason)) => match settings.narration.fallback {
            Some(fallback) if fallback != settings.narration.provider => {
                check_provider_kind(fallback, settings)
            }
            _ => Err(SlidecastError::Config(reason)),
        },
        other => other,
    }
}

fn check_provider_kind(kind: ProviderKind, settings: &Settings) -> Result<()> {
    match kind {
        ProviderKind::Local => check_tool(&settings.narration.local_command),
        ProviderKind::Gtts => Ok(()),
        ProviderKind::OpenAi => check_api_key(),
    }
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(SlidecastError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(SlidecastError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Version flag understood by a tool.
pub fn version_arg(name: &str) -> &'static str {
    let program = std::path::Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    // ffmpeg/ffprobe use -version (single dash), others use --version
    match program {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg(version_arg(name)).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(SlidecastError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SlidecastError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(SlidecastError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_needs_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.content_dir = dir.path().to_string_lossy().into_owned();
        assert!(check(Operation::Script, &settings).is_ok());

        settings.general.content_dir = "/definitely/missing/content".into();
        assert!(matches!(
            check(Operation::Script, &settings),
            Err(SlidecastError::Config(_))
        ));
    }

    #[test]
    fn test_version_arg() {
        assert_eq!(version_arg("ffmpeg"), "-version");
        assert_eq!(version_arg("/usr/bin/ffprobe"), "-version");
        assert_eq!(version_arg("espeak-ng"), "--version");
    }

    #[test]
    fn test_missing_tool() {
        assert!(matches!(
            check_tool("slidecast-not-a-tool"),
            Err(SlidecastError::ToolNotFound(_))
        ));
    }
}
