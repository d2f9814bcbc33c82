//! Thin async wrappers around the ffmpeg and ffprobe binaries.

use crate::error::{Result, SlidecastError};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, instrument};

/// Run an external tool to completion and return its output.
///
/// A missing binary maps to `ToolNotFound`, a non-zero exit to `ToolFailed`
/// carrying the tool's stderr.
pub async fn run_tool<I, S>(program: &str, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let result = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SlidecastError::ToolNotFound(program.into()));
        }
        Err(e) => {
            return Err(SlidecastError::ToolFailed(format!("{program} execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SlidecastError::ToolFailed(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(output)
}

/// Queries the duration of a media file in seconds.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = run_tool(
        "ffprobe",
        [
            OsStr::new("-v"),
            OsStr::new("quiet"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_format"),
            path.as_os_str(),
        ],
    )
    .await?;

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|_| SlidecastError::ToolFailed("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            SlidecastError::ToolFailed(format!(
                "Could not determine duration of {}",
                path.display()
            ))
        })
}

/// Whether a media file contains at least one audio stream.
pub async fn has_audio_stream(path: &Path) -> Result<bool> {
    let output = run_tool(
        "ffprobe",
        [
            OsStr::new("-v"),
            OsStr::new("quiet"),
            OsStr::new("-select_streams"),
            OsStr::new("a"),
            OsStr::new("-show_streams"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            path.as_os_str(),
        ],
    )
    .await?;

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|_| SlidecastError::ToolFailed("Invalid ffprobe output".into()))?;

    Ok(parsed["streams"]
        .as_array()
        .is_some_and(|streams| !streams.is_empty()))
}

/// Re-encode `input` to WAV with `seconds` of silence appended.
#[instrument(skip_all, fields(seconds = seconds))]
pub async fn append_silence(
    input: &Path,
    output: &Path,
    seconds: f64,
    sample_rate: u32,
    channels: u32,
) -> Result<()> {
    debug!("Padding {:?} with {:.3}s of silence", input, seconds);

    let filter = format!("apad=pad_dur={:.3}", seconds);
    let sample_rate = sample_rate.to_string();
    let channels = channels.to_string();

    run_tool(
        "ffmpeg",
        [
            OsStr::new("-y"),
            OsStr::new("-loglevel"),
            OsStr::new("error"),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-af"),
            OsStr::new(&filter),
            OsStr::new("-ar"),
            OsStr::new(&sample_rate),
            OsStr::new("-ac"),
            OsStr::new(&channels),
            output.as_os_str(),
        ],
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let result = run_tool("slidecast-no-such-tool", ["--version"]).await;
        assert!(matches!(
            result,
            Err(SlidecastError::ToolNotFound(name)) if name == "slidecast-no-such-tool"
        ));
    }

    #[tokio::test]
    async fn test_failing_tool_is_tool_failed() {
        // `false` exists on every Unix system and always exits non-zero.
        if run_tool("true", std::iter::empty::<&str>()).await.is_err() {
            return;
        }
        let result = run_tool("false", std::iter::empty::<&str>()).await;
        assert!(matches!(result, Err(SlidecastError::ToolFailed(_))));
    }

    #[tokio::test]
    async fn test_probe_missing_file_fails() {
        // Soft check: only meaningful when ffprobe is installed.
        match probe_duration(Path::new("/no/such/audio.wav")).await {
            Err(SlidecastError::ToolNotFound(_)) | Err(SlidecastError::ToolFailed(_)) => {}
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
