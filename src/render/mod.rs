//! Video rendering.

mod ffmpeg;

pub use ffmpeg::FfmpegRenderer;

use crate::error::Result;
use crate::timeline::Timeline;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Facts about a rendered video.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub output: PathBuf,
    pub segments: usize,
    pub sections: usize,
    /// Sum of the segment durations in seconds.
    pub duration: f64,
    pub size_bytes: u64,
}

/// Trait for turning a timeline into a video file.
#[async_trait]
pub trait VideoRenderer: Send + Sync {
    fn name(&self) -> &str;

    /// Render `timeline` to `output`.
    async fn render(&self, timeline: &Timeline, output: &Path) -> Result<RenderReport>;
}
