//! Error types for Slidecast.

use thiserror::Error;

/// Library-level error type for Slidecast operations.
#[derive(Error, Debug)]
pub enum SlidecastError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Front matter error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SlidecastError {
    /// Whether this error only affects a single narration unit.
    ///
    /// Unit-scoped failures are skipped by the timeline builder; everything
    /// else aborts the run.
    pub fn is_unit_scoped(&self) -> bool {
        matches!(
            self,
            SlidecastError::Synthesis(_)
                | SlidecastError::Timeout(_)
                | SlidecastError::Render(_)
                | SlidecastError::Image(_)
                | SlidecastError::Http(_)
                | SlidecastError::ToolFailed(_)
        )
    }
}

/// Result type alias for Slidecast operations.
pub type Result<T> = std::result::Result<T, SlidecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_scoped_errors() {
        assert!(SlidecastError::Synthesis("503".into()).is_unit_scoped());
        assert!(SlidecastError::Timeout(30).is_unit_scoped());
        assert!(!SlidecastError::ToolNotFound("ffmpeg".into()).is_unit_scoped());
        assert!(!SlidecastError::Validation("empty".into()).is_unit_scoped());
    }
}
