//! Slidecast - Narrated Slide Videos from Markdown
//!
//! A CLI tool that turns Markdown posts into narrated slide videos.
//!
//! # Overview
//!
//! Slidecast allows you to:
//! - Split posts into sections and speakable sentences
//! - Save an editable narration script per post
//! - Render one slide per sentence with a background and an effect
//! - Narrate each sentence with a local or hosted speech engine
//! - Stitch everything into a single MP4 with ffmpeg
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - Document source abstraction (Markdown directories)
//! - `text` - Section, paragraph and sentence splitting
//! - `script` - Script assembly and storage
//! - `slide` - Slide image rendering
//! - `narration` - Speech synthesis backends
//! - `audio` - ffmpeg/ffprobe helpers
//! - `timeline` - Per-unit slide and audio pairing, effects
//! - `render` - Final video encoding
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use slidecast::config::Settings;
//! use slidecast::orchestrator::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     // Render the newest script
//!     if let Some(script) = pipeline.latest_script()? {
//!         let summary = pipeline.render_script(&script).await?;
//!         println!("Rendered {}", summary.report.output.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod narration;
pub mod orchestrator;
pub mod progress;
pub mod render;
pub mod script;
pub mod slide;
pub mod source;
pub mod text;
pub mod timeline;

pub use error::{Result, SlidecastError};
