//! Audio processing with ffmpeg and ffprobe.

mod ffmpeg;

pub use ffmpeg::{append_silence, has_audio_stream, probe_duration, run_tool};
