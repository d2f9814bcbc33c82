//! The rendering timeline: ordered segments grouped by script section.

mod builder;
mod effects;

pub use builder::TimelineBuilder;
pub use effects::{
    effect_names, lookup as lookup_effect, resolve as resolve_effect, Effect, EffectContext,
    EffectFn, VideoFilter, DEFAULT_EFFECT,
};

use crate::narration::AudioClip;
use std::path::PathBuf;

/// One slide shown for the duration of its narration.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub slide: PathBuf,
    pub audio: AudioClip,
    /// Always equal to the measured audio duration.
    pub duration: f64,
    pub effect: Effect,
}

impl Segment {
    pub fn new(slide: PathBuf, audio: AudioClip, effect: Effect) -> Self {
        Self {
            slide,
            duration: audio.duration,
            audio,
            effect,
        }
    }
}

/// The segments of one script section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionClip {
    pub label: String,
    pub segments: Vec<Segment>,
}

impl SectionClip {
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

/// A narration unit that was left out of the video.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedUnit {
    pub section: String,
    pub text: String,
    pub reason: String,
}

/// Complete, ordered description of the video to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub clips: Vec<SectionClip>,
    pub skipped: Vec<SkippedUnit>,
    /// Labels of sections dropped because none of their units rendered.
    pub dropped_sections: Vec<String>,
}

impl Timeline {
    pub fn segment_count(&self) -> usize {
        self.clips.iter().map(|c| c.segments.len()).sum()
    }

    pub fn duration(&self) -> f64 {
        self.clips.iter().map(SectionClip::duration).sum()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.clips.iter().flat_map(|c| c.segments.iter())
    }
}
