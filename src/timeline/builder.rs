//! Builds a timeline from a script by rendering slides and narration.

use super::effects::{resolve, Effect, DEFAULT_EFFECT};
use super::{SectionClip, Segment, SkippedUnit, Timeline};
use crate::config::Settings;
use crate::error::{Result, SlidecastError};
use crate::narration::Narrator;
use crate::progress::{Progress, Reporter};
use crate::script::ScriptDocument;
use crate::slide::SlideRenderer;
use crate::text::NarrationUnit;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Work item for a single narration unit.
struct Job {
    index: usize,
    section_index: usize,
    section_label: String,
    level: u8,
    background: Option<String>,
    effect: Effect,
    unit: NarrationUnit,
}

/// Renders every narration unit of a script into a segment.
pub struct TimelineBuilder {
    slides: SlideRenderer,
    narrator: Arc<dyn Narrator>,
    default_background: Option<String>,
    default_effect: String,
    max_concurrent: usize,
}

impl TimelineBuilder {
    pub fn new(slides: SlideRenderer, narrator: Arc<dyn Narrator>) -> Self {
        Self {
            slides,
            narrator,
            default_background: None,
            default_effect: DEFAULT_EFFECT.to_string(),
            max_concurrent: 2,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        slides: SlideRenderer,
        narrator: Arc<dyn Narrator>,
    ) -> Self {
        Self::new(slides, narrator)
            .with_default_background(settings.style.default_background.clone())
            .with_default_effect(&settings.effects.default_effect)
            .with_max_concurrent(settings.narration.max_concurrent)
    }

    pub fn with_default_background(mut self, background: Option<String>) -> Self {
        self.default_background = background;
        self
    }

    pub fn with_default_effect(mut self, effect: impl Into<String>) -> Self {
        self.default_effect = effect.into();
        self
    }

    /// Maximum number of units rendered at once (at least 1).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    fn jobs(&self, script: &ScriptDocument) -> Vec<Job> {
        let mut jobs = Vec::new();
        for (section_index, section) in script.sections.iter().enumerate() {
            let effect = resolve(section.animation.as_deref(), &self.default_effect);
            let background = section
                .background
                .clone()
                .or_else(|| self.default_background.clone());

            for unit in section.narration_units() {
                jobs.push(Job {
                    index: jobs.len(),
                    section_index,
                    section_label: section.label(),
                    level: section.level,
                    background: background.clone(),
                    effect,
                    unit: unit.clone(),
                });
            }
        }
        jobs
    }

    async fn build_segment(&self, job: &Job, work_dir: &Path) -> Result<Segment> {
        let slide = work_dir.join(format!("slide_{:04}.png", job.index));
        self.slides
            .render_async(
                job.unit.text.clone(),
                job.level,
                job.background.clone(),
                slide.clone(),
            )
            .await?;

        let stem = work_dir.join(format!("unit_{:04}", job.index));
        let audio = self.narrator.narrate(&job.unit, &stem).await?;
        Ok(Segment::new(slide, audio, job.effect))
    }

    /// Render all units of `script` into `work_dir` and group them by section.
    ///
    /// Units that fail with a unit-scoped error are skipped and recorded;
    /// any other error aborts the build.
    #[instrument(skip_all, fields(title = %script.metadata.title))]
    pub async fn build(
        &self,
        script: &ScriptDocument,
        work_dir: &Path,
        reporter: &Reporter,
    ) -> Result<Timeline> {
        let jobs = self.jobs(script);
        let total = jobs.len();
        if total == 0 {
            return Err(SlidecastError::Validation(
                "script contains no narration units".into(),
            ));
        }

        info!(
            "Rendering {} units with up to {} in parallel",
            total, self.max_concurrent
        );
        reporter.message(&format!("Rendering {} slides and narrations", total));

        let mut per_section: Vec<Vec<Segment>> = vec![Vec::new(); script.sections.len()];
        let mut skipped = Vec::new();

        let mut results = stream::iter(jobs.iter())
            .map(|job| async move { (job, self.build_segment(job, work_dir).await) })
            .buffered(self.max_concurrent);

        let mut done = 0;
        while let Some((job, result)) = results.next().await {
            match result {
                Ok(segment) => {
                    if !segment.audio.path.is_file() {
                        return Err(SlidecastError::Render(format!(
                            "segment {} has no audio at {}",
                            job.index,
                            segment.audio.path.display()
                        )));
                    }
                    per_section[job.section_index].push(segment);
                }
                Err(e) if e.is_unit_scoped() => {
                    warn!("Skipping unit {} in {}: {}", job.index, job.section_label, e);
                    skipped.push(SkippedUnit {
                        section: job.section_label.clone(),
                        text: job.unit.text.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }

            done += 1;
            reporter.progress(Progress::of(done, total, format!("Unit {}/{}", done, total)));
        }

        let mut timeline = Timeline {
            skipped,
            ..Default::default()
        };

        for (section, segments) in script.sections.iter().zip(per_section) {
            if segments.is_empty() {
                warn!("Dropping {}: no segments rendered", section.label());
                timeline.dropped_sections.push(section.label());
                continue;
            }
            timeline.clips.push(SectionClip {
                label: section.label(),
                segments,
            });
        }

        if timeline.clips.is_empty() {
            return Err(SlidecastError::Validation(format!(
                "no segments rendered ({} units skipped)",
                timeline.skipped.len()
            )));
        }

        info!(
            "Timeline ready: {} segments in {} sections, {:.1}s",
            timeline.segment_count(),
            timeline.clips.len(),
            timeline.duration()
        );
        Ok(timeline)
    }
}
