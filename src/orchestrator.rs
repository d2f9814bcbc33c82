//! Pipeline orchestrator for Slidecast.
//!
//! Coordinates the whole process from Markdown posts to scripts and from
//! scripts to finished videos.

use crate::config::Settings;
use crate::error::{Result, SlidecastError};
use crate::narration::{create_synthesizer, NarrationRenderer, Narrator};
use crate::progress::{Progress, Reporter};
use crate::render::{FfmpegRenderer, RenderReport, VideoRenderer};
use crate::script::{
    list_scripts, load_script, save_script, slugify, ScriptAssembler, ScriptDocument,
};
use crate::slide::SlideRenderer;
use crate::source::{DocumentSource, MarkdownDirSource};
use crate::timeline::{SkippedUnit, TimelineBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A script written by [`Pipeline::generate_scripts`].
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub title: String,
    pub path: PathBuf,
    pub sections: usize,
    pub units: usize,
}

/// Result of rendering one script.
#[derive(Debug, Clone)]
pub struct RenderSummary {
    pub title: String,
    pub report: RenderReport,
    pub skipped: Vec<SkippedUnit>,
    pub dropped_sections: Vec<String>,
}

/// Outcome of one document in [`Pipeline::process_recent`].
#[derive(Debug)]
pub struct ProcessOutcome {
    pub title: String,
    pub script: Option<PathBuf>,
    pub result: Result<RenderSummary>,
}

/// Turn the `limit` most recent documents of `source` into saved scripts.
///
/// Needs no speech or video components, so it works without any renderer
/// configured.
#[instrument(skip(settings, source, reporter))]
pub async fn generate_scripts(
    settings: &Settings,
    source: &dyn DocumentSource,
    limit: usize,
    reporter: &Reporter,
) -> Result<Vec<GeneratedScript>> {
    let documents = source.fetch_documents(limit).await?;
    reporter.message(&format!("Found {} documents in {}", documents.len(), source.name()));

    let assembler = ScriptAssembler::new(settings.script.clone());
    let script_dir = settings.script_dir();
    let mut generated = Vec::with_capacity(documents.len());

    for (i, document) in documents.iter().enumerate() {
        let script = assembler.assemble(document);
        let path = save_script(&script, &script_dir)?;
        reporter.message(&format!("Script for '{}' saved", document.metadata.title));
        reporter.progress(Progress::of(i + 1, documents.len(), "Writing scripts"));
        generated.push(GeneratedScript {
            title: script.metadata.title.clone(),
            path,
            sections: script.sections.len(),
            units: script.unit_count(),
        });
    }

    Ok(generated)
}

/// The main orchestrator.
pub struct Pipeline {
    settings: Settings,
    source: Arc<dyn DocumentSource>,
    assembler: ScriptAssembler,
    timeline: TimelineBuilder,
    renderer: Arc<dyn VideoRenderer>,
    reporter: Reporter,
}

impl Pipeline {
    /// Create a pipeline with the components selected in the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let synthesizer = create_synthesizer(&settings.narration)?;
        info!("Using {} speech synthesis", synthesizer.name());

        let narrator = Arc::new(NarrationRenderer::from_settings(
            synthesizer,
            &settings.narration,
            &settings.video,
        ));
        let source = Arc::new(MarkdownDirSource::new(settings.content_dir()));
        let renderer = Arc::new(FfmpegRenderer::from_settings(&settings));

        Self::with_components(settings, source, narrator, renderer)
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        source: Arc<dyn DocumentSource>,
        narrator: Arc<dyn Narrator>,
        renderer: Arc<dyn VideoRenderer>,
    ) -> Result<Self> {
        let slides = SlideRenderer::from_settings(&settings)?;
        let timeline = TimelineBuilder::from_settings(&settings, slides, narrator);

        Ok(Self {
            assembler: ScriptAssembler::new(settings.script.clone()),
            settings,
            source,
            timeline,
            renderer,
            reporter: Reporter::silent(),
        })
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Turn the `limit` most recent documents into saved scripts.
    pub async fn generate_scripts(&self, limit: usize) -> Result<Vec<GeneratedScript>> {
        generate_scripts(&self.settings, self.source.as_ref(), limit, &self.reporter).await
    }

    /// Most recently saved script, if any.
    pub fn latest_script(&self) -> Result<Option<PathBuf>> {
        Ok(list_scripts(&self.settings.script_dir())?.into_iter().next())
    }

    /// Output path for a video titled `title`.
    pub fn video_path(&self, title: &str) -> PathBuf {
        self.settings
            .output_dir()
            .join(format!("video_{}.mp4", slugify(title, 30)))
    }

    /// Load a script file and render it to a video.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn render_script(&self, path: &Path) -> Result<RenderSummary> {
        let script = load_script(path)?;
        self.render(&script).await
    }

    /// Render a script document to `output_dir/video_<slug>.mp4`.
    pub async fn render(&self, script: &ScriptDocument) -> Result<RenderSummary> {
        let title = script.metadata.title.clone();
        self.reporter.message(&format!("Rendering '{}'", title));

        let temp_root = self.settings.temp_dir();
        std::fs::create_dir_all(&temp_root)?;
        let work_dir = tempfile::Builder::new()
            .prefix("slidecast-")
            .tempdir_in(&temp_root)?;

        let timeline = self
            .timeline
            .build(script, work_dir.path(), &self.reporter)
            .await?;

        self.reporter.message(&format!(
            "Encoding {} segments ({:.1}s)",
            timeline.segment_count(),
            timeline.duration()
        ));
        let output = self.video_path(&title);
        let report = self.renderer.render(&timeline, &output).await?;
        self.reporter.progress(Progress::of(1, 1, "Done"));

        Ok(RenderSummary {
            title,
            report,
            skipped: timeline.skipped,
            dropped_sections: timeline.dropped_sections,
        })
    }

    /// Generate scripts for the most recent documents and render each one.
    ///
    /// A failing document does not stop the others.
    #[instrument(skip(self))]
    pub async fn process_recent(&self, limit: usize) -> Result<Vec<ProcessOutcome>> {
        let documents = self.source.fetch_documents(limit).await?;
        if documents.is_empty() {
            return Err(SlidecastError::InvalidInput(format!(
                "No documents found in {}",
                self.settings.content_dir().display()
            )));
        }

        let script_dir = self.settings.script_dir();
        let mut outcomes = Vec::with_capacity(documents.len());

        for (i, document) in documents.iter().enumerate() {
            let title = document.metadata.title.clone();
            self.reporter.message(&format!(
                "[{}/{}] Processing '{}'",
                i + 1,
                documents.len(),
                title
            ));

            let script = self.assembler.assemble(document);
            let saved = save_script(&script, &script_dir);
            let script_path = saved.as_ref().ok().cloned();

            let result = match saved {
                Ok(_) => self.render(&script).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                error!("Failed to process '{}': {}", title, e);
            }

            outcomes.push(ProcessOutcome {
                title,
                script: script_path,
                result,
            });
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::AudioClip;
    use crate::script::SectionKind;
    use crate::text::NarrationUnit;
    use crate::timeline::Timeline;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio_test::assert_ok;

    struct FakeNarrator;

    #[async_trait]
    impl Narrator for FakeNarrator {
        async fn narrate(&self, unit: &NarrationUnit, stem: &Path) -> Result<AudioClip> {
            let path = stem.with_extension("wav");
            std::fs::write(&path, unit.text.as_bytes())?;
            Ok(AudioClip {
                path,
                duration: 1.0 + unit.pause,
            })
        }
    }

    /// Records every timeline and fails for titles containing "broken".
    #[derive(Default)]
    struct FakeRenderer {
        timelines: Mutex<Vec<Timeline>>,
    }

    #[async_trait]
    impl VideoRenderer for FakeRenderer {
        fn name(&self) -> &str {
            "fake"
        }

        async fn render(&self, timeline: &Timeline, output: &Path) -> Result<RenderReport> {
            if output.to_string_lossy().contains("broken") {
                return Err(SlidecastError::Render("fake encoder failure".into()));
            }
            std::fs::write(output, b"mp4")?;
            self.timelines.lock().unwrap().push(timeline.clone());
            Ok(RenderReport {
                output: output.to_path_buf(),
                segments: timeline.segment_count(),
                sections: timeline.clips.len(),
                duration: timeline.duration(),
                size_bytes: 3,
            })
        }
    }

    fn settings(root: &Path) -> Settings {
        let mut settings = Settings::default();
        let dir = |name: &str| root.join(name).to_string_lossy().into_owned();
        settings.general.content_dir = dir("content");
        settings.general.script_dir = dir("scripts");
        settings.general.output_dir = dir("out");
        settings.general.assets_dir = dir("assets");
        settings.general.temp_dir = dir("tmp");
        settings.video.width = 160;
        settings.video.height = 90;
        settings.style.font_path = dir("missing.ttf");
        settings.style.font_sizes.h1 = 16;
        settings.style.font_sizes.h2 = 16;
        settings.style.font_sizes.h3 = 8;
        settings.style.font_sizes.text = 8;
        settings
    }

    fn write_post(settings: &Settings, file: &str, title: &str, date: &str) {
        let content = format!(
            "---\ntitle: {}\ndate: {}\n---\n# Intro\nOne sentence.\n\n# Details\n- Item 1\n- Item 2\n",
            title, date
        );
        std::fs::write(settings.content_dir().join(file), content).unwrap();
    }

    fn pipeline(settings: Settings, renderer: Arc<FakeRenderer>) -> Pipeline {
        let source = Arc::new(MarkdownDirSource::new(settings.content_dir()));
        Pipeline::with_components(settings, source, Arc::new(FakeNarrator), renderer).unwrap()
    }

    #[tokio::test]
    async fn test_generate_then_render_script() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        settings.ensure_directories().unwrap();
        write_post(&settings, "post.md", "Rust Tips", "2024-03-01");

        let source = MarkdownDirSource::new(settings.content_dir());
        let generated =
            assert_ok!(generate_scripts(&settings, &source, 5, &Reporter::silent()).await);
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].sections, 4);
        assert_eq!(generated[0].units, 6);

        let script = assert_ok!(load_script(&generated[0].path));
        let kinds: Vec<SectionKind> = script.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Intro,
                SectionKind::Content,
                SectionKind::Content,
                SectionKind::Outro
            ]
        );

        let renderer = Arc::new(FakeRenderer::default());
        let pipeline = pipeline(settings, renderer.clone());
        let latest = assert_ok!(pipeline.latest_script()).unwrap();
        assert_eq!(latest, generated[0].path);

        let summary = assert_ok!(pipeline.render_script(&latest).await);
        assert_eq!(summary.title, "Rust Tips");
        assert_eq!(summary.report.output, pipeline.video_path("Rust Tips"));
        assert!(summary.report.output.is_file());
        assert!(summary.skipped.is_empty());
        assert!(summary.dropped_sections.is_empty());

        let timelines = renderer.timelines.lock().unwrap();
        let timeline = &timelines[0];
        assert_eq!(timeline.clips.len(), 4);
        assert_eq!(timeline.segment_count(), 6);

        let expected: Vec<f64> = script
            .sections
            .iter()
            .flat_map(|s| s.narration_units())
            .map(|u| 1.0 + u.pause)
            .collect();
        let actual: Vec<f64> = timeline.segments().map(|s| s.duration).collect();
        assert_eq!(actual, expected);
        for segment in timeline.segments() {
            assert_eq!(segment.duration, segment.audio.duration);
        }
    }

    #[tokio::test]
    async fn test_process_recent_keeps_going_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        settings.ensure_directories().unwrap();
        write_post(&settings, "new.md", "broken news", "2024-05-01");
        write_post(&settings, "old.md", "Good Post", "2024-01-01");

        let renderer = Arc::new(FakeRenderer::default());
        let pipeline = pipeline(settings, renderer.clone());
        let outcomes = assert_ok!(pipeline.process_recent(5).await);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].title, "broken news");
        assert!(matches!(outcomes[0].result, Err(SlidecastError::Render(_))));
        assert!(outcomes[0].script.as_ref().is_some_and(|p| p.is_file()));
        assert_eq!(outcomes[1].title, "Good Post");
        assert!(outcomes[1].result.is_ok());
        assert_eq!(renderer.timelines.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_process_recent_without_documents() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        settings.ensure_directories().unwrap();

        let pipeline = pipeline(settings, Arc::new(FakeRenderer::default()));
        let result = pipeline.process_recent(5).await;
        assert!(matches!(result, Err(SlidecastError::InvalidInput(_))));
        assert!(assert_ok!(pipeline.latest_script()).is_none());
    }

    #[test]
    fn test_video_path_uses_title_slug() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let pipeline = pipeline(settings, Arc::new(FakeRenderer::default()));
        assert_eq!(
            pipeline.video_path("Hello, World!"),
            dir.path().join("out").join("video_Hello_World.mp4")
        );
    }
}
