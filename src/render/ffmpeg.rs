//! ffmpeg-based video renderer.
//!
//! Each segment is encoded from a looped still and its narration, the parts
//! of a section are concatenated into a section clip, and the section clips
//! are concatenated into the final video.

use super::{RenderReport, VideoRenderer};
use crate::audio::{has_audio_stream, run_tool};
use crate::config::{Settings, VideoSettings};
use crate::error::{Result, SlidecastError};
use crate::timeline::{EffectContext, Segment, Timeline, VideoFilter};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Renderer that shells out to ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    video: VideoSettings,
    transition: f64,
}

impl FfmpegRenderer {
    pub fn new(video: VideoSettings, transition: f64) -> Self {
        Self { video, transition }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.video.clone(), settings.effects.transition_duration)
    }

    fn filter_for(&self, segment: &Segment) -> VideoFilter {
        let ctx = EffectContext {
            duration: segment.duration,
            transition: self.transition,
            width: self.video.width,
            height: self.video.height,
            fps: self.video.fps,
        };
        let base = VideoFilter::new()
            .then(format!("scale={}:{}", self.video.width, self.video.height))
            .then("setsar=1");
        segment.effect.apply(base, &ctx).then("format=yuv420p")
    }

    /// ffmpeg arguments to encode one segment into `dest`.
    fn segment_args(&self, segment: &Segment, dest: &Path) -> Vec<OsString> {
        let duration = format!("{:.3}", segment.duration);
        let v = &self.video;
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |a: &str| args.push(a.into());

        push("-y");
        push("-loglevel");
        push("error");
        push("-loop");
        push("1");
        push("-framerate");
        push(&v.fps.to_string());
        push("-t");
        push(&duration);
        push("-i");
        args.push(segment.slide.clone().into_os_string());
        args.push("-i".into());
        args.push(segment.audio.path.clone().into_os_string());

        for a in [
            "-vf".to_string(),
            self.filter_for(segment).to_arg(),
            "-c:v".into(),
            v.codec.clone(),
            "-b:v".into(),
            v.bitrate.clone(),
            "-r".into(),
            v.fps.to_string(),
            "-c:a".into(),
            v.audio_codec.clone(),
            "-b:a".into(),
            v.audio_bitrate.clone(),
            "-ar".into(),
            v.audio_sample_rate.to_string(),
            "-ac".into(),
            v.audio_channels.to_string(),
            "-t".into(),
            duration,
        ] {
            args.push(a.into());
        }
        args.push(dest.as_os_str().to_owned());
        args
    }

    async fn encode_segment(&self, segment: &Segment, dest: &Path) -> Result<()> {
        debug!("Encoding segment {:?} ({:.3}s)", dest, segment.duration);
        run_tool("ffmpeg", self.segment_args(segment, dest))
            .await
            .map_err(|e| render_error(e, "segment encoding failed"))?;
        Ok(())
    }

    /// Concatenate `parts` into `dest` without re-encoding.
    async fn concat(&self, parts: &[PathBuf], dest: &Path, list_path: &Path) -> Result<()> {
        tokio::fs::write(list_path, concat_list(parts)).await?;

        let args: Vec<OsString> = vec![
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            list_path.as_os_str().to_owned(),
            "-c".into(),
            "copy".into(),
            dest.as_os_str().to_owned(),
        ];
        let result = run_tool("ffmpeg", args).await;
        remove_quietly(list_path);
        result.map_err(|e| render_error(e, "concatenation failed"))?;
        Ok(())
    }

    async fn ensure_audio(&self, path: &Path, what: &str) -> Result<()> {
        if !has_audio_stream(path).await? {
            return Err(SlidecastError::Render(format!(
                "{} has no audio stream: {}",
                what,
                path.display()
            )));
        }
        Ok(())
    }
}

/// Concat demuxer list for `parts`.
fn concat_list(parts: &[PathBuf]) -> String {
    parts
        .iter()
        .map(|p| format!("file '{}'\n", p.to_string_lossy().replace('\'', "'\\''")))
        .collect()
}

/// Attach context to ffmpeg failures; other errors pass through.
fn render_error(error: SlidecastError, context: &str) -> SlidecastError {
    match error {
        SlidecastError::ToolFailed(msg) => SlidecastError::Render(format!("{}: {}", context, msg)),
        other => other,
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Failed to remove {:?}: {}", path, e);
    }
}

#[async_trait]
impl VideoRenderer for FfmpegRenderer {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    #[instrument(skip(self, timeline), fields(output = %output.display()))]
    async fn render(&self, timeline: &Timeline, output: &Path) -> Result<RenderReport> {
        if timeline.segment_count() == 0 {
            return Err(SlidecastError::Validation("timeline has no segments".into()));
        }

        let out_dir = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&out_dir)?;
        let parts_dir = tempfile::Builder::new()
            .prefix(".slidecast-parts-")
            .tempdir_in(&out_dir)?;

        let mut section_clips = Vec::with_capacity(timeline.clips.len());
        let mut index = 0usize;

        for (section_index, clip) in timeline.clips.iter().enumerate() {
            info!("Encoding {} ({} segments)", clip.label, clip.segments.len());

            let mut parts = Vec::with_capacity(clip.segments.len());
            for segment in &clip.segments {
                if !segment.audio.path.is_file() {
                    return Err(SlidecastError::Render(format!(
                        "segment audio missing: {}",
                        segment.audio.path.display()
                    )));
                }
                let part = parts_dir.path().join(format!("segment_{:04}.mp4", index));
                self.encode_segment(segment, &part).await?;
                parts.push(part);
                index += 1;
            }

            let section_path = parts_dir.path().join(format!("section_{:03}.mp4", section_index));
            let list = parts_dir.path().join(format!("section_{:03}.txt", section_index));
            self.concat(&parts, &section_path, &list).await?;
            self.ensure_audio(&section_path, &clip.label).await?;

            for part in &parts {
                remove_quietly(part);
            }
            section_clips.push(section_path);
        }

        let list = parts_dir.path().join("final.txt");
        self.concat(&section_clips, output, &list).await?;
        for clip in &section_clips {
            remove_quietly(clip);
        }

        let size_bytes = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        if size_bytes == 0 {
            return Err(SlidecastError::Render(format!(
                "output {} is missing or empty",
                output.display()
            )));
        }
        self.ensure_audio(output, "final video").await?;

        info!("Video written to {} ({} bytes)", output.display(), size_bytes);
        Ok(RenderReport {
            output: output.to_path_buf(),
            segments: timeline.segment_count(),
            sections: timeline.clips.len(),
            duration: timeline.duration(),
            size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::AudioClip;
    use crate::timeline::{lookup_effect, SectionClip};

    fn segment(duration: f64) -> Segment {
        Segment::new(
            PathBuf::from("/work/slide_0000.png"),
            AudioClip {
                path: PathBuf::from("/work/unit_0000.wav"),
                duration,
            },
            lookup_effect("fade").unwrap(),
        )
    }

    fn renderer() -> FfmpegRenderer {
        FfmpegRenderer::new(VideoSettings::default(), 0.5)
    }

    #[test]
    fn test_segment_args() {
        let args = renderer().segment_args(&segment(2.0), Path::new("/out/seg.mp4"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        let joined = args.join(" ");

        assert!(joined.starts_with(
            "-y -loglevel error -loop 1 -framerate 24 -t 2.000 -i /work/slide_0000.png -i /work/unit_0000.wav"
        ));
        assert!(joined.contains("-c:v libx264 -b:v 4000k"));
        assert!(joined.contains("-c:a aac -b:a 192k -ar 44100 -ac 2"));
        assert!(joined.ends_with("-t 2.000 /out/seg.mp4"));

        let vf = &args[args.iter().position(|a| a == "-vf").unwrap() + 1];
        assert_eq!(
            vf,
            "scale=1920:1080,setsar=1,fade=t=in:st=0:d=0.500,fade=t=out:st=1.500:d=0.500,format=yuv420p"
        );
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let list = concat_list(&[PathBuf::from("/a/one.mp4"), PathBuf::from("/b/it's.mp4")]);
        assert_eq!(list, "file '/a/one.mp4'\nfile '/b/it'\\''s.mp4'\n");
    }

    #[test]
    fn test_tool_failures_become_render_errors() {
        let e = render_error(SlidecastError::ToolFailed("boom".into()), "concat");
        assert!(matches!(e, SlidecastError::Render(m) if m == "concat: boom"));
        let e = render_error(SlidecastError::ToolNotFound("ffmpeg".into()), "concat");
        assert!(matches!(e, SlidecastError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_timeline_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = renderer()
            .render(&Timeline::default(), &dir.path().join("out.mp4"))
            .await;
        assert!(matches!(result, Err(SlidecastError::Validation(_))));
    }

    /// Write a tone of `seconds` to `path`; false when ffmpeg is missing.
    async fn tone(path: &Path, seconds: f64) -> bool {
        let source = format!("sine=frequency=440:duration={}", seconds);
        match run_tool(
            "ffmpeg",
            [
                "-y",
                "-loglevel",
                "error",
                "-f",
                "lavfi",
                "-i",
                source.as_str(),
                path.to_str().unwrap(),
            ],
        )
        .await
        {
            Ok(_) => true,
            Err(SlidecastError::ToolNotFound(_)) => false,
            Err(e) => panic!("tone generation failed: {}", e),
        }
    }

    #[tokio::test]
    async fn test_render_sections_with_audio() {
        let dir = tempfile::tempdir().unwrap();
        let slide = dir.path().join("slide.png");
        image::RgbImage::from_pixel(64, 36, image::Rgb([20, 30, 40]))
            .save(&slide)
            .unwrap();

        let mut segments = Vec::new();
        for (i, seconds) in [1.0, 0.5, 1.0].into_iter().enumerate() {
            let audio = dir.path().join(format!("unit_{}.wav", i));
            if !tone(&audio, seconds).await {
                return;
            }
            segments.push(Segment::new(
                slide.clone(),
                AudioClip {
                    path: audio,
                    duration: seconds,
                },
                lookup_effect("fade").unwrap(),
            ));
        }
        let last = segments.split_off(2);
        let timeline = Timeline {
            clips: vec![
                SectionClip {
                    label: "intro 'Introduction'".into(),
                    segments,
                },
                SectionClip {
                    label: "outro 'Conclusion'".into(),
                    segments: last,
                },
            ],
            ..Default::default()
        };

        let video = VideoSettings {
            width: 64,
            height: 36,
            fps: 10,
            codec: "mpeg4".into(),
            ..Default::default()
        };
        let out_dir = dir.path().join("out");
        let output = out_dir.join("video.mp4");
        let report = FfmpegRenderer::new(video, 0.2)
            .render(&timeline, &output)
            .await
            .unwrap();

        assert_eq!(report.segments, 3);
        assert_eq!(report.sections, 2);
        assert!((report.duration - 2.5).abs() < 1e-9);
        assert!(report.size_bytes > 0);
        assert!(has_audio_stream(&output).await.unwrap());
        let measured = crate::audio::probe_duration(&output).await.unwrap();
        assert!((measured - 2.5).abs() < 0.3, "measured {}", measured);

        // Parts and list files are gone.
        let left: Vec<_> = std::fs::read_dir(&out_dir).unwrap().collect();
        assert_eq!(left.len(), 1);
    }
}
