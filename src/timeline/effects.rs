//! Transition effects expressed as ffmpeg video filter chains.
//!
//! Every effect is a pure function from a filter chain and its context to a
//! new filter chain, so effects compose and are testable without ffmpeg.

use tracing::warn;

/// Name of the effect used when nothing else is configured.
pub const DEFAULT_EFFECT: &str = "fade";

/// An ordered ffmpeg filter chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFilter {
    filters: Vec<String>,
}

impl VideoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Comma-joined form for `-vf`.
    pub fn to_arg(&self) -> String {
        self.filters.join(",")
    }
}

/// Segment parameters an effect may depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectContext {
    pub duration: f64,
    pub transition: f64,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl EffectContext {
    /// Transition length, never more than half the segment.
    fn transition(&self) -> f64 {
        self.transition.max(0.0).min(self.duration / 2.0)
    }
}

pub type EffectFn = fn(VideoFilter, &EffectContext) -> VideoFilter;

/// A named effect.
#[derive(Clone, Copy)]
pub struct Effect {
    pub name: &'static str,
    apply: EffectFn,
}

impl Effect {
    pub fn apply(&self, filter: VideoFilter, ctx: &EffectContext) -> VideoFilter {
        (self.apply)(filter, ctx)
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.name)
    }
}

impl PartialEq for Effect {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn fade(filter: VideoFilter, ctx: &EffectContext) -> VideoFilter {
    let d = ctx.transition();
    if d <= 0.0 {
        return filter;
    }
    filter
        .then(format!("fade=t=in:st=0:d={:.3}", d))
        .then(format!("fade=t=out:st={:.3}:d={:.3}", ctx.duration - d, d))
}

fn slide_left(filter: VideoFilter, ctx: &EffectContext) -> VideoFilter {
    let d = ctx.transition();
    if d <= 0.0 {
        return filter;
    }
    filter
        .then("pad=iw*2:ih:0:0:black")
        .then(format!(
            "crop={w}:{h}:'{w}*max(0,1-t/{d:.3})':0",
            w = ctx.width,
            h = ctx.height,
            d = d
        ))
}

fn zoom_in(filter: VideoFilter, ctx: &EffectContext) -> VideoFilter {
    let frames = ((ctx.duration * ctx.fps as f64).ceil() as u64).max(1);
    filter.then(format!(
        "zoompan=z='min(1+0.1*on/{frames},1.1)':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d=1:s={w}x{h}:fps={fps}",
        frames = frames,
        w = ctx.width,
        h = ctx.height,
        fps = ctx.fps
    ))
}

fn rotate(filter: VideoFilter, ctx: &EffectContext) -> VideoFilter {
    let d = ctx.transition();
    if d <= 0.0 {
        return filter;
    }
    filter.then(format!("rotate=a='2*PI*min(t/{:.3},1)':c=black", d))
}

fn none(filter: VideoFilter, _ctx: &EffectContext) -> VideoFilter {
    filter
}

const EFFECTS: &[Effect] = &[
    Effect { name: "fade", apply: fade },
    Effect { name: "slide_left", apply: slide_left },
    Effect { name: "zoom_in", apply: zoom_in },
    Effect { name: "rotate", apply: rotate },
    Effect { name: "none", apply: none },
];

/// Names of all known effects.
pub fn effect_names() -> impl Iterator<Item = &'static str> {
    EFFECTS.iter().map(|e| e.name)
}

/// Find an effect by name (case-insensitive).
pub fn lookup(name: &str) -> Option<Effect> {
    let name = name.trim();
    EFFECTS
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
        .copied()
}

/// Resolve an optional effect name, falling back to `default` and then to
/// [`DEFAULT_EFFECT`] with a warning.
pub fn resolve(name: Option<&str>, default: &str) -> Effect {
    if let Some(name) = name {
        if let Some(effect) = lookup(name) {
            return effect;
        }
        warn!("Unknown effect '{}', using '{}'", name, default);
    }
    lookup(default).unwrap_or_else(|| {
        warn!("Unknown default effect '{}', using '{}'", default, DEFAULT_EFFECT);
        EFFECTS[0]
    })
}
