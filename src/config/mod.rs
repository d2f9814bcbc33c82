//! Configuration module for Slidecast.
//!
//! Settings are loaded once at startup and passed explicitly to every component.

mod settings;

pub use settings::{
    EffectSettings, FontSizes, GeneralSettings, NarrationSettings, ProviderKind, ScriptSettings,
    Settings, StyleSettings, VideoSettings,
};
