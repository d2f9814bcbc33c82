//! Narration scripts: model, assembly and persistence.

mod assembler;
mod model;
mod store;

pub use assembler::{ScriptAssembler, INTRO_PAUSE, OUTRO_PAUSE};
pub use model::{ScriptDocument, ScriptEntry, ScriptSection, SectionKind, SCRIPT_VERSION};
pub use store::{list_scripts, load_script, save_script, script_stem, slugify, write_unique};
