//! CLI command implementations.

mod config;
mod doctor;
mod generate;
mod init;
mod list;
mod script;
mod video;

pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::run_generate;
pub use init::run_init;
pub use list::run_list;
pub use script::run_script;
pub use video::run_video;
