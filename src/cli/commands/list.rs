//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::script::{list_scripts, load_script};
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: &Settings) -> Result<()> {
    let scripts = list_scripts(&settings.script_dir())?;

    if scripts.is_empty() {
        Output::info("No scripts generated yet. Use 'slidecast script' to create some.");
        return Ok(());
    }

    Output::header(&format!("Scripts ({})", scripts.len()));
    println!();

    let mut total_units = 0;
    for path in &scripts {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match load_script(path) {
            Ok(script) => {
                let units = script.unit_count();
                total_units += units;
                Output::script_info(&script.metadata.title, &file, script.sections.len(), units);
            }
            Err(e) => Output::warning(&format!("{}: {}", file, e)),
        }
    }

    println!();
    Output::kv("Directory", &settings.script_dir().display().to_string());
    Output::kv("Total scripts", &scripts.len().to_string());
    Output::kv("Total units", &total_units.to_string());

    Ok(())
}
