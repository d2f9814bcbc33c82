//! Script command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::generate_scripts;
use crate::source::MarkdownDirSource;
use anyhow::Result;

/// Run the script command.
pub async fn run_script(count: Option<usize>, settings: &Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Script, settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'slidecast doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let limit = count.unwrap_or(settings.general.num_posts);
    Output::info(&format!(
        "Generating scripts for up to {} posts from {}",
        limit,
        settings.content_dir().display()
    ));

    let source = MarkdownDirSource::new(settings.content_dir());
    let spinner = Output::spinner("Writing scripts...");
    let reporter = Output::reporter(&spinner);
    let result = generate_scripts(settings, &source, limit, &reporter).await;
    spinner.finish_and_clear();

    let generated = result?;
    if generated.is_empty() {
        Output::warning("No posts with content found.");
        return Ok(());
    }

    Output::header(&format!("Generated Scripts ({})", generated.len()));
    println!();
    for script in &generated {
        let file = script
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Output::script_info(&script.title, &file, script.sections, script.units);
    }
    println!();
    Output::success(&format!(
        "Scripts saved to {}",
        settings.script_dir().display()
    ));

    Ok(())
}
