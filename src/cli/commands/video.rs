//! Video command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{format_duration, format_size, Output};
use crate::config::Settings;
use crate::orchestrator::{Pipeline, RenderSummary};
use anyhow::Result;
use std::path::Path;

/// Run the video command. Without a script path the newest script is used.
pub async fn run_video(script: Option<String>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Video, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'slidecast doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let bar = Output::progress_bar("Starting");
    let pipeline = Pipeline::new(settings)?.with_reporter(Output::reporter(&bar));

    let path = match script {
        Some(path) => Settings::expand_path(&path),
        None => match pipeline.latest_script()? {
            Some(path) => path,
            None => {
                bar.finish_and_clear();
                Output::warning("No scripts found. Run 'slidecast script' first.");
                return Ok(());
            }
        },
    };

    Output::info(&format!("Rendering {}", path.display()));
    let result = pipeline.render_script(&path).await;
    bar.finish_and_clear();

    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to render {}: {}", display_name(&path), e));
            Err(e.into())
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print what was rendered and what was skipped.
pub fn print_summary(summary: &RenderSummary) {
    let report = &summary.report;
    Output::success(&format!("Rendered '{}'", summary.title));
    Output::kv("File", &report.output.display().to_string());
    Output::kv("Duration", &format_duration(report.duration));
    Output::kv("Size", &format_size(report.size_bytes));
    Output::kv(
        "Segments",
        &format!("{} in {} sections", report.segments, report.sections),
    );

    if !summary.skipped.is_empty() {
        Output::warning(&format!("{} narration units skipped:", summary.skipped.len()));
        for unit in &summary.skipped {
            Output::list_item(&format!("{}: \"{}\" ({})", unit.section, unit.text, unit.reason));
        }
    }
    for section in &summary.dropped_sections {
        Output::warning(&format!("Section dropped (nothing rendered): {}", section));
    }
}
