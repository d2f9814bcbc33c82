//! Generate command - scripts and videos in one go.

use super::video::print_summary;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use anyhow::Result;

/// Run the generate command.
pub async fn run_generate(count: Option<usize>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    for operation in [Operation::Script, Operation::Video] {
        if let Err(e) = preflight::check(operation, &settings) {
            Output::error(&format!("{}", e));
            Output::info("Run 'slidecast doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    }

    let limit = count.unwrap_or(settings.general.num_posts);
    let bar = Output::progress_bar("Starting");
    let pipeline = Pipeline::new(settings)?.with_reporter(Output::reporter(&bar));

    let outcomes = pipeline.process_recent(limit).await;
    bar.finish_and_clear();
    let outcomes = outcomes?;

    let mut failed = 0;
    for outcome in &outcomes {
        println!();
        match &outcome.result {
            Ok(summary) => print_summary(summary),
            Err(e) => {
                failed += 1;
                Output::error(&format!("'{}' failed: {}", outcome.title, e));
                if let Some(script) = &outcome.script {
                    Output::kv("Script", &script.display().to_string());
                }
            }
        }
    }

    println!();
    let succeeded = outcomes.len() - failed;
    if failed == 0 {
        Output::success(&format!("All {} videos rendered.", succeeded));
        Ok(())
    } else if succeeded > 0 {
        Output::warning(&format!("{} videos rendered, {} failed.", succeeded, failed));
        Ok(())
    } else {
        Err(anyhow::anyhow!("all {} videos failed", failed))
    }
}
