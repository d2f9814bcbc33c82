//! Init command - interactive first-run setup.

use crate::cli::preflight::version_arg;
use crate::cli::Output;
use crate::config::{ProviderKind, Settings};
use console::style;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

/// Simple check result for init command.
struct CheckIssue {
    name: String,
    hint: String,
}

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Slidecast Setup");
    println!();
    println!("Welcome to Slidecast! Let's make sure everything is configured correctly.\n");

    // Step 1: Check prerequisites
    println!("{}", style("Step 1: Checking prerequisites").bold().cyan());
    println!();

    let tool_issues = check_prerequisites(settings);

    if !tool_issues.is_empty() {
        Output::warning("Some tools are missing. Please install them:");
        println!();
        for issue in &tool_issues {
            println!("  {} {} - not found", style("✗").red(), style(&issue.name).bold());
            println!("    {} {}", style("→").dim(), style(&issue.hint).dim());
        }
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info(
                "Setup cancelled. Install the missing tools and run 'slidecast init' again.",
            );
            return Ok(());
        }
    } else {
        Output::success("All required tools are installed!");
    }

    println!();

    // Step 2: Create directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    for (name, dir) in [
        ("Content", settings.content_dir()),
        ("Scripts", settings.script_dir()),
        ("Output", settings.output_dir()),
        ("Assets", settings.assets_dir()),
        ("Temp", settings.temp_dir()),
    ] {
        if dir.exists() {
            Output::info(&format!("{} directory exists: {}", name, dir.display()));
        } else {
            std::fs::create_dir_all(&dir)?;
            Output::success(&format!(
                "Created {} directory: {}",
                name.to_lowercase(),
                dir.display()
            ));
        }
    }

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path.to_path_buf())?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("slidecast doctor").cyan());
    println!("  {} Write scripts for your latest posts", style("slidecast script").cyan());
    println!("  {} Render the newest script", style("slidecast video --latest").cyan());
    println!();
    println!("For more help: {}", style("slidecast --help").cyan());

    Ok(())
}

/// Check prerequisites and return any issues.
fn check_prerequisites(settings: &Settings) -> Vec<CheckIssue> {
    let mut tools = vec!["ffmpeg", "ffprobe"];
    if settings.narration.provider == ProviderKind::Local {
        tools.push(settings.narration.local_command.as_str());
    }

    tools
        .into_iter()
        .filter(|tool| Command::new(tool).arg(version_arg(tool)).output().is_err())
        .map(|tool| CheckIssue {
            name: tool.to_string(),
            hint: install_hint(tool).to_string(),
        })
        .collect()
}

/// Get platform-specific install hint.
fn install_hint(tool: &str) -> &'static str {
    match tool {
        "ffmpeg" | "ffprobe" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install ffmpeg"
            } else if cfg!(target_os = "linux") {
                "Install with: sudo apt install ffmpeg"
            } else {
                "Install from: https://ffmpeg.org/download.html"
            }
        }
        "espeak-ng" | "espeak" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install espeak-ng"
            } else if cfg!(target_os = "linux") {
                "Install with: sudo apt install espeak-ng"
            } else {
                "Install from: https://github.com/espeak-ng/espeak-ng"
            }
        }
        _ => "Check the documentation for installation instructions",
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
