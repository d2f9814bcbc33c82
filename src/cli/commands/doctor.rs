//! Doctor command - verify system requirements and configuration.

use crate::cli::preflight::version_arg;
use crate::cli::{format_size, Output};
use crate::config::{ProviderKind, Settings};
use crate::timeline::{effect_names, lookup_effect};
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Print a group of checks under a heading and collect them.
fn report_group(title: &str, group: Vec<CheckResult>, all: &mut Vec<CheckResult>) {
    println!("{}", style(title).bold());
    for check in &group {
        check.print();
    }
    println!();
    all.extend(group);
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Slidecast Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    report_group(
        "External Tools",
        vec![
            check_tool("ffmpeg", install_hint_ffmpeg()),
            check_tool("ffprobe", install_hint_ffmpeg()),
        ],
        &mut checks,
    );
    report_group("Speech Synthesis", check_speech(settings), &mut checks);
    report_group("Slides", check_slides(settings), &mut checks);
    report_group("Directories", check_directories(settings), &mut checks);
    report_group("Configuration", vec![check_config_file(config_path)], &mut checks);

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before rendering videos.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Slidecast is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg(version_arg(name)).output() {
        Ok(output) if output.status.success() => {
            // Try to extract version from first line
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout.lines().next().unwrap_or("installed").trim();

            // Truncate long version strings
            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else if version.is_empty() {
                "installed".to_string()
            } else {
                version.to_string()
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check the configured speech provider.
fn check_speech(settings: &Settings) -> Vec<CheckResult> {
    let narration = &settings.narration;
    let mut results = vec![CheckResult::ok(
        "Provider",
        &format!("{} (language {})", narration.provider, narration.language),
    )];
    if let Some(fallback) = narration.fallback {
        results.push(CheckResult::ok(
            "Fallback",
            &format!("{} when {} is misconfigured", fallback, narration.provider),
        ));
    }

    match narration.provider {
        ProviderKind::Local => {
            results.push(check_tool(&narration.local_command, install_hint_tts()));
            if let Some(model) = &narration.local_model {
                let path = Settings::expand_path(model);
                if path.is_file() {
                    results.push(CheckResult::ok("Voice model", &path.display().to_string()));
                } else {
                    results.push(CheckResult::error(
                        "Voice model",
                        &format!("{} not found", path.display()),
                        "Set narration.local_model to a piper .onnx voice",
                    ));
                }
            }
        }
        ProviderKind::Gtts => results.push(CheckResult::warning(
            "Network",
            "gtts needs internet access",
            "Use provider = \"local\" for offline rendering",
        )),
        ProviderKind::OpenAi => results.push(check_openai_api_key()),
    }

    results
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check font and effect configuration.
fn check_slides(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let font = settings.font_path();
    if font.is_file() {
        results.push(CheckResult::ok("Font", &font.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Font",
            &format!("{} not found", font.display()),
            "The built-in bitmap font will be used; set style.font_path to a .ttf file",
        ));
    }

    let effect = &settings.effects.default_effect;
    if lookup_effect(effect).is_some() {
        results.push(CheckResult::ok("Default effect", effect));
    } else {
        results.push(CheckResult::warning(
            "Default effect",
            &format!("unknown effect '{}'", effect),
            &format!(
                "Choose one of: {}",
                effect_names().collect::<Vec<_>>().join(", ")
            ),
        ));
    }

    results
}

/// Check working directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let content_dir = settings.content_dir();
    if content_dir.is_dir() {
        results.push(CheckResult::ok("Content", &content_dir.display().to_string()));
    } else {
        results.push(CheckResult::error(
            "Content",
            &format!("{} does not exist", content_dir.display()),
            "Set general.content_dir to your Markdown posts directory",
        ));
    }

    for (name, dir) in [
        ("Scripts", settings.script_dir()),
        ("Output", settings.output_dir()),
        ("Assets", settings.assets_dir()),
        ("Temp", settings.temp_dir()),
    ] {
        if dir.is_dir() {
            let detail = if name == "Output" {
                format!("{} ({})", dir.display(), format_size(dir_size(&dir)))
            } else {
                dir.display().to_string()
            };
            results.push(CheckResult::ok(name, &detail));
        } else {
            results.push(CheckResult::warning(
                name,
                &format!("{} (will be created)", dir.display()),
                "Directory will be created on first use (or run: slidecast init)",
            ));
        }
    }

    results
}

/// Total size of the files directly inside `dir`.
fn dir_size(dir: &Path) -> u64 {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.metadata().ok())
                .filter(|m| m.is_file())
                .map(|m| m.len())
                .sum()
        })
        .unwrap_or(0)
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: slidecast init",
        )
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

/// Platform-specific install hint for the local TTS engine.
fn install_hint_tts() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install espeak-ng"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install espeak-ng (or set narration.provider)"
    } else {
        "Install from: https://github.com/espeak-ng/espeak-ng"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_missing_content_dir_is_error() {
        let mut settings = Settings::default();
        settings.general.content_dir = "/definitely/missing/posts".into();
        let results = check_directories(&settings);
        assert_eq!(results[0].status, CheckStatus::Error);
    }

    #[test]
    fn test_unknown_effect_is_warning() {
        let mut settings = Settings::default();
        settings.effects.default_effect = "sparkle".into();
        let results = check_slides(&settings);
        assert_eq!(results[1].status, CheckStatus::Warning);
    }
}
