//! CLI module for Slidecast.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_duration, format_size, Output};

use clap::{Parser, Subcommand};

/// Slidecast - narrated slide videos from Markdown posts
///
/// Turns posts into narration scripts, then renders each script into a video
/// of text slides with synthesized speech.
#[derive(Parser, Debug)]
#[command(name = "slidecast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration and create the working directories
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Generate narration scripts from the most recent posts
    Script {
        /// Number of posts to process (defaults to general.num_posts)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Render a narration script into a video
    Video {
        /// Path to a script file
        #[arg(required_unless_present = "latest", conflicts_with = "latest")]
        script: Option<String>,

        /// Use the most recently generated script
        #[arg(long)]
        latest: bool,
    },

    /// Generate scripts and render videos for the most recent posts
    Generate {
        /// Number of posts to process (defaults to general.num_posts)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// List generated scripts
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_latest() {
        let cli = Cli::try_parse_from(["slidecast", "-vv", "video", "--latest"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Video { script: None, latest: true }));
    }

    #[test]
    fn test_video_requires_script_or_latest() {
        assert!(Cli::try_parse_from(["slidecast", "video"]).is_err());
        assert!(Cli::try_parse_from(["slidecast", "video", "a.json", "--latest"]).is_err());
    }

    #[test]
    fn test_parse_script_count() {
        let cli = Cli::try_parse_from(["slidecast", "-c", "my.toml", "script", "-n", "3"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("my.toml"));
        assert!(matches!(cli.command, Commands::Script { count: Some(3) }));
    }
}
