//! Command-line configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Decode gamification event payloads and report every rejection.
#[derive(Debug, Parser)]
#[command(name = "gamification-event-validate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories holding JSON payloads.
    ///
    /// Directories are walked recursively and only `.json` files are read.
    #[arg(required = true, env = "EVENT_VALIDATE_PATHS", value_delimiter = ',')]
    pub paths: Vec<PathBuf>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, env = "EVENT_VALIDATE_LOG_LEVEL", default_value = "error")]
    pub log_level: String,

    /// Log output format.
    #[arg(
        long,
        env = "EVENT_VALIDATE_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact
    )]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths_and_defaults() {
        let cli =
            Cli::try_parse_from(["gamification-event-validate", "a.json", "payloads"]).unwrap();
        assert_eq!(
            cli.paths,
            vec![PathBuf::from("a.json"), PathBuf::from("payloads")]
        );
        assert_eq!(cli.log_level, "error");
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_parse_log_options() {
        let cli = Cli::try_parse_from([
            "gamification-event-validate",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "payloads",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let result = Cli::try_parse_from([
            "gamification-event-validate",
            "--log-format",
            "yaml",
            "payloads",
        ]);
        assert!(result.is_err());
    }
}
