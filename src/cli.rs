//! Command-line interface.

use crate::config::{Config, ServerMode};
use clap::Parser;
use std::path::PathBuf;

/// Streaming speech-to-text WebSocket service.
#[derive(Parser, Debug)]
#[command(name = "streamscribe", version, about)]
pub struct Cli {
    /// Path to the configuration file (default: ~/.config/streamscribe/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8765
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Server mode
    #[arg(long, value_enum)]
    pub mode: Option<ServerMode>,

    /// Language hint forwarded to the ASR backend
    #[arg(long)]
    pub language: Option<String>,

    /// External ASR command ({file} and {lang} are substituted)
    #[arg(long)]
    pub stt_command: Option<String>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    /// Flags win over both file and environment.
    pub fn apply(&self, config: &mut Config) {
        if let Some(listen) = &self.listen {
            config.server.listen = listen.clone();
        }
        if let Some(mode) = self.mode {
            config.server.mode = mode;
        }
        if let Some(language) = &self.language {
            config.stt.language = language.clone();
        }
        if let Some(command) = &self.stt_command {
            config.stt.command = command.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_no_args() {
        let cli = Cli::parse_from(["streamscribe"]);
        assert!(cli.config.is_none());
        assert!(cli.listen.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "streamscribe",
            "--listen",
            "127.0.0.1:9000",
            "--mode",
            "oneshot",
            "--language",
            "en",
            "--stt-command",
            "my-asr {file}",
        ]);

        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.server.listen, "127.0.0.1:9000");
        assert_eq!(config.server.mode, ServerMode::Oneshot);
        assert_eq!(config.stt.language, "en");
        assert_eq!(config.stt.command, "my-asr {file}");
    }

    #[test]
    fn test_cli_without_overrides_leaves_config_untouched() {
        let cli = Cli::parse_from(["streamscribe"]);
        let mut config = Config::default();
        let before = config.clone();
        cli.apply(&mut config);
        assert_eq!(config, before);
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::parse_from(["streamscribe", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
