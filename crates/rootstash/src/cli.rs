//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use rootstash_core::config::{default_store_dir, STORE_DIR_ENV};
use rootstash_core::StashConfig;
use std::path::PathBuf;

/// Rootstash - save, list and run toolchain builds
#[derive(Parser, Debug)]
#[command(name = "rootstash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print each file copied (-v); more raises log verbosity (-vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Directory of saved toolchain roots
    #[arg(long, env = STORE_DIR_ENV, value_name = "DIRECTORY")]
    pub dir: Option<PathBuf>,

    /// Toolchain checkout to save (default: $GOROOT or `go env GOROOT`)
    #[arg(long, value_name = "DIRECTORY")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Snapshot the current toolchain build, optionally under a name
    Save {
        /// Alias for the snapshot
        name: Option<String>,
    },

    /// List saved toolchains, oldest commit first
    List,

    /// Run a command from a saved toolchain
    Run {
        /// Snapshot identity or alias
        #[arg(required = true)]
        name: String,

        /// Binary in the snapshot's bin directory, then its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

impl Cli {
    /// Returns the store directory, using the default if not specified.
    pub fn store_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_store_dir)
    }

    /// Builds the configuration shared by every command.
    pub fn config(&self) -> StashConfig {
        let mut config = StashConfig::new(self.store_dir()).with_verbose(self.verbose > 0);
        if let Some(root) = &self.root {
            config = config.with_toolchain_root(root);
        }
        config
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_save_without_name() {
        let cli = Cli::parse_from(["rootstash", "save"]);
        match cli.command {
            Commands::Save { name } => assert!(name.is_none()),
            _ => panic!("Expected Save command"),
        }
    }

    #[test]
    fn test_cli_parse_save_with_name() {
        let cli = Cli::parse_from(["rootstash", "-v", "--dir", "/tmp/s", "save", "tip"]);
        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.store_dir(), PathBuf::from("/tmp/s"));
        assert!(cli.config().verbose);
        match cli.command {
            Commands::Save { name } => assert_eq!(name.as_deref(), Some("tip")),
            _ => panic!("Expected Save command"),
        }
    }

    #[test]
    fn test_cli_parse_run_keeps_command_flags() {
        let cli = Cli::parse_from(["rootstash", "run", "tip", "go", "test", "-run", "X", "./..."]);
        match cli.command {
            Commands::Run { name, command } => {
                assert_eq!(name, "tip");
                assert_eq!(command, ["go", "test", "-run", "X", "./..."]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_run_requires_command() {
        let err = Cli::try_parse_from(["rootstash", "run", "tip"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_cli_rejects_extra_save_args() {
        let err = Cli::try_parse_from(["rootstash", "save", "a", "b"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_cli_rejects_extra_list_args() {
        let err = Cli::try_parse_from(["rootstash", "list", "x"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_cli_rejects_unknown_subcommand() {
        let err = Cli::try_parse_from(["rootstash", "frobnicate"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_cli_root_flag() {
        let cli = Cli::parse_from(["rootstash", "--root", "/opt/go", "list"]);
        assert_eq!(
            cli.config().toolchain_root,
            Some(PathBuf::from("/opt/go"))
        );
    }

    #[test]
    fn test_cli_verbose_levels() {
        let cli = Cli::parse_from(["rootstash", "-vvv", "list"]);
        assert_eq!(cli.log_level(), tracing::Level::TRACE);
        let cli = Cli::parse_from(["rootstash", "list"]);
        assert_eq!(cli.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}
