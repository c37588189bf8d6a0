//! Command handlers for CLI subcommands.

use rootstash_core::{
    catalog, GitCli, Runner, SnapshotStore, StashConfig, StashError, ToolchainSource,
};
use tracing::{info, warn};

use crate::cli::Commands;

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, StashError>;

/// Exit status of a command that finished normally.
pub const EXIT_OK: i32 = 0;

/// Exit status for failures, including launch failures in `run`.
pub const EXIT_FAILURE: i32 = 1;

/// Execute a CLI command, returning the process exit status.
pub fn execute(command: Commands, config: &StashConfig) -> Result<i32> {
    match command {
        Commands::Save { name } => cmd_save(config, name.as_deref()),
        Commands::List => cmd_list(config),
        Commands::Run { name, command } => cmd_run(config, &name, &command),
    }
}

fn cmd_save(config: &StashConfig, name: Option<&str>) -> Result<i32> {
    let root = config.resolve_toolchain_root()?;
    let store = SnapshotStore::new(config.store_dir());
    let source = ToolchainSource::from_config(config, &root);

    let report = store.save(&source, &GitCli::new(&root), name)?;

    info!(
        identity = %report.identity,
        path = %report.path.display(),
        alias = report.alias.as_deref().unwrap_or(""),
        "Snapshot ready"
    );
    Ok(EXIT_OK)
}

fn cmd_list(config: &StashConfig) -> Result<i32> {
    for entry in catalog::scan(config.store_dir())? {
        println!("{}", entry.render());
    }
    Ok(EXIT_OK)
}

fn cmd_run(config: &StashConfig, name: &str, command: &[String]) -> Result<i32> {
    let runner = Runner::new(config.store_dir(), config.toolchain);

    match runner.run(name, command) {
        Ok(status) if status.success() => Ok(EXIT_OK),
        Ok(status) => {
            warn!(%status, "Saved toolchain command failed");
            // Signal deaths carry no code.
            Ok(status.code().unwrap_or(EXIT_FAILURE))
        }
        Err(e @ StashError::CommandLaunch { .. }) => {
            println!("command failed: {}", e);
            Ok(EXIT_FAILURE)
        }
        Err(e) => Err(e),
    }
}
