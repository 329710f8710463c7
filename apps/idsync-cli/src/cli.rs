//! Command-line definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use idsync_core::config::LoggingConfig;
use idsync_core::{ConfigPaths, SyncConfig, SyncResult};

use crate::commands;
use crate::logging;

/// idsync - Synchronize identity server resources with local YAML files
#[derive(Parser, Debug)]
#[command(name = "idsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to the configuration file
    #[arg(long, global = true, env = "IDSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (overrides the configuration)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> SyncResult<SyncConfig> {
        ConfigPaths::resolve(self.config.as_deref())?.load()
    }

    /// Load the configuration and install logging as it describes.
    fn prepare(&self) -> SyncResult<SyncConfig> {
        let config = self.load_config()?;
        self.init_logging(Some(&config.logging))?;
        Ok(config)
    }

    /// Install the log subscriber. `--log-level` wins over the file setting.
    pub fn init_logging(&self, configured: Option<&LoggingConfig>) -> SyncResult<()> {
        let defaults = LoggingConfig::default();
        let configured = configured.unwrap_or(&defaults);
        let level = self.log_level.as_deref().unwrap_or(&configured.level);
        logging::init_logging(level, &configured.format)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List resources deployed on the server
    List(commands::list::ListArgs),

    /// Export server resources into a local directory
    Export(commands::export::ExportArgs),

    /// Compare a local directory with the server
    Plan(commands::plan::PlanArgs),

    /// Mask OAuth consumer secret placeholders in a resource file
    Mask(commands::mask::MaskArgs),

    /// Show the authentication properties of a resource file
    Inspect(commands::inspect::InspectArgs),

    /// Show the keyword mapping resolved for a resource
    Keywords(commands::keywords::KeywordsArgs),

    /// Expand keyword placeholders in a resource file
    Expand(commands::expand::ExpandArgs),
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> SyncResult<()> {
    let global = cli.global;
    match cli.command {
        Commands::List(args) => commands::list::execute(args, &global.prepare()?),
        Commands::Export(args) => commands::export::execute(args, &global.prepare()?),
        Commands::Plan(args) => commands::plan::execute(args, &global.prepare()?),
        Commands::Keywords(args) => commands::keywords::execute(args, &global.prepare()?),
        Commands::Expand(args) => commands::expand::execute(args, &global.prepare()?),
        Commands::Mask(args) => {
            global.init_logging(None)?;
            commands::mask::execute(args)
        }
        Commands::Inspect(args) => {
            global.init_logging(None)?;
            commands::inspect::execute(args)
        }
    }
}
