//! idsync - synchronize identity server resources with local YAML files
//!
//! This CLI enables operators to:
//! - List applications and identity providers deployed on a server
//! - Export them into a directory with OAuth secrets masked
//! - Preview what importing a directory would create or update
//! - Inspect, mask, and keyword-expand individual resource files

use clap::Parser;

use idsync_cli::{run, Cli};

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}
