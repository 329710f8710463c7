//! Expand keyword placeholders in a resource file

use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use idsync_core::guard::display_name;
use idsync_core::keywords::{self, Expansion};
use idsync_core::{ResourceType, SyncConfig, SyncError, SyncResult};

#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Resource file to expand
    pub file: PathBuf,

    /// Resource name used to pick keywords; defaults to the file name
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Resource type (applications or identity-providers)
    #[arg(short = 't', long = "type", default_value = "applications")]
    pub resource_type: ResourceType,

    /// Fail when a placeholder has no keyword
    #[arg(long)]
    pub strict: bool,
}

pub fn execute(args: ExpandArgs, config: &SyncConfig) -> SyncResult<()> {
    let expansion = render(&args, config)?;
    print!("{}", expansion.text);
    Ok(())
}

pub fn render(args: &ExpandArgs, config: &SyncConfig) -> SyncResult<Expansion> {
    let data = fs::read_to_string(&args.file).map_err(|e| SyncError::Read {
        path: args.file.clone(),
        message: e.to_string(),
    })?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => {
            let file_name = args.file.file_name().and_then(|n| n.to_str()).unwrap_or("");
            display_name(file_name).to_string()
        }
    };

    let mapping = keywords::resolve_keywords(&config.keywords, args.resource_type, &name);
    let expansion = keywords::expand(&data, &mapping)?;

    if !expansion.unresolved.is_empty() {
        if args.strict {
            return Err(SyncError::Template(format!(
                "no keyword for {} in {}",
                expansion.unresolved.join(", "),
                args.file.display()
            )));
        }
        for keyword in &expansion.unresolved {
            warn!(resource = %name, keyword = %keyword, "unresolved keyword left as is");
        }
    }

    Ok(expansion)
}
