//! Show the keyword mapping resolved for a resource

use clap::Args;

use idsync_core::keywords::{self, KeywordMapping};
use idsync_core::{ResourceType, SyncConfig, SyncResult};

#[derive(Args, Debug)]
pub struct KeywordsArgs {
    /// Resource name
    pub name: String,

    /// Resource type (applications or identity-providers)
    #[arg(short = 't', long = "type", default_value = "applications")]
    pub resource_type: ResourceType,
}

pub fn execute(args: KeywordsArgs, config: &SyncConfig) -> SyncResult<()> {
    let mapping = resolve(&args, config);
    if mapping.is_empty() {
        println!("No keywords configured for {} {}", args.resource_type.label(), args.name);
        return Ok(());
    }
    print!("{}", serde_yaml::to_string(&mapping)?);
    Ok(())
}

pub fn resolve(args: &KeywordsArgs, config: &SyncConfig) -> KeywordMapping {
    keywords::resolve_keywords(&config.keywords, args.resource_type, &args.name)
}
