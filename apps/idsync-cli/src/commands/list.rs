//! List resources deployed on the server

use clap::Args;

use idsync_core::{provider_for, HttpTransport, ResourceType, SyncConfig, SyncResult};

use super::selected_types;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Resource type (applications or identity-providers); all types when omitted
    #[arg(short = 't', long = "type")]
    pub resource_type: Option<ResourceType>,

    /// Print only the number of resources
    #[arg(long)]
    pub count: bool,
}

pub fn execute(args: ListArgs, config: &SyncConfig) -> SyncResult<()> {
    let transport = HttpTransport::new(&config.server)?;
    let identity = config.identity();

    for resource_type in selected_types(args.resource_type) {
        let provider = provider_for(resource_type, &transport, &config.keywords, &identity);

        if args.count {
            println!("{}: {}", resource_type.dir_name(), provider.count()?);
            continue;
        }

        let resources = provider.list()?;
        println!("{} ({})", resource_type.dir_name(), resources.len());
        for resource in resources {
            println!("  {:<40} {}", resource.name, resource.id);
        }
    }

    Ok(())
}
