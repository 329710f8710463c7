//! Export server resources into a local directory

use clap::Args;
use std::path::PathBuf;

use idsync_core::reconcile::{self, ExportReport};
use idsync_core::{provider_for, HttpTransport, ResourceType, SyncConfig, SyncError, SyncResult};

use super::{print_failures, selected_types};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Directory to export into
    #[arg(short = 'd', long = "dir")]
    pub dir: PathBuf,

    /// Resource type (applications or identity-providers); all types when omitted
    #[arg(short = 't', long = "type")]
    pub resource_type: Option<ResourceType>,

    /// Delete local files of resources that no longer exist on the server
    #[arg(long)]
    pub remove_stale: bool,
}

pub fn execute(args: ExportArgs, config: &SyncConfig) -> SyncResult<()> {
    let transport = HttpTransport::new(&config.server)?;
    let identity = config.identity();
    let mut failed = 0;

    for resource_type in selected_types(args.resource_type) {
        let provider = provider_for(resource_type, &transport, &config.keywords, &identity);
        let report = reconcile::export(&*provider, &args.dir, args.remove_stale)?;
        println!("{}", summary(resource_type, &report));
        print_failures(&report.failures);
        failed += report.failures.len();
    }

    if failed > 0 {
        return Err(SyncError::Incomplete(failed));
    }
    Ok(())
}

/// One-line outcome of exporting a resource type.
pub fn summary(resource_type: ResourceType, report: &ExportReport) -> String {
    let mut line = format!(
        "{}: {} exported",
        resource_type.dir_name(),
        report.exported.len()
    );
    if !report.removed.is_empty() {
        line.push_str(&format!(", {} removed", report.removed.len()));
    }
    if !report.protected.is_empty() {
        line.push_str(&format!(", {} protected", report.protected.len()));
    }
    if !report.failures.is_empty() {
        line.push_str(&format!(", {} failed", report.failures.len()));
    }
    line
}
