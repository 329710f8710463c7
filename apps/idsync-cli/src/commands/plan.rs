//! Compare a local directory with the server

use clap::Args;
use std::path::PathBuf;

use idsync_core::reconcile::{self, ReconcilePlan};
use idsync_core::{provider_for, HttpTransport, ResourceType, SyncConfig, SyncError, SyncResult};

use super::{print_failures, selected_types};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Directory holding the local resource files
    #[arg(short = 'd', long = "dir")]
    pub dir: PathBuf,

    /// Resource type (applications or identity-providers); all types when omitted
    #[arg(short = 't', long = "type")]
    pub resource_type: Option<ResourceType>,
}

pub fn execute(args: PlanArgs, config: &SyncConfig) -> SyncResult<()> {
    let transport = HttpTransport::new(&config.server)?;
    let identity = config.identity();
    let mut failed = 0;

    for resource_type in selected_types(args.resource_type) {
        let provider = provider_for(resource_type, &transport, &config.keywords, &identity);
        let plan = reconcile::plan(&*provider, &args.dir)?;
        print!("{}", render(resource_type, &plan));
        print_failures(&plan.failures);
        failed += plan.failures.len();
    }

    if failed > 0 {
        return Err(SyncError::Incomplete(failed));
    }
    Ok(())
}

/// Human readable plan for one resource type.
pub fn render(resource_type: ResourceType, plan: &ReconcilePlan) -> String {
    let mut out = format!("{}\n", resource_type.dir_name());
    for name in &plan.to_create {
        out.push_str(&format!("  + {name}\n"));
    }
    for name in &plan.to_update {
        out.push_str(&format!("  ~ {name}\n"));
    }
    for name in &plan.remote_only {
        out.push_str(&format!("  = {name} (server only)\n"));
    }
    for (name, notice) in &plan.notices {
        out.push_str(&format!("  ! {name}: {notice}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plan() {
        let plan = ReconcilePlan {
            to_create: vec!["pickup".to_string()],
            to_update: vec!["console".to_string()],
            remote_only: vec!["myaccount".to_string()],
            notices: vec![("pickup".to_string(), "unresolved keyword ENV".to_string())],
            failures: vec![],
        };

        assert_eq!(
            render(ResourceType::Application, &plan),
            "Applications\n  + pickup\n  ~ console\n  = myaccount (server only)\n  ! pickup: unresolved keyword ENV\n"
        );
    }
}
