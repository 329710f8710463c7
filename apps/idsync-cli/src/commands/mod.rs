//! CLI command implementations

pub mod expand;
pub mod export;
pub mod inspect;
pub mod keywords;
pub mod list;
pub mod mask;
pub mod plan;

use idsync_core::reconcile::ResourceFailure;
use idsync_core::ResourceType;

/// The requested resource type, or every type when none was given.
pub fn selected_types(resource_type: Option<ResourceType>) -> Vec<ResourceType> {
    match resource_type {
        Some(resource_type) => vec![resource_type],
        None => ResourceType::ALL.to_vec(),
    }
}

pub(crate) fn print_failures(failures: &[ResourceFailure]) {
    for failure in failures {
        eprintln!("  failed: {}: {}", failure.name, failure.error);
    }
}
