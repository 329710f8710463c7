//! Resource reconciliation between a local directory of YAML files and a
//! remote identity server.
//!
//! Applications and identity providers are listed, exported, and compared
//! through the [`provider::ResourceProvider`] capability set. OAuth consumer
//! secrets are masked before exported files reach disk, and the application
//! this tool authenticates as is never removed during stale-file cleanup.

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod keywords;
pub mod lister;
pub mod masking;
pub mod models;
pub mod provider;
pub mod reconcile;
pub mod status;
pub mod transport;

pub use config::{ConfigPaths, ServerConfig, ServerIdentity, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use models::{Resource, ResourceType};
pub use provider::{provider_for, ResourceProvider};
pub use transport::{HttpTransport, ResourceTransport};
