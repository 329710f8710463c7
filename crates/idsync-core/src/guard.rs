//! Protection for the tool's own management application.
//!
//! The application whose inbound auth key is the tool's client id holds the
//! credentials this tool operates with. Its local file is never removed.

use std::path::Path;
use tracing::info;

use crate::auth::AuthConfig;
use crate::config::ServerIdentity;
use crate::error::{SyncError, SyncResult};

/// Whether `import_dir/file_name` describes the tool management application.
///
/// Unreadable or unparsable files are errors, never `false`: a caller about
/// to delete the file must not treat "could not check" as "not protected".
/// Without a configured client id nothing can be matched, which is an error
/// for the same reason.
pub fn is_protected_resource(
    import_dir: &Path,
    file_name: &str,
    identity: &ServerIdentity,
) -> SyncResult<bool> {
    if identity.client_id.trim().is_empty() {
        return Err(SyncError::Config(format!(
            "server.client_id is not set; cannot tell whether {} is the tool management app",
            display_name(file_name)
        )));
    }

    let path = import_dir.join(file_name);
    let data = std::fs::read_to_string(&path).map_err(|e| SyncError::Read {
        path: path.clone(),
        message: e.to_string(),
    })?;

    let config = AuthConfig::parse(&data).map_err(|e| match e {
        SyncError::Parse { message, .. } => SyncError::Parse {
            source_name: path.display().to_string(),
            message,
        },
        other => other,
    })?;

    if config.has_auth_key(&identity.client_id) {
        info!(
            resource = %display_name(file_name),
            "Tool management app is excluded from deletion"
        );
        return Ok(true);
    }
    Ok(false)
}

/// File name without its extension, as shown to users.
pub fn display_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}
