//! Show the authentication properties of a resource file

use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

use idsync_core::auth::AuthConfig;
use idsync_core::guard;
use idsync_core::masking;
use idsync_core::{ServerIdentity, SyncError, SyncResult};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Resource file to inspect
    pub file: PathBuf,

    /// Client id of this tool, to check whether the file is protected
    #[arg(long)]
    pub client_id: Option<String>,
}

/// Authentication properties of one resource file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub oauth: bool,
    pub secret_provided: bool,
    pub secret_masked: bool,
    /// Unknown when no client id was given.
    pub protected: Option<bool>,
}

pub fn execute(args: InspectArgs) -> SyncResult<()> {
    let inspection = inspect(&args.file, args.client_id.as_deref())?;

    println!("oauth:            {}", inspection.oauth);
    println!("secret provided:  {}", inspection.secret_provided);
    println!("secret masked:    {}", inspection.secret_masked);
    if let Some(protected) = inspection.protected {
        println!("protected:        {protected}");
    }
    Ok(())
}

pub fn inspect(file: &Path, client_id: Option<&str>) -> SyncResult<Inspection> {
    let data = fs::read_to_string(file).map_err(|e| SyncError::Read {
        path: file.to_path_buf(),
        message: e.to_string(),
    })?;
    let config = AuthConfig::parse(&data)?;

    let secret_masked = config
        .request_configs()
        .iter()
        .filter(|c| c.is_oauth2())
        .filter_map(|c| c.consumer_secret())
        .any(masking::is_masked);

    let protected = match client_id {
        Some(client_id) => {
            let (dir, file_name) = split_path(file)?;
            Some(guard::is_protected_resource(
                dir,
                file_name,
                &ServerIdentity::new(client_id),
            )?)
        }
        None => None,
    };

    Ok(Inspection {
        oauth: config.is_oauth(),
        secret_provided: config.has_oauth_secret(),
        secret_masked,
        protected,
    })
}

fn split_path(file: &Path) -> SyncResult<(&Path, &str)> {
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SyncError::Io(format!("Not a file path: {}", file.display())))?;
    let dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(
            split_path(Path::new("exports/Applications/console.yaml")).unwrap(),
            (Path::new("exports/Applications"), "console.yaml")
        );
        assert_eq!(
            split_path(Path::new("console.yaml")).unwrap(),
            (Path::new("."), "console.yaml")
        );
    }
}
