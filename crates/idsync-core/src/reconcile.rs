//! Reconciliation driver.
//!
//! Works on one resource type at a time through [`ResourceProvider`]. The
//! local directory of a type is `<root>/<TypeDir>/`, one `<name>.yaml` per
//! resource.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{SyncError, SyncResult};
use crate::guard::display_name;
use crate::models::{Resource, ResourceType};
use crate::provider::ResourceProvider;

const FILE_EXTENSION: &str = "yaml";

/// A resource that could not be processed; other resources are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFailure {
    pub name: String,
    pub error: String,
}

impl ResourceFailure {
    fn new(name: impl Into<String>, error: &SyncError) -> Self {
        Self {
            name: name.into(),
            error: error.to_string(),
        }
    }
}

/// A resource file found in a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub file_name: String,
    /// File name without extension; matched against remote names.
    pub name: String,
}

/// What importing a local directory would do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Local resources missing on the server.
    pub to_create: Vec<String>,
    /// Local resources already on the server.
    pub to_update: Vec<String>,
    /// Server resources with no local file.
    pub remote_only: Vec<String>,
    /// Warnings and unresolved keywords per local resource.
    pub notices: Vec<(String, String)>,
    pub failures: Vec<ResourceFailure>,
}

/// Outcome of an export run for one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub exported: Vec<String>,
    /// Stale local files deleted because the resource is gone remotely.
    pub removed: Vec<String>,
    /// Stale local files kept because they belong to the tool itself.
    pub protected: Vec<String>,
    pub failures: Vec<ResourceFailure>,
}

/// Directory holding one resource type's files under `root`.
pub fn type_dir(root: &Path, resource_type: ResourceType) -> PathBuf {
    root.join(resource_type.dir_name())
}

/// Remote resources of the provider's type, rejecting duplicate names.
///
/// Names are used as file names, so two resources sharing a name would
/// overwrite each other on export.
pub fn deployed(provider: &dyn ResourceProvider) -> SyncResult<Vec<Resource>> {
    let resources = provider.list()?;
    let mut seen = HashSet::new();
    for resource in &resources {
        if !seen.insert(resource.name.as_str()) {
            return Err(SyncError::DuplicateName {
                resource_type: provider.resource_type().label().to_string(),
                name: resource.name.clone(),
            });
        }
    }
    Ok(resources)
}

/// Resource files in `dir`, sorted by file name. A missing directory is
/// treated as empty.
pub fn local_files(dir: &Path) -> SyncResult<Vec<LocalFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| SyncError::Read {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %entry.path().display(), "skipping file with non UTF-8 name");
            continue;
        };
        let extension = Path::new(&file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        if !matches!(extension.as_deref(), Some("yaml" | "yml")) {
            continue;
        }
        files.push(LocalFile {
            name: display_name(&file_name).to_string(),
            file_name,
        });
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Compare the local directory of a resource type with the server.
///
/// A file whose declared resource name differs from its file name is a
/// failure rather than a create. A declared name still holding an unresolved
/// placeholder is not compared; the keyword is already reported as a notice.
pub fn plan(provider: &dyn ResourceProvider, root: &Path) -> SyncResult<ReconcilePlan> {
    let dir = type_dir(root, provider.resource_type());
    let remote: BTreeSet<String> = deployed(provider)?.into_iter().map(|r| r.name).collect();
    let locals = local_files(&dir)?;

    let mut plan = ReconcilePlan::default();
    let mut local_names = BTreeSet::new();

    for local in &locals {
        if !local_names.insert(local.name.clone()) {
            plan.failures.push(ResourceFailure {
                name: local.name.clone(),
                error: format!("more than one local file for '{}'", local.name),
            });
            continue;
        }

        let check = fs::read_to_string(dir.join(&local.file_name))
            .map_err(|e| SyncError::Read {
                path: dir.join(&local.file_name),
                message: e.to_string(),
            })
            .and_then(|data| provider.check_import(&local.name, &data))
            .and_then(|check| {
                match provider.declared_name(&check.content)? {
                    Some(declared) if declared != local.name && !declared.contains("{{") => Err(SyncError::Parse {
                        source_name: local.file_name.clone(),
                        message: format!(
                            "file declares name '{declared}', expected '{}'",
                            local.name
                        ),
                    }),
                    _ => Ok(check),
                }
            });

        match check {
            Ok(check) => {
                for keyword in check.unresolved {
                    plan.notices
                        .push((local.name.clone(), format!("unresolved keyword {keyword}")));
                }
                for warning in check.warnings {
                    plan.notices.push((local.name.clone(), warning));
                }
            }
            Err(e) => {
                plan.failures.push(ResourceFailure::new(&local.name, &e));
                continue;
            }
        }

        if remote.contains(&local.name) {
            plan.to_update.push(local.name.clone());
        } else {
            plan.to_create.push(local.name.clone());
        }
    }

    plan.remote_only = remote.difference(&local_names).cloned().collect();
    Ok(plan)
}

/// Export every remote resource of the provider's type into `root`.
///
/// Per-resource failures are collected in the report. A fatal error (the
/// server answered with something that is not the expected list) aborts.
/// With `remove_stale`, local files for resources no longer on the server
/// are deleted unless the provider marks them protected.
pub fn export(
    provider: &dyn ResourceProvider,
    root: &Path,
    remove_stale: bool,
) -> SyncResult<ExportReport> {
    let resource_type = provider.resource_type();
    let dir = type_dir(root, resource_type);
    let resources = deployed(provider)?;

    fs::create_dir_all(&dir).map_err(|e| {
        SyncError::Io(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;

    let mut report = ExportReport::default();
    for resource in &resources {
        match export_one(provider, &dir, resource) {
            Ok(()) => {
                info!(resource_type = %resource_type, resource = %resource.name, "exported");
                report.exported.push(resource.name.clone());
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(resource_type = %resource_type, resource = %resource.name, error = %e, "export failed");
                report.failures.push(ResourceFailure::new(&resource.name, &e));
            }
        }
    }

    if remove_stale {
        let remote: HashSet<&str> = resources.iter().map(|r| r.name.as_str()).collect();
        for local in local_files(&dir)? {
            if remote.contains(local.name.as_str()) {
                continue;
            }
            match provider.is_protected(&dir, &local.file_name) {
                Ok(true) => report.protected.push(local.name),
                Ok(false) => match fs::remove_file(dir.join(&local.file_name)) {
                    Ok(()) => {
                        info!(resource_type = %resource_type, resource = %local.name, "removed stale local file");
                        report.removed.push(local.name);
                    }
                    Err(e) => report
                        .failures
                        .push(ResourceFailure::new(&local.name, &SyncError::from(e))),
                },
                Err(e) => {
                    warn!(resource = %local.name, error = %e, "cannot verify file, keeping it");
                    report.failures.push(ResourceFailure::new(&local.name, &e));
                }
            }
        }
    }

    Ok(report)
}

fn export_one(provider: &dyn ResourceProvider, dir: &Path, resource: &Resource) -> SyncResult<()> {
    let file_name = file_name_for(&resource.name)?;
    let data = provider.fetch_file(resource)?;
    let prepared = provider.prepare_for_export(&data)?;

    let path = dir.join(file_name);
    fs::write(&path, prepared.as_bytes()).map_err(|e| {
        SyncError::Io(format!("Failed to write to file {}: {}", path.display(), e))
    })
}

fn file_name_for(name: &str) -> SyncResult<String> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(SyncError::Io(format!(
            "resource name '{name}' cannot be used as a file name"
        )));
    }
    Ok(format!("{name}.{FILE_EXTENSION}"))
}
