//! Modules directory on disk.
//!
//! Each immediate child of the modules root that carries a `module.json`
//! manifest is a loaded module. Directories without a manifest are skipped so
//! scratch folders next to real modules do not show up in menus.

use super::{ModuleId, ModuleInfo, QueryableResourceIndex, ResourceLocation};
use crate::paths::DEFINITION_EXTENSION;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the per-module manifest.
pub const MODULE_MANIFEST: &str = "module.json";

#[derive(Debug, Deserialize)]
struct ModuleManifest {
    id: u64,
    name: String,
}

#[derive(Debug)]
struct LoadedModule {
    info: ModuleInfo,
    dir: PathBuf,
}

/// Directory-backed module registry keyed by module id.
#[derive(Debug)]
pub struct DirectoryRegistry {
    root: PathBuf,
    modules: BTreeMap<ModuleId, LoadedModule>,
}

impl DirectoryRegistry {
    /// Scan `root` for module directories.
    ///
    /// Fails on unreadable or malformed manifests and on duplicate ids; a
    /// registry that silently dropped a module would make `ModuleNotFound`
    /// misleading.
    pub fn open(root: &Path) -> Result<Self> {
        let root = fs::canonicalize(root)
            .with_context(|| format!("Unable to canonicalize modules dir at {}", root.display()))?;
        let mut modules: BTreeMap<ModuleId, LoadedModule> = BTreeMap::new();
        for entry in fs::read_dir(&root).with_context(|| format!("reading {}", root.display()))? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            // Module directories may be symlinks; reads compare against the resolved path.
            let dir = fs::canonicalize(entry.path())
                .with_context(|| format!("resolving {}", entry.path().display()))?;
            let manifest_path = dir.join(MODULE_MANIFEST);
            if !manifest_path.is_file() {
                debug!(dir = %dir.display(), "skipping directory without manifest");
                continue;
            }
            let manifest = load_manifest(&manifest_path)?;
            let id = ModuleId(manifest.id);
            if let Some(existing) = modules.get(&id) {
                bail!(
                    "duplicate module id {} in {} and {}",
                    id,
                    existing.dir.display(),
                    dir.display()
                );
            }
            modules.insert(
                id,
                LoadedModule {
                    info: ModuleInfo {
                        id,
                        name: manifest.name,
                    },
                    dir,
                },
            );
        }
        debug!(root = %root.display(), modules = modules.len(), "opened module registry");
        Ok(Self { root, modules })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn module_dir(&self, id: ModuleId) -> Option<&Path> {
        self.modules.get(&id).map(|module| module.dir.as_path())
    }
}

impl QueryableResourceIndex for DirectoryRegistry {
    fn modules(&self) -> Vec<ModuleInfo> {
        self.modules.values().map(|module| module.info.clone()).collect()
    }

    fn module(&self, id: ModuleId) -> Option<ModuleInfo> {
        self.modules.get(&id).map(|module| module.info.clone())
    }

    fn find_entries(&self, module: ModuleId, prefix: &str) -> Vec<ResourceLocation> {
        let Some(loaded) = self.modules.get(&module) else {
            return Vec::new();
        };
        let start = loaded.dir.join(prefix.trim_matches('/'));
        let mut files = Vec::new();
        if let Err(err) = collect_from_dir(&start, &mut files) {
            warn!(dir = %start.display(), error = %err, "unable to scan module directory");
        }
        files.sort();
        files
            .into_iter()
            .filter_map(|file| relative_resource_path(&loaded.dir, &file))
            .map(|path| ResourceLocation::new(module, loaded.info.name.clone(), path))
            .collect()
    }

    fn read(&self, location: &ResourceLocation) -> io::Result<Vec<u8>> {
        let dir = self.module_dir(location.module).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("module {} is not loaded", location.module),
            )
        })?;
        let candidate = dir.join(location.path.trim_start_matches('/'));
        let canonical = fs::canonicalize(&candidate)?;
        if !canonical.starts_with(dir) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} escapes module {}", location.path, location.module),
            ));
        }
        fs::read(canonical)
    }
}

fn load_manifest(path: &Path) -> Result<ModuleManifest> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let manifest: ModuleManifest =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    if manifest.name.trim().is_empty() {
        bail!("{} declares an empty module name", path.display());
    }
    Ok(manifest)
}

fn collect_from_dir(root: &Path, acc: &mut Vec<PathBuf>) -> io::Result<()> {
    if !root.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_from_dir(&path, acc)?;
        } else if path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(DEFINITION_EXTENSION))
        {
            acc.push(path);
        }
    }
    Ok(())
}

fn relative_resource_path(module_dir: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(module_dir).ok()?;
    let segments: Vec<&str> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(format!("/{}", segments.join("/")))
}
