//! Module registry wiring.
//!
//! `QueryableResourceIndex` is the capability the resolver consumes: it lists
//! loaded modules, looks one up by id, finds definition entries under a path
//! prefix, and reads raw resource bytes. `ResourceIndex` layers the scoped
//! queries on top of it. `DirectoryRegistry` backs the capability with a
//! modules directory on disk.

pub mod directory;

pub use directory::{DirectoryRegistry, MODULE_MANIFEST};

use crate::error::DeployError;
use crate::kind::DefinitionKind;
use crate::paths::{DEFINITIONS_ROOT, file_name_of, path_for};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use tracing::debug;

/// Numeric identifier of a loaded module.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a loaded module.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub id: ModuleId,
    pub name: String,
}

/// One packaged definition resource.
///
/// `path` is module-relative, `/`-separated, and starts with `/`
/// (`/META-INF/cxs/rules/a.json`).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResourceLocation {
    pub module: ModuleId,
    pub module_name: String,
    pub path: String,
}

impl ResourceLocation {
    pub fn new(module: ModuleId, module_name: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            module,
            module_name: module_name.into(),
            path,
        }
    }

    pub fn file_name(&self) -> &str {
        file_name_of(&self.path)
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module_name, self.path)
    }
}

/// Read-only view over whatever owns the loaded modules.
pub trait QueryableResourceIndex {
    /// Every loaded module, in a stable order.
    fn modules(&self) -> Vec<ModuleInfo>;

    /// Resolve a module id; `None` when no such module is loaded.
    fn module(&self, id: ModuleId) -> Option<ModuleInfo>;

    /// Definition entries of `module` under `prefix`, searched recursively.
    ///
    /// Only files carrying the reserved definition extension are returned.
    fn find_entries(&self, module: ModuleId, prefix: &str) -> Vec<ResourceLocation>;

    /// Raw bytes of a resource.
    fn read(&self, location: &ResourceLocation) -> io::Result<Vec<u8>>;
}

/// Which modules a query covers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ModuleScope {
    /// Every loaded module exposing at least one definition.
    All,
    One(ModuleId),
}

/// Scoped queries over a `QueryableResourceIndex`.
pub struct ResourceIndex<'a> {
    inner: &'a dyn QueryableResourceIndex,
}

impl<'a> ResourceIndex<'a> {
    pub fn new(inner: &'a dyn QueryableResourceIndex) -> Self {
        Self { inner }
    }

    /// Validate that `id` names a loaded module.
    pub fn resolve_module(&self, id: ModuleId) -> Result<ModuleInfo, DeployError> {
        self.inner.module(id).ok_or(DeployError::ModuleNotFound(id))
    }

    /// Modules exposing at least one resource under the definitions root.
    pub fn definition_modules(&self) -> Vec<ModuleInfo> {
        self.inner
            .modules()
            .into_iter()
            .filter(|module| !self.inner.find_entries(module.id, DEFINITIONS_ROOT).is_empty())
            .collect()
    }

    /// Modules exposing at least one resource under some kind's path.
    pub fn modules_with_known_kinds(&self) -> Vec<ModuleInfo> {
        self.definition_modules()
            .into_iter()
            .filter(|module| {
                DefinitionKind::ALL.into_iter().any(|kind| {
                    !self.inner.find_entries(module.id, &path_for(kind)).is_empty()
                })
            })
            .collect()
    }

    /// Resource locations under `prefix` across `scope`.
    ///
    /// Order follows module order, then the registry's per-module order. An
    /// empty result means nothing matched; unknown module ids surface as
    /// `ModuleNotFound`.
    pub fn find(
        &self,
        scope: &ModuleScope,
        prefix: &str,
    ) -> Result<Vec<ResourceLocation>, DeployError> {
        let locations = match scope {
            ModuleScope::All => self
                .definition_modules()
                .into_iter()
                .flat_map(|module| self.inner.find_entries(module.id, prefix))
                .collect(),
            ModuleScope::One(id) => {
                let module = self.resolve_module(*id)?;
                self.inner.find_entries(module.id, prefix)
            }
        };
        debug!(?scope, prefix, matches = locations.len(), "resource query");
        Ok(locations)
    }

    /// Whether `scope` exposes at least one resource under `prefix`.
    pub fn has_entries(&self, scope: &ModuleScope, prefix: &str) -> Result<bool, DeployError> {
        Ok(!self.find(scope, prefix)?.is_empty())
    }

    /// Raw bytes of a resource.
    pub fn read(&self, location: &ResourceLocation) -> io::Result<Vec<u8>> {
        self.inner.read(location)
    }

    /// Human label for a scope, used in messages.
    pub fn describe_scope(&self, scope: &ModuleScope) -> String {
        match scope {
            ModuleScope::All => "*".to_string(),
            ModuleScope::One(id) => match self.inner.module(*id) {
                Some(module) => format!("{} ({})", module.name, module.id),
                None => id.to_string(),
            },
        }
    }
}
