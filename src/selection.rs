//! Interactive narrowing of module, kind, and file.
//!
//! Resolution runs three steps in order, each taking the `SelectionState`
//! produced by the previous one. Axes pre-supplied on the command line never
//! prompt. The module and file axes offer a leading `* (All)` entry; the kind
//! axis always needs a concrete answer.

use crate::error::{DeployError, EmptyAxis};
use crate::kind::DefinitionKind;
use crate::paths::{normalize_file_name, path_for};
use crate::prompt::{Prompter, RetryPolicy, ask_choice};
use crate::registry::{ModuleId, ModuleInfo, ModuleScope, ResourceIndex, ResourceLocation};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Menu label for the wildcard entry.
pub const ALL_LABEL: &str = "* (All)";

/// Invocation parameters; every axis is optional.
#[derive(Clone, Debug, Default)]
pub struct SelectionRequest {
    pub module_id: Option<ModuleId>,
    pub kind: Option<String>,
    pub file_name: Option<String>,
}

/// Narrowing state handed from one axis to the next.
#[derive(Clone, Debug)]
pub struct SelectionState {
    /// `None` until the module axis is resolved.
    pub scope: Option<ModuleScope>,
    /// Candidate modules behind `scope`.
    pub modules: Vec<ModuleInfo>,
    pub all_modules: bool,
    pub kind: Option<DefinitionKind>,
    /// Normalized file-name filter, when one was supplied.
    pub file_filter: Option<String>,
    /// A supplied file name starting with `*` selects every candidate.
    pub all_files: bool,
}

impl SelectionState {
    /// Start a selection, rejecting an unknown kind before anything is queried.
    pub fn from_request(request: &SelectionRequest) -> Result<Self, DeployError> {
        let kind = request
            .kind
            .as_deref()
            .map(str::parse::<DefinitionKind>)
            .transpose()?;
        let all_files = request
            .file_name
            .as_deref()
            .is_some_and(|name| name.starts_with('*'));
        let file_filter = match request.file_name.as_deref() {
            Some(name) if !all_files => Some(normalize_file_name(name)),
            _ => None,
        };
        Ok(Self {
            scope: request.module_id.map(ModuleScope::One),
            modules: Vec::new(),
            all_modules: false,
            kind,
            file_filter,
            all_files,
        })
    }
}

/// Final outcome: the resources to deploy, all of one kind.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub kind: DefinitionKind,
    pub locations: Vec<ResourceLocation>,
    /// True when the file axis resolved to every candidate.
    pub all_files: bool,
}

/// Drives the three selection axes against a resource index and a prompter.
pub struct SelectionResolver<'a, 'p> {
    index: &'a ResourceIndex<'a>,
    prompter: &'p mut dyn Prompter,
    policy: RetryPolicy,
}

impl<'a, 'p> SelectionResolver<'a, 'p> {
    pub fn new(
        index: &'a ResourceIndex<'a>,
        prompter: &'p mut dyn Prompter,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            index,
            prompter,
            policy,
        }
    }

    /// Resolve every axis of `request`.
    pub fn resolve(&mut self, request: &SelectionRequest) -> Result<Resolution, DeployError> {
        let state = SelectionState::from_request(request)?;
        let state = self.resolve_module(state)?;
        let state = self.resolve_kind(state)?;
        self.resolve_files(state)
    }

    /// Fix the module scope, prompting when no module id was supplied.
    pub fn resolve_module(&mut self, mut state: SelectionState) -> Result<SelectionState, DeployError> {
        if let Some(ModuleScope::One(id)) = state.scope {
            let module = self.index.resolve_module(id)?;
            debug!(module = %module.name, id = %module.id, "module supplied");
            state.modules = vec![module];
            return Ok(state);
        }

        let modules = self.index.modules_with_known_kinds();
        if modules.is_empty() {
            return Err(DeployError::NoDefinitionsFound(EmptyAxis::Modules));
        }
        let mut labels = vec![ALL_LABEL.to_string()];
        labels.extend(modules.iter().map(|m| format!("{} [{}]", m.name, m.id)));
        let choice = ask_choice(&mut *self.prompter, "Which module ?", &labels, self.policy)?;
        if choice == 0 {
            info!(modules = modules.len(), "all modules selected");
            state.scope = Some(ModuleScope::All);
            state.all_modules = true;
            state.modules = modules;
        } else {
            // Ordinal 1 is the wildcard, so module N sits at answer N + 1.
            let module = modules[choice - 1].clone();
            info!(module = %module.name, id = %module.id, "module selected");
            state.scope = Some(ModuleScope::One(module.id));
            state.modules = vec![module];
        }
        Ok(state)
    }

    /// Fix the definition kind, prompting over the kinds present in scope.
    pub fn resolve_kind(&mut self, mut state: SelectionState) -> Result<SelectionState, DeployError> {
        if state.kind.is_some() {
            return Ok(state);
        }
        let scope = self.scope_of(&state);
        let mut available = Vec::new();
        for kind in DefinitionKind::ALL {
            if self.index.has_entries(&scope, &path_for(kind))? {
                available.push(kind);
            }
        }
        if available.is_empty() {
            return Err(DeployError::NoDefinitionsFound(EmptyAxis::Kinds {
                scope: self.describe(&state),
            }));
        }
        let labels: Vec<&str> = available.iter().map(DefinitionKind::as_str).collect();
        let choice = ask_choice(
            &mut *self.prompter,
            "Which kind of definition do you want to load?",
            &labels,
            self.policy,
        )?;
        info!(kind = %available[choice], "kind selected");
        state.kind = Some(available[choice]);
        Ok(state)
    }

    /// Turn the resolved scope and kind into concrete resources.
    pub fn resolve_files(&mut self, state: SelectionState) -> Result<Resolution, DeployError> {
        let Some(kind) = state.kind else {
            let state = self.resolve_kind(state)?;
            return self.resolve_files(state);
        };
        let scope = self.scope_of(&state);
        let path = path_for(kind);
        let candidates = self.index.find(&scope, &path)?;
        if candidates.is_empty() {
            return Err(DeployError::NoDefinitionsFound(EmptyAxis::Files {
                scope: self.describe(&state),
                path,
            }));
        }

        if state.all_files {
            info!(%kind, files = candidates.len(), "all files requested");
            return Ok(Resolution {
                kind,
                locations: candidates,
                all_files: true,
            });
        }

        if let Some(filter) = state.file_filter.as_deref() {
            let location = candidates
                .into_iter()
                .find(|location| location.path.ends_with(filter))
                .ok_or_else(|| DeployError::FileNotFound(filter.to_string()))?;
            return Ok(Resolution {
                kind,
                locations: vec![location],
                all_files: false,
            });
        }

        let menu = file_menu(&candidates);
        let mut labels = vec![ALL_LABEL.to_string()];
        labels.extend(menu.iter().map(|(label, _)| label.clone()));
        let choice = ask_choice(
            &mut *self.prompter,
            "Which file do you want to load ?",
            &labels,
            self.policy,
        )?;
        if choice == 0 {
            info!(%kind, files = candidates.len(), "all files selected");
            return Ok(Resolution {
                kind,
                locations: candidates,
                all_files: true,
            });
        }
        let location = candidates[menu[choice - 1].1].clone();
        info!(%kind, %location, "file selected");
        Ok(Resolution {
            kind,
            locations: vec![location],
            all_files: false,
        })
    }

    fn scope_of(&self, state: &SelectionState) -> ModuleScope {
        state.scope.clone().unwrap_or(ModuleScope::All)
    }

    fn describe(&self, state: &SelectionState) -> String {
        if state.modules.is_empty() || state.all_modules {
            return self.index.describe_scope(&self.scope_of(state));
        }
        state
            .modules
            .iter()
            .map(|m| format!("{} ({})", m.name, m.id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Sorted file labels paired with their index in `candidates`.
///
/// Labels are bare file names; a name shared by several candidates is shown
/// with its module and full path instead so the entries stay distinguishable.
fn file_menu(candidates: &[ResourceLocation]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for location in candidates {
        *counts.entry(location.file_name()).or_default() += 1;
    }
    let mut menu: Vec<(String, usize)> = candidates
        .iter()
        .enumerate()
        .map(|(idx, location)| {
            let label = if counts[location.file_name()] > 1 {
                location.to_string()
            } else {
                location.file_name().to_string()
            };
            (label, idx)
        })
        .collect();
    menu.sort();
    menu
}
