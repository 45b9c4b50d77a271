#![allow(dead_code)]

use anyhow::{Result, bail};
use defdeploy::model::{
    ActionType, Campaign, ConditionType, Goal, Patch, PersonaWithSessions, PropertyType, Rule,
    Scoring, Segment,
};
use defdeploy::paths::property_target;
use defdeploy::{
    DefinitionsService, GoalsService, ModuleId, ModuleInfo, PatchService, ProfileService,
    Prompter, QueryableResourceIndex, ResourceLocation, RulesService, SegmentService,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

/// In-memory module registry that records every query it answers.
#[derive(Default)]
pub struct MemoryIndex {
    modules: Vec<ModuleInfo>,
    files: Vec<(ModuleId, String, Vec<u8>)>,
    pub queries: RefCell<Vec<String>>,
    pub reads: RefCell<Vec<String>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, id: u64, name: &str) -> Self {
        self.modules.push(ModuleInfo {
            id: ModuleId(id),
            name: name.to_string(),
        });
        self
    }

    pub fn with_file(mut self, module: u64, path: &str, contents: &str) -> Self {
        self.files
            .push((ModuleId(module), path.to_string(), contents.as_bytes().to_vec()));
        self
    }

    /// Prefix queries other than the bare definitions-root scan.
    pub fn kind_queries(&self) -> usize {
        self.queries
            .borrow()
            .iter()
            .filter(|prefix| prefix.as_str() != defdeploy::DEFINITIONS_ROOT)
            .count()
    }

    pub fn clear_log(&self) {
        self.queries.borrow_mut().clear();
        self.reads.borrow_mut().clear();
    }
}

impl QueryableResourceIndex for MemoryIndex {
    fn modules(&self) -> Vec<ModuleInfo> {
        self.modules.clone()
    }

    fn module(&self, id: ModuleId) -> Option<ModuleInfo> {
        self.modules.iter().find(|m| m.id == id).cloned()
    }

    fn find_entries(&self, module: ModuleId, prefix: &str) -> Vec<ResourceLocation> {
        self.queries.borrow_mut().push(prefix.to_string());
        let Some(info) = self.module(module) else {
            return Vec::new();
        };
        let dir = format!("/{}/", prefix.trim_matches('/'));
        self.files
            .iter()
            .filter(|(owner, path, _)| {
                *owner == module && path.starts_with(&dir) && path.ends_with(".json")
            })
            .map(|(_, path, _)| ResourceLocation::new(module, info.name.clone(), path.clone()))
            .collect()
    }

    fn read(&self, location: &ResourceLocation) -> io::Result<Vec<u8>> {
        self.reads.borrow_mut().push(location.path.clone());
        self.files
            .iter()
            .find(|(owner, path, _)| *owner == location.module && *path == location.path)
            .map(|(_, _, bytes)| bytes.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, location.path.clone()))
    }
}

/// Prompter replaying canned answers; runs dry once they are used up.
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub shown: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            shown: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, message: &str) -> io::Result<Option<String>> {
        self.shown.push(message.to_string());
        Ok(self.answers.pop_front())
    }
}

/// Downstream services that remember each call in order.
#[derive(Default)]
pub struct RecordingServices {
    pub calls: RefCell<Vec<(&'static str, String)>>,
    reject: Option<String>,
    targets: RefCell<Vec<Option<String>>>,
}

impl RecordingServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject registration of the item with this id.
    pub fn rejecting(id: &str) -> Self {
        Self {
            reject: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|(op, _)| *op).collect()
    }

    pub fn items(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(_, id)| id.clone()).collect()
    }

    pub fn targets(&self) -> Vec<Option<String>> {
        self.targets.borrow().clone()
    }

    fn record(&self, operation: &'static str, id: &str) -> Result<()> {
        if self.reject.as_deref() == Some(id) {
            bail!("{operation} refused {id}");
        }
        self.calls.borrow_mut().push((operation, id.to_string()));
        Ok(())
    }
}

impl DefinitionsService for RecordingServices {
    fn set_condition_type(&self, r: ConditionType) -> Result<()> {
        self.record("set_condition_type", &r.metadata.id)
    }

    fn set_action_type(&self, r: ActionType) -> Result<()> {
        self.record("set_action_type", &r.metadata.id)
    }
}

impl GoalsService for RecordingServices {
    fn set_goal(&self, r: Goal) -> Result<()> {
        self.record("set_goal", &r.metadata.id)
    }

    fn set_campaign(&self, r: Campaign) -> Result<()> {
        self.record("set_campaign", &r.metadata.id)
    }
}

impl ProfileService for RecordingServices {
    fn save_persona_with_sessions(&self, r: PersonaWithSessions) -> Result<()> {
        self.record("save_persona_with_sessions", &r.persona.item_id)
    }

    fn set_property_type_target(
        &self,
        location: &ResourceLocation,
        r: &mut PropertyType,
    ) -> Result<()> {
        if let Some(target) = property_target(&location.path) {
            r.target = Some(target);
        }
        self.record("set_property_type_target", &r.metadata.id)
    }

    fn set_property_type(&self, r: PropertyType) -> Result<()> {
        self.targets.borrow_mut().push(r.target.clone());
        self.record("set_property_type", &r.metadata.id)
    }
}

impl RulesService for RecordingServices {
    fn set_rule(&self, r: Rule) -> Result<()> {
        self.record("set_rule", &r.metadata.id)
    }
}

impl SegmentService for RecordingServices {
    fn set_segment_definition(&self, r: Segment) -> Result<()> {
        self.record("set_segment_definition", &r.metadata.id)
    }

    fn set_scoring_definition(&self, r: Scoring) -> Result<()> {
        self.record("set_scoring_definition", &r.metadata.id)
    }
}

impl PatchService for RecordingServices {
    fn patch(&self, r: Patch) -> Result<()> {
        self.record("patch", &r.item_id)
    }
}

pub fn rule_json(id: &str) -> String {
    format!(r#"{{"metadata": {{"id": "{id}"}}, "actions": []}}"#)
}
