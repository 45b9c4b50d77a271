//! NDJSON registration journal.
//!
//! `JournalServices` implements every downstream service trait by appending
//! one JSON object per registration call to a writer. The binary points it at
//! a journal file that the owning services replay.

use crate::dispatch::{
    DefinitionsService, GoalsService, PatchService, ProfileService, RulesService, SegmentService,
};
use crate::model::{
    ActionType, Campaign, ConditionType, Goal, Patch, PersonaWithSessions, PropertyType, Rule,
    Scoring, Segment,
};
use crate::paths::property_target;
use crate::registry::ResourceLocation;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::io::Write;

#[derive(Serialize)]
struct JournalEntry<'a, T: Serialize> {
    service: &'static str,
    operation: &'static str,
    item_id: &'a str,
    record: &'a T,
}

/// Registration sink writing newline-delimited JSON.
pub struct JournalServices<W: Write> {
    writer: RefCell<W>,
    entries: Cell<usize>,
}

impl<W: Write> JournalServices<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: RefCell::new(writer),
            entries: Cell::new(0),
        }
    }

    /// Number of entries appended so far.
    pub fn entries(&self) -> usize {
        self.entries.get()
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn append<T: Serialize>(
        &self,
        service: &'static str,
        operation: &'static str,
        item_id: &str,
        record: &T,
    ) -> Result<()> {
        let entry = JournalEntry {
            service,
            operation,
            item_id,
            record,
        };
        let mut writer = self.writer.borrow_mut();
        serde_json::to_writer(&mut *writer, &entry)
            .with_context(|| format!("writing journal entry for {operation} {item_id}"))?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        self.entries.set(self.entries.get() + 1);
        Ok(())
    }
}

impl<W: Write> DefinitionsService for JournalServices<W> {
    fn set_condition_type(&self, condition_type: ConditionType) -> Result<()> {
        let id = &condition_type.metadata.id;
        self.append("definitions", "set_condition_type", id, &condition_type)
    }

    fn set_action_type(&self, action_type: ActionType) -> Result<()> {
        let id = &action_type.metadata.id;
        self.append("definitions", "set_action_type", id, &action_type)
    }
}

impl<W: Write> GoalsService for JournalServices<W> {
    fn set_goal(&self, goal: Goal) -> Result<()> {
        self.append("goals", "set_goal", &goal.metadata.id, &goal)
    }

    fn set_campaign(&self, campaign: Campaign) -> Result<()> {
        self.append("goals", "set_campaign", &campaign.metadata.id, &campaign)
    }
}

impl<W: Write> ProfileService for JournalServices<W> {
    fn save_persona_with_sessions(&self, persona: PersonaWithSessions) -> Result<()> {
        let id = &persona.persona.item_id;
        self.append("profiles", "save_persona_with_sessions", id, &persona)
    }

    fn set_property_type_target(
        &self,
        location: &ResourceLocation,
        property_type: &mut PropertyType,
    ) -> Result<()> {
        if let Some(target) = property_target(&location.path) {
            property_type.target = Some(target);
        }
        self.append(
            "profiles",
            "set_property_type_target",
            &property_type.metadata.id,
            &json!({ "target": property_type.target, "source": location }),
        )
    }

    fn set_property_type(&self, property_type: PropertyType) -> Result<()> {
        let id = &property_type.metadata.id;
        self.append("profiles", "set_property_type", id, &property_type)
    }
}

impl<W: Write> RulesService for JournalServices<W> {
    fn set_rule(&self, rule: Rule) -> Result<()> {
        self.append("rules", "set_rule", &rule.metadata.id, &rule)
    }
}

impl<W: Write> SegmentService for JournalServices<W> {
    fn set_segment_definition(&self, segment: Segment) -> Result<()> {
        let id = &segment.metadata.id;
        self.append("segments", "set_segment_definition", id, &segment)
    }

    fn set_scoring_definition(&self, scoring: Scoring) -> Result<()> {
        let id = &scoring.metadata.id;
        self.append("segments", "set_scoring_definition", id, &scoring)
    }
}

impl<W: Write> PatchService for JournalServices<W> {
    fn patch(&self, patch: Patch) -> Result<()> {
        self.append("patches", "patch", &patch.item_id, &patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Services, dispatch};
    use crate::kind::DefinitionKind;
    use crate::model::DefinitionRecord;
    use crate::registry::ModuleId;
    use serde_json::Value;

    fn entries(bytes: Vec<u8>) -> Vec<Value> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn property_dispatch_writes_target_then_type() {
        let journal = JournalServices::new(Vec::<u8>::new());
        let location = ResourceLocation::new(
            ModuleId(2),
            "core",
            "/META-INF/cxs/properties/profiles/basic/firstName.json",
        );
        let record = DefinitionRecord::from_slice(
            DefinitionKind::Property,
            br#"{"metadata": {"id": "firstName"}, "type": "string"}"#,
        )
        .unwrap();
        dispatch(&Services::uniform(&journal), &location, record).unwrap();
        assert_eq!(journal.entries(), 2);

        let lines = entries(journal.into_inner());
        assert_eq!(lines[0]["operation"], "set_property_type_target");
        assert_eq!(lines[0]["record"]["target"], "profiles");
        assert_eq!(lines[1]["operation"], "set_property_type");
        assert_eq!(lines[1]["item_id"], "firstName");
        assert_eq!(lines[1]["record"]["target"], "profiles");
        assert_eq!(lines[1]["record"]["type"], "string");
    }

    #[test]
    fn rule_dispatch_writes_one_entry() {
        let journal = JournalServices::new(Vec::<u8>::new());
        let location = ResourceLocation::new(ModuleId(2), "core", "/META-INF/cxs/rules/a.json");
        let record = DefinitionRecord::from_slice(
            DefinitionKind::Rule,
            br#"{"metadata": {"id": "a"}}"#,
        )
        .unwrap();
        dispatch(&Services::uniform(&journal), &location, record).unwrap();
        let lines = entries(journal.into_inner());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["service"], "rules");
        assert_eq!(lines[0]["operation"], "set_rule");
    }
}
