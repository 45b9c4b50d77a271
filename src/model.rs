//! Deserializable definition records, one shape per `DefinitionKind`.
//!
//! Field names follow the camelCase layout of the packaged JSON. Only the
//! structure is checked here; whether a definition makes sense is up to the
//! service that registers it. Unknown fields are ignored.

use crate::kind::DefinitionKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

fn enabled_default() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Identity and labelling shared by most definitions.
pub struct Metadata {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub system_tags: Vec<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Condition tree node: a condition type id plus its parameter values.
///
/// Nested conditions live inside `parameter_values` (e.g. `subConditions`).
pub struct Condition {
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub parameter_values: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Declared parameter of a condition or action type.
pub struct Parameter {
    pub id: String,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub multivalued: bool,
    #[serde(default)]
    pub default_value: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionType {
    pub metadata: Metadata,
    #[serde(default)]
    pub condition_evaluator: Option<String>,
    #[serde(default)]
    pub query_builder: Option<String>,
    #[serde(default)]
    pub parent_condition: Option<Condition>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionType {
    pub metadata: Metadata,
    pub action_executor: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub metadata: Metadata,
    #[serde(default)]
    pub start_event: Option<Condition>,
    #[serde(default)]
    pub target_event: Option<Condition>,
    #[serde(default)]
    pub campaign_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub metadata: Metadata,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub entry_condition: Option<Condition>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub primary_goal: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Synthetic profile used to preview segments and personalization.
pub struct Persona {
    pub item_id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub segments: Vec<String>,
    #[serde(default)]
    pub scores: BTreeMap<String, i64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaSession {
    pub item_id: String,
    #[serde(default)]
    pub time_stamp: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaWithSessions {
    pub persona: Persona,
    #[serde(default)]
    pub sessions: Vec<PersonaSession>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyType {
    pub metadata: Metadata,
    /// Item type the property applies to; derived from the resource path when
    /// the property is grouped under a target directory.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub value_type_id: String,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub rank: Option<f64>,
    #[serde(default)]
    pub merge_strategy: Option<String>,
    #[serde(default)]
    pub multivalued: bool,
    #[serde(default)]
    pub protected: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Action invocation inside a rule.
pub struct Action {
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub parameter_values: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub metadata: Metadata,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub link_events: Vec<String>,
    #[serde(default)]
    pub raise_event_only_once: bool,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub metadata: Metadata,
    pub condition: Condition,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringElement {
    pub condition: Condition,
    pub value: i32,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoring {
    pub metadata: Metadata,
    #[serde(default)]
    pub elements: Vec<ScoringElement>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Change applied to an already registered item.
pub struct Patch {
    pub item_id: String,
    pub patched_item_id: String,
    pub patched_item_type: String,
    pub operation: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub last_application: Option<String>,
}

/// A parsed definition, tagged by kind.
#[derive(Clone, Debug, PartialEq)]
pub enum DefinitionRecord {
    Condition(ConditionType),
    Action(ActionType),
    Goal(Goal),
    Campaign(Campaign),
    Persona(PersonaWithSessions),
    Property(PropertyType),
    Rule(Rule),
    Segment(Segment),
    Scoring(Scoring),
    Patch(Patch),
}

impl DefinitionRecord {
    /// Parse `bytes` into the shape bound to `kind`.
    pub fn from_slice(kind: DefinitionKind, bytes: &[u8]) -> serde_json::Result<Self> {
        Ok(match kind {
            DefinitionKind::Condition => Self::Condition(serde_json::from_slice(bytes)?),
            DefinitionKind::Action => Self::Action(serde_json::from_slice(bytes)?),
            DefinitionKind::Goal => Self::Goal(serde_json::from_slice(bytes)?),
            DefinitionKind::Campaign => Self::Campaign(serde_json::from_slice(bytes)?),
            DefinitionKind::Persona => Self::Persona(serde_json::from_slice(bytes)?),
            DefinitionKind::Property => Self::Property(serde_json::from_slice(bytes)?),
            DefinitionKind::Rule => Self::Rule(serde_json::from_slice(bytes)?),
            DefinitionKind::Segment => Self::Segment(serde_json::from_slice(bytes)?),
            DefinitionKind::Scoring => Self::Scoring(serde_json::from_slice(bytes)?),
            DefinitionKind::Patch => Self::Patch(serde_json::from_slice(bytes)?),
        })
    }

    pub fn kind(&self) -> DefinitionKind {
        match self {
            Self::Condition(_) => DefinitionKind::Condition,
            Self::Action(_) => DefinitionKind::Action,
            Self::Goal(_) => DefinitionKind::Goal,
            Self::Campaign(_) => DefinitionKind::Campaign,
            Self::Persona(_) => DefinitionKind::Persona,
            Self::Property(_) => DefinitionKind::Property,
            Self::Rule(_) => DefinitionKind::Rule,
            Self::Segment(_) => DefinitionKind::Segment,
            Self::Scoring(_) => DefinitionKind::Scoring,
            Self::Patch(_) => DefinitionKind::Patch,
        }
    }

    /// Identifier of the defined item, used in logs.
    pub fn item_id(&self) -> &str {
        match self {
            Self::Condition(r) => &r.metadata.id,
            Self::Action(r) => &r.metadata.id,
            Self::Goal(r) => &r.metadata.id,
            Self::Campaign(r) => &r.metadata.id,
            Self::Persona(r) => &r.persona.item_id,
            Self::Property(r) => &r.metadata.id,
            Self::Rule(r) => &r.metadata.id,
            Self::Segment(r) => &r.metadata.id,
            Self::Scoring(r) => &r.metadata.id,
            Self::Patch(r) => &r.item_id,
        }
    }
}
