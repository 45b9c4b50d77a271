use crate::error::DeployError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Category of a registrable definition.
///
/// The set is closed: every variant owns exactly one resource directory (see
/// `paths::path_for`) and exactly one entry in the dispatch table. Unlike the
/// open-ended identifiers elsewhere in the crate there is no `Other` variant;
/// unknown strings are rejected with `DeployError::InvalidKind`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DefinitionKind {
    Condition,
    Action,
    Goal,
    Campaign,
    Persona,
    Property,
    Rule,
    Segment,
    Scoring,
    Patch,
}

impl DefinitionKind {
    /// Every kind in menu order.
    pub const ALL: [DefinitionKind; 10] = [
        DefinitionKind::Condition,
        DefinitionKind::Action,
        DefinitionKind::Goal,
        DefinitionKind::Campaign,
        DefinitionKind::Persona,
        DefinitionKind::Property,
        DefinitionKind::Rule,
        DefinitionKind::Segment,
        DefinitionKind::Scoring,
        DefinitionKind::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Condition => "condition",
            DefinitionKind::Action => "action",
            DefinitionKind::Goal => "goal",
            DefinitionKind::Campaign => "campaign",
            DefinitionKind::Persona => "persona",
            DefinitionKind::Property => "property",
            DefinitionKind::Rule => "rule",
            DefinitionKind::Segment => "segment",
            DefinitionKind::Scoring => "scoring",
            DefinitionKind::Patch => "patch",
        }
    }

    /// Identifiers accepted on the command line, in menu order.
    pub fn identifiers() -> Vec<&'static str> {
        Self::ALL.iter().map(DefinitionKind::as_str).collect()
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefinitionKind {
    type Err = DeployError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DefinitionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| DeployError::InvalidKind {
                kind: value.to_string(),
                allowed: DefinitionKind::identifiers().join(", "),
            })
    }
}

impl Serialize for DefinitionKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DefinitionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
