//! Dispatch table from definition kind to registration service.
//!
//! Each downstream service is a trait so the binary, tests, and embedders can
//! plug in their own sinks. `dispatch` matches on the record itself, so a new
//! `DefinitionRecord` variant does not compile until it has a route here and
//! an entry in `registrations`.

use crate::error::DeployError;
use crate::kind::DefinitionKind;
use crate::model::{
    ActionType, Campaign, ConditionType, DefinitionRecord, Goal, Patch, PersonaWithSessions,
    PropertyType, Rule, Scoring, Segment,
};
use crate::registry::ResourceLocation;
use anyhow::Result;
use tracing::info;

pub trait DefinitionsService {
    fn set_condition_type(&self, condition_type: ConditionType) -> Result<()>;
    fn set_action_type(&self, action_type: ActionType) -> Result<()>;
}

pub trait GoalsService {
    fn set_goal(&self, goal: Goal) -> Result<()>;
    fn set_campaign(&self, campaign: Campaign) -> Result<()>;
}

pub trait ProfileService {
    fn save_persona_with_sessions(&self, persona: PersonaWithSessions) -> Result<()>;
    /// Record the target a property file was packaged under.
    fn set_property_type_target(
        &self,
        location: &ResourceLocation,
        property_type: &mut PropertyType,
    ) -> Result<()>;
    fn set_property_type(&self, property_type: PropertyType) -> Result<()>;
}

pub trait RulesService {
    fn set_rule(&self, rule: Rule) -> Result<()>;
}

pub trait SegmentService {
    fn set_segment_definition(&self, segment: Segment) -> Result<()>;
    fn set_scoring_definition(&self, scoring: Scoring) -> Result<()>;
}

pub trait PatchService {
    fn patch(&self, patch: Patch) -> Result<()>;
}

/// The downstream services a dispatch can reach.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub definitions: &'a dyn DefinitionsService,
    pub goals: &'a dyn GoalsService,
    pub profiles: &'a dyn ProfileService,
    pub rules: &'a dyn RulesService,
    pub segments: &'a dyn SegmentService,
    pub patches: &'a dyn PatchService,
}

impl<'a> Services<'a> {
    /// Route every kind to one object implementing all services.
    pub fn uniform<T>(sink: &'a T) -> Self
    where
        T: DefinitionsService
            + GoalsService
            + ProfileService
            + RulesService
            + SegmentService
            + PatchService,
    {
        Self {
            definitions: sink,
            goals: sink,
            profiles: sink,
            rules: sink,
            segments: sink,
            patches: sink,
        }
    }
}

/// One registration call made for a kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Registration {
    pub service: &'static str,
    pub operation: &'static str,
}

/// Registration calls `dispatch` issues for `kind`, in call order.
///
/// Describes the routes in `dispatch` for callers that list or audit them;
/// keep both in step when a route changes.
pub fn registrations(kind: DefinitionKind) -> &'static [Registration] {
    match kind {
        DefinitionKind::Condition => &[Registration {
            service: "definitions",
            operation: "set_condition_type",
        }],
        DefinitionKind::Action => &[Registration {
            service: "definitions",
            operation: "set_action_type",
        }],
        DefinitionKind::Goal => &[Registration {
            service: "goals",
            operation: "set_goal",
        }],
        DefinitionKind::Campaign => &[Registration {
            service: "goals",
            operation: "set_campaign",
        }],
        DefinitionKind::Persona => &[Registration {
            service: "profiles",
            operation: "save_persona_with_sessions",
        }],
        DefinitionKind::Property => &[
            Registration {
                service: "profiles",
                operation: "set_property_type_target",
            },
            Registration {
                service: "profiles",
                operation: "set_property_type",
            },
        ],
        DefinitionKind::Rule => &[Registration {
            service: "rules",
            operation: "set_rule",
        }],
        DefinitionKind::Segment => &[Registration {
            service: "segments",
            operation: "set_segment_definition",
        }],
        DefinitionKind::Scoring => &[Registration {
            service: "segments",
            operation: "set_scoring_definition",
        }],
        DefinitionKind::Patch => &[Registration {
            service: "patches",
            operation: "patch",
        }],
    }
}

/// Hand `record` to the service registered for its kind.
///
/// The service takes ownership of the record. A rejection is reported as a
/// per-resource `Registration` error.
pub fn dispatch(
    services: &Services<'_>,
    location: &ResourceLocation,
    record: DefinitionRecord,
) -> Result<(), DeployError> {
    let kind = record.kind();
    let item = record.item_id().to_string();
    let outcome = match record {
        DefinitionRecord::Condition(r) => services.definitions.set_condition_type(r),
        DefinitionRecord::Action(r) => services.definitions.set_action_type(r),
        DefinitionRecord::Goal(r) => services.goals.set_goal(r),
        DefinitionRecord::Campaign(r) => services.goals.set_campaign(r),
        DefinitionRecord::Persona(r) => services.profiles.save_persona_with_sessions(r),
        DefinitionRecord::Property(mut r) => services
            .profiles
            .set_property_type_target(location, &mut r)
            .and_then(|()| services.profiles.set_property_type(r)),
        DefinitionRecord::Rule(r) => services.rules.set_rule(r),
        DefinitionRecord::Segment(r) => services.segments.set_segment_definition(r),
        DefinitionRecord::Scoring(r) => services.segments.set_scoring_definition(r),
        DefinitionRecord::Patch(r) => services.patches.patch(r),
    };
    outcome.map_err(|source| DeployError::Registration {
        location: location.clone(),
        source,
    })?;
    info!(%location, %kind, item = %item, "registered definition");
    Ok(())
}
