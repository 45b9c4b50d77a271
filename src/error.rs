use crate::registry::{ModuleId, ResourceLocation};
use std::fmt;
use thiserror::Error;

/// Selection axis that came up empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EmptyAxis {
    /// No loaded module exposes any definition resource.
    Modules,
    /// The module scope exposes no resource under any kind's path.
    Kinds { scope: String },
    /// The module scope exposes no resource under the chosen kind's path.
    Files { scope: String, path: String },
}

/// Failures surfaced while resolving or deploying definitions.
///
/// Variants for which `is_fatal` returns true end the invocation before any
/// registration happens. The remaining ones are scoped to a single resource
/// and never abort a batch.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Couldn't find a module with id: {0}")]
    ModuleNotFound(ModuleId),

    #[error("Invalid type '{kind}', allowed values: [{allowed}]")]
    InvalidKind { kind: String, allowed: String },

    #[error("{0}")]
    NoDefinitionsFound(EmptyAxis),

    #[error("Couldn't find file {0}")]
    FileNotFound(String),

    #[error("Prompt input closed before a valid answer was given")]
    PromptClosed,

    #[error("No valid answer after {0} attempt(s)")]
    PromptAttemptsExhausted(u32),

    #[error("Console I/O failed")]
    Console(#[source] std::io::Error),

    #[error("Unable to read definition {location}")]
    Read {
        location: ResourceLocation,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse definition {location}")]
    Deserialization {
        location: ResourceLocation,
        #[source]
        source: serde_json::Error,
    },

    #[error("Registration rejected definition {location}")]
    Registration {
        location: ResourceLocation,
        #[source]
        source: anyhow::Error,
    },
}

impl DeployError {
    /// Whether the error ends the whole invocation.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DeployError::Read { .. }
                | DeployError::Deserialization { .. }
                | DeployError::Registration { .. }
        )
    }

    /// Location of the resource a recoverable error refers to.
    pub fn location(&self) -> Option<&ResourceLocation> {
        match self {
            DeployError::Read { location, .. }
            | DeployError::Deserialization { location, .. }
            | DeployError::Registration { location, .. } => Some(location),
            _ => None,
        }
    }
}

impl fmt::Display for EmptyAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyAxis::Modules => f.write_str("Couldn't find any module exposing definitions"),
            EmptyAxis::Kinds { scope } => write!(f, "Couldn't find definitions in module(s): {scope}"),
            EmptyAxis::Files { scope, path } => write!(
                f,
                "Couldn't find definitions in module(s): {scope} and definition path: {path}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_differ_per_axis() {
        let kinds = DeployError::NoDefinitionsFound(EmptyAxis::Kinds {
            scope: "core".into(),
        });
        let files = DeployError::NoDefinitionsFound(EmptyAxis::Files {
            scope: "core".into(),
            path: "META-INF/cxs/rules".into(),
        });
        assert_ne!(kinds.to_string(), files.to_string());
        assert!(files.to_string().ends_with("META-INF/cxs/rules"));
    }

    #[test]
    fn per_resource_errors_are_not_fatal() {
        let location = ResourceLocation::new(ModuleId(3), "core", "/META-INF/cxs/rules/a.json");
        let err = DeployError::Read {
            location: location.clone(),
            source: std::io::Error::other("gone"),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.location(), Some(&location));
        assert!(DeployError::ModuleNotFound(ModuleId(9)).is_fatal());
        assert!(DeployError::FileNotFound("/x.json".into()).is_fatal());
    }
}
