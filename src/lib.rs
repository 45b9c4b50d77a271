//! Shared library for the definition deployer.
//!
//! The crate resolves which packaged definition resources an operator wants
//! to deploy (module, kind, file), parses each one into its typed record, and
//! routes the record to the service that registers that kind. The
//! `deploy-definition` binary wires these pieces to stdin/stdout, a modules
//! directory, and an NDJSON registration journal.

pub mod config;
pub mod deploy;
pub mod dispatch;
pub mod error;
pub mod journal;
pub mod kind;
pub mod loader;
pub mod logging;
pub mod model;
pub mod paths;
pub mod prompt;
pub mod registry;
pub mod selection;

pub use config::{Config, ConfigOverrides};
pub use deploy::{DeployReport, deploy, run_invocation};
pub use dispatch::{
    DefinitionsService, GoalsService, PatchService, ProfileService, Registration, RulesService,
    SegmentService, Services, dispatch, registrations,
};
pub use error::{DeployError, EmptyAxis};
pub use journal::JournalServices;
pub use kind::DefinitionKind;
pub use loader::load;
pub use model::DefinitionRecord;
pub use paths::{DEFINITION_EXTENSION, DEFINITIONS_ROOT, normalize_file_name, path_for};
pub use prompt::{ConsolePrompt, Prompter, RetryPolicy, ask_choice, numbered_menu};
pub use registry::{
    DirectoryRegistry, ModuleId, ModuleInfo, ModuleScope, QueryableResourceIndex, ResourceIndex,
    ResourceLocation,
};
pub use selection::{
    ALL_LABEL, Resolution, SelectionRequest, SelectionResolver, SelectionState,
};
