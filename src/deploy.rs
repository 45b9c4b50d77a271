//! Per-invocation pipeline: resolve a selection, then load and dispatch each
//! resolved resource in index order.
//!
//! Resources are processed one at a time. A read, parse, or registration
//! failure is reported and the loop moves on; resources registered before the
//! failure stay registered.

use crate::dispatch::{Services, dispatch};
use crate::error::DeployError;
use crate::kind::DefinitionKind;
use crate::loader::load;
use crate::prompt::{Prompter, RetryPolicy};
use crate::registry::{ResourceIndex, ResourceLocation};
use crate::selection::{Resolution, SelectionRequest, SelectionResolver};
use std::error::Error;
use std::io::Write;
use tracing::{error, warn};

/// Outcome of deploying a resolved selection.
#[derive(Debug)]
pub struct DeployReport {
    pub kind: DefinitionKind,
    pub registered: Vec<ResourceLocation>,
    pub failures: Vec<DeployError>,
}

impl DeployReport {
    pub fn attempted(&self) -> usize {
        self.registered.len() + self.failures.len()
    }
}

/// Load and dispatch every resource of `resolution`, writing one outcome line
/// per resource to `out`.
pub fn deploy(
    index: &ResourceIndex<'_>,
    services: &Services<'_>,
    resolution: Resolution,
    out: &mut dyn Write,
) -> Result<DeployReport, DeployError> {
    let mut report = DeployReport {
        kind: resolution.kind,
        registered: Vec::new(),
        failures: Vec::new(),
    };
    let batch = resolution.all_files || resolution.locations.len() > 1;

    for location in resolution.locations {
        let outcome = load(index, resolution.kind, &location)
            .and_then(|record| dispatch(services, &location, record));
        match outcome {
            Ok(()) => {
                writeln!(out, "Predefined definition registered : {location}")
                    .map_err(DeployError::Console)?;
                report.registered.push(location);
            }
            Err(err) => {
                warn!(%location, error = %err, "definition skipped");
                writeln!(out, "Error while saving definition {location}")
                    .map_err(DeployError::Console)?;
                writeln!(out, "{}", cause_of(&err)).map_err(DeployError::Console)?;
                report.failures.push(err);
            }
        }
    }

    if batch {
        writeln!(
            out,
            "Registered {} of {} definition(s)",
            report.registered.len(),
            report.attempted()
        )
        .map_err(DeployError::Console)?;
    }
    Ok(report)
}

/// Resolve `request` interactively, then deploy the result.
///
/// Fatal selection errors are returned before any resource is loaded.
pub fn run_invocation(
    index: &ResourceIndex<'_>,
    prompter: &mut dyn Prompter,
    policy: RetryPolicy,
    services: &Services<'_>,
    request: &SelectionRequest,
    out: &mut dyn Write,
) -> Result<DeployReport, DeployError> {
    let resolution = SelectionResolver::new(index, prompter, policy)
        .resolve(request)
        .inspect_err(|err| error!(error = %err, "selection aborted"))?;
    deploy(index, services, resolution, out)
}

/// Cause chain of a per-resource error, for the console report.
fn cause_of(err: &DeployError) -> String {
    let mut messages = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }
    if messages.is_empty() {
        err.to_string()
    } else {
        messages.join(": ")
    }
}
