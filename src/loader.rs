use crate::error::DeployError;
use crate::kind::DefinitionKind;
use crate::model::DefinitionRecord;
use crate::registry::{ResourceIndex, ResourceLocation};
use tracing::debug;

/// Fetch a resource and parse it into the record shape bound to `kind`.
///
/// Read and parse failures come back as per-resource errors carrying the
/// location; nothing else is touched.
pub fn load(
    index: &ResourceIndex<'_>,
    kind: DefinitionKind,
    location: &ResourceLocation,
) -> Result<DefinitionRecord, DeployError> {
    let bytes = index.read(location).map_err(|source| DeployError::Read {
        location: location.clone(),
        source,
    })?;
    let record =
        DefinitionRecord::from_slice(kind, &bytes).map_err(|source| DeployError::Deserialization {
            location: location.clone(),
            source,
        })?;
    debug!(%location, %kind, item = record.item_id(), "loaded definition");
    Ok(record)
}
