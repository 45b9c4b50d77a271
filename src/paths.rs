//! Resource path conventions for packaged definitions.
//!
//! Every definition lives under `DEFINITIONS_ROOT` inside its module, in the
//! one directory owned by its kind, and carries the `DEFINITION_EXTENSION`
//! suffix. Callers must treat `path_for` as a lookup table: the only
//! guarantee is that each kind maps to one distinct prefix.

use crate::kind::DefinitionKind;

/// Root directory (module-relative) holding every definition resource.
pub const DEFINITIONS_ROOT: &str = "META-INF/cxs/";

/// Extension reserved for definition payloads.
pub const DEFINITION_EXTENSION: &str = ".json";

/// Resource-path prefix owning the definitions of `kind`.
pub fn path_for(kind: DefinitionKind) -> String {
    let segment = match kind {
        DefinitionKind::Condition => "conditions",
        DefinitionKind::Action => "actions",
        DefinitionKind::Goal => "goals",
        DefinitionKind::Campaign => "campaigns",
        DefinitionKind::Persona => "personas",
        DefinitionKind::Property => "properties",
        DefinitionKind::Rule => "rules",
        DefinitionKind::Segment => "segments",
        DefinitionKind::Scoring => "scoring",
        DefinitionKind::Patch => "patches",
    };
    format!("{DEFINITIONS_ROOT}{segment}")
}

/// Normalize an operator-supplied file name for suffix matching.
///
/// A bare name gains a leading `/` so `a.json` cannot match `ba.json`, and
/// the reserved extension is appended when missing. Applying it twice yields
/// the same value.
pub fn normalize_file_name(raw: &str) -> String {
    let mut name = if raw.contains('/') {
        raw.to_string()
    } else {
        format!("/{raw}")
    };
    if !name.ends_with(DEFINITION_EXTENSION) {
        name.push_str(DEFINITION_EXTENSION);
    }
    name
}

/// Last path segment of a resource path.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Property target encoded in a property resource path.
///
/// Property files are grouped by target
/// (`/META-INF/cxs/properties/<target>/.../name.json`). Files sitting directly
/// under the properties directory have no derived target.
pub fn property_target(path: &str) -> Option<String> {
    let prefix = path_for(DefinitionKind::Property);
    let relative = path
        .trim_start_matches('/')
        .strip_prefix(prefix.as_str())?
        .strip_prefix('/')?;
    let mut segments = relative.split('/');
    let first = segments.next()?;
    // A lone segment is the file itself.
    segments.next()?;
    if first.is_empty() {
        return None;
    }
    Some(first.to_string())
}
