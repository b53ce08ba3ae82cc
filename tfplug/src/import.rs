//! Import helpers

use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Copies the import id into `attribute` (and `id`) of an otherwise empty
/// state. The read that Terraform runs after import fills in the rest.
pub fn import_state_passthrough_id(
    request: &ImportResourceStateRequest,
    attribute: &str,
) -> ImportResourceStateResponse {
    if request.id.is_empty() {
        return ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![Diagnostic::error(
                "Invalid import id",
                "The import id must not be empty",
            )],
        };
    }

    let mut state = DynamicValue::null();
    let mut diagnostics = vec![];
    for name in ["id", attribute] {
        if let Err(e) = state.set_string(&AttributePath::new(name), request.id.clone()) {
            diagnostics.push(Diagnostic::error("Failed to set imported attribute", e.to_string()));
        }
    }

    ImportResourceStateResponse {
        imported_resources: vec![ImportedResource {
            type_name: request.type_name.clone(),
            state,
        }],
        diagnostics,
    }
}
