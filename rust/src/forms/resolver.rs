//! Field Set Resolver
//!
//! Decides which fields a form shows: one per extracted key (dynamic mode) or
//! the static list configured for the document type (fallback mode).

use setu_types::{ExtractedData, FieldDescriptor};
use tracing::debug;

use super::config::FormConfig;
use super::inference::{infer_field_kind, DateHeuristic};
use super::labeler::field_label;

/// Resolve the ordered field list for a document
///
/// Dynamic mode applies whenever `use_dynamic_fields` is set and extracted
/// data is present, even if that mapping is empty. Unknown or missing document
/// types in fallback mode resolve to an empty list.
pub fn resolve_fields(
    document_type: Option<&str>,
    extracted_data: Option<&ExtractedData>,
    use_dynamic_fields: bool,
    config: &FormConfig,
    heuristic: DateHeuristic,
) -> Vec<FieldDescriptor> {
    if use_dynamic_fields {
        if let Some(data) = extracted_data {
            debug!("Resolving {} dynamic fields", data.len());
            return data
                .iter()
                .map(|(name, value)| {
                    FieldDescriptor::new(
                        name,
                        field_label(name),
                        infer_field_kind(name, value, heuristic),
                    )
                })
                .collect();
        }
    }

    let Some(document_type) = document_type else {
        return Vec::new();
    };

    match config.fields_for(document_type) {
        Some(specs) => {
            debug!(
                "Resolving {} static fields for {}",
                specs.len(),
                document_type
            );
            specs.iter().map(FieldDescriptor::from).collect()
        }
        None => {
            debug!("No static fields configured for {}", document_type);
            Vec::new()
        }
    }
}
