//! Shape validation for pipeline documents.
//!
//! The embedded JSON Schema only checks structure: section types, list entries
//! being objects, and `name` being a string where present. Whether a name is
//! present and resolvable is left to the codec so those failures keep their
//! dedicated error kinds.

use crate::error::{PipelineError, Section};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::OnceLock;

/// Raw text of `schema/pipeline_document.schema.json`.
pub const PIPELINE_DOCUMENT_SCHEMA: &str =
    include_str!("../schema/pipeline_document.schema.json");

fn compiled_schema() -> Result<&'static JSONSchema, PipelineError> {
    static COMPILED: OnceLock<JSONSchema> = OnceLock::new();
    if let Some(schema) = COMPILED.get() {
        return Ok(schema);
    }

    let raw: Value = serde_json::from_str(PIPELINE_DOCUMENT_SCHEMA)?;
    let compiled = JSONSchema::compile(&raw).map_err(|err| {
        PipelineError::invalid_document(format!("compiling pipeline document schema: {err}"))
    })?;
    Ok(COMPILED.get_or_init(|| compiled))
}

/// Validate `document` against the pipeline document schema.
///
/// All violations are reported together, one per line. The error is wrapped
/// with the earliest section (and list entry) a violation points into; a
/// violation of the document root stays unwrapped.
pub fn validate_document(document: &Value) -> Result<(), PipelineError> {
    let schema = compiled_schema()?;
    let Err(errors) = schema.validate(document) else {
        return Ok(());
    };

    let mut details = Vec::new();
    let mut location: Option<(Section, Option<usize>)> = None;
    for err in errors {
        let found = violation_location(&err.instance_path.to_string());
        location = location.into_iter().chain(found).min();
        details.push(err.to_string());
    }

    let err = PipelineError::invalid_document(details.join("\n"));
    Err(match location {
        Some((section, index)) => err.in_section(section, index),
        None => err,
    })
}

/// Map a JSON pointer such as `/tool_path_modifiers/2/name` to its section and
/// list position.
fn violation_location(pointer: &str) -> Option<(Section, Option<usize>)> {
    let mut segments = pointer.split('/').skip(1);
    let section = Section::from_key(segments.next()?)?;
    let index = match section {
        Section::ToolPathPlanner => None,
        Section::MeshModifiers | Section::ToolPathModifiers => {
            segments.next().and_then(|segment| segment.parse().ok())
        }
    };
    Some((section, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_document() {
        let doc = json!({
            "mesh_modifiers": [{"name": "clustering", "tolerance": 0.1}],
            "tool_path_planner": {"name": "raster", "line_spacing": 0.05},
            "tool_path_modifiers": []
        });
        validate_document(&doc).expect("document should validate");
    }

    #[test]
    fn accepts_missing_sections_and_names() {
        validate_document(&json!({})).expect("sections are optional in the schema");
        validate_document(&json!({"tool_path_planner": {}}))
            .expect("planner name presence is checked by the codec");
        validate_document(&json!({"mesh_modifiers": null, "tool_path_planner": null}))
            .expect("null sections are allowed");
    }

    #[test]
    fn wrong_section_types_name_the_section() {
        let err = validate_document(&json!({"mesh_modifiers": {"name": "x"}})).unwrap_err();
        assert_eq!(err.section(), Some((Section::MeshModifiers, None)));
        assert!(matches!(err.root_cause(), PipelineError::InvalidDocument { .. }));

        let err = validate_document(&json!({"tool_path_modifiers": [{}, "reverse_order"]}))
            .unwrap_err();
        assert_eq!(err.section(), Some((Section::ToolPathModifiers, Some(1))));

        let err = validate_document(&json!({"tool_path_planner": {"name": 7}})).unwrap_err();
        assert_eq!(err.section(), Some((Section::ToolPathPlanner, None)));
    }

    #[test]
    fn earliest_section_wins() {
        let err = validate_document(&json!({
            "tool_path_modifiers": 3,
            "mesh_modifiers": [{"name": false}]
        }))
        .unwrap_err();
        assert_eq!(err.section(), Some((Section::MeshModifiers, Some(0))));
    }

    #[test]
    fn rejects_non_object_root() {
        let err = validate_document(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDocument { .. }));
    }

    #[test]
    fn pointers_map_to_locations() {
        assert_eq!(
            violation_location("/mesh_modifiers/4/name"),
            Some((Section::MeshModifiers, Some(4)))
        );
        assert_eq!(
            violation_location("/tool_path_planner/name"),
            Some((Section::ToolPathPlanner, None))
        );
        assert_eq!(violation_location(""), None);
        assert_eq!(violation_location("/comment"), None);
    }
}
