//! Pipeline document encoding.
//!
//! A document is a JSON object with three optional keys:
//!
//! ```json
//! {
//!   "mesh_modifiers": [{"name": "...", "...": "..."}],
//!   "tool_path_planner": {"name": "...", "...": "..."},
//!   "tool_path_modifiers": [{"name": "...", "...": "..."}]
//! }
//! ```
//!
//! Each entry carries the registry `name` plus the capability's own parameter
//! keys. A missing or null list counts as an empty list; a missing planner is
//! an error.

use crate::builder::{PipelineState, Selection, SelectionList};
use crate::capability::{Parameters, ToolPathPlanner};
use crate::catalog::CapabilityRegistry;
use crate::error::{PipelineError, Section};
use crate::schema_loader::validate_document;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

const NAME_KEY: &str = "name";

/// Resolve every entry of `document` against `registry`.
///
/// The document shape is checked against the schema first. Nothing is
/// partially returned: the first failing entry aborts the decode, wrapped with
/// its section and list position.
pub fn decode(
    registry: &CapabilityRegistry,
    document: &Value,
) -> Result<PipelineState, PipelineError> {
    validate_document(document)?;

    let mesh_modifiers = decode_list(document, Section::MeshModifiers, |name, params| {
        registry.create_mesh_modifier(name, params)
    })?;
    let planner = decode_planner(registry, document.get(Section::ToolPathPlanner.key()))
        .map_err(|err| err.in_section(Section::ToolPathPlanner, None))?;
    let tool_path_modifiers = decode_list(document, Section::ToolPathModifiers, |name, params| {
        registry.create_tool_path_modifier(name, params)
    })?;

    Ok(PipelineState {
        mesh_modifiers,
        planner: Some(planner),
        tool_path_modifiers,
    })
}

// Shape is already validated: a list section is an array or absent/null, and
// every entry is an object whose `name`, if present, is a string.
fn decode_list<T, F>(
    document: &Value,
    section: Section,
    create: F,
) -> Result<SelectionList<T>, PipelineError>
where
    T: ?Sized,
    F: Fn(&str, &Parameters) -> Result<Arc<T>, PipelineError>,
{
    let mut list = SelectionList::default();
    let entries = document
        .get(section.key())
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (index, entry) in entries.iter().enumerate() {
        let selection = decode_entry(entry, &create)
            .map_err(|err| err.in_section(section, Some(index)))?;
        list.push(selection);
    }
    Ok(list)
}

fn decode_entry<T, F>(entry: &Value, create: &F) -> Result<Selection<T>, PipelineError>
where
    T: ?Sized,
    F: Fn(&str, &Parameters) -> Result<Arc<T>, PipelineError>,
{
    let (name, parameters) = split_entry(entry)
        .ok_or_else(|| PipelineError::invalid_document("entry is missing a 'name'"))?;
    let capability = create(&name, &parameters)?;
    Ok(Selection::new(name, capability))
}

fn decode_planner(
    registry: &CapabilityRegistry,
    entry: Option<&Value>,
) -> Result<Selection<dyn ToolPathPlanner>, PipelineError> {
    let (name, parameters) = entry
        .and_then(split_entry)
        .filter(|(name, _)| !name.is_empty())
        .ok_or(PipelineError::MissingPlannerName)?;
    let planner = registry.create_planner(&name, &parameters)?;
    Ok(Selection::new(name, planner))
}

/// Split an entry object into its name and the remaining parameter keys.
///
/// `None` when the entry carries no `name`.
fn split_entry(entry: &Value) -> Option<(String, Parameters)> {
    let mut parameters = entry.as_object()?.clone();
    match parameters.remove(NAME_KEY) {
        Some(Value::String(name)) => Some((name, parameters)),
        _ => None,
    }
}

/// Produce the document describing `state`.
///
/// Fails with [`PipelineError::NoPlannerSelected`] when no planner is set.
pub fn encode(state: &PipelineState) -> Result<Value, PipelineError> {
    let planner = state
        .planner
        .as_ref()
        .ok_or(PipelineError::NoPlannerSelected)?;

    let mesh_modifiers = state
        .mesh_modifiers
        .iter()
        .map(|entry| encode_entry(entry.name(), entry.capability().parameters()))
        .collect::<Vec<_>>();
    let tool_path_modifiers = state
        .tool_path_modifiers
        .iter()
        .map(|entry| encode_entry(entry.name(), entry.capability().parameters()))
        .collect::<Vec<_>>();

    let mut document = Map::new();
    document.insert(
        Section::MeshModifiers.key().to_string(),
        Value::Array(mesh_modifiers),
    );
    document.insert(
        Section::ToolPathPlanner.key().to_string(),
        encode_entry(planner.name(), planner.capability().parameters()),
    );
    document.insert(
        Section::ToolPathModifiers.key().to_string(),
        Value::Array(tool_path_modifiers),
    );
    Ok(Value::Object(document))
}

fn encode_entry(name: &str, parameters: Parameters) -> Value {
    let mut entry = parameters;
    // the registry name always wins over a parameter that happens to be called "name"
    entry.insert(NAME_KEY.to_string(), Value::String(name.to_string()));
    Value::Object(entry)
}

/// Load a pipeline document from disk.
pub fn read_document(path: &Path) -> Result<Value, PipelineError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write `document` to `path` as pretty-printed JSON.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// reader never observes a half-written document.
pub fn write_document(path: &Path, document: &Value) -> Result<(), PipelineError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut rendered = serde_json::to_string_pretty(document)?;
    rendered.push('\n');

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(rendered.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
