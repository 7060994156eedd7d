//! Structural capabilities that need no geometry kernel.
//!
//! `no_op` exists for every kind; the tool path modifiers `reverse_order` and
//! `truncate` reorder or cut the planned sequence.

use crate::capability::{
    NoOpMeshModifier, NoOpToolPathModifier, NoOpToolPathPlanner, Parameters, ToolPathModifier,
};
use crate::catalog::CapabilityRegistry;
use crate::error::{CapabilityError, PipelineError};
use crate::geometry::ToolPaths;
use serde::Deserialize;
use serde_json::Value;

pub const NO_OP: &str = "no_op";
pub const REVERSE_ORDER: &str = "reverse_order";
pub const TRUNCATE: &str = "truncate";

/// Add the built-in capabilities to `registry`.
pub fn register(registry: &mut CapabilityRegistry) -> Result<(), PipelineError> {
    registry.register_mesh_modifier(NO_OP, |_| Ok(NoOpMeshModifier))?;
    registry.register_planner(NO_OP, |_| Ok(NoOpToolPathPlanner))?;
    registry.register_tool_path_modifier(NO_OP, |_| Ok(NoOpToolPathModifier))?;
    registry.register_tool_path_modifier(REVERSE_ORDER, |_| Ok(ReverseOrderModifier))?;
    registry.register_tool_path_modifier(TRUNCATE, TruncateModifier::from_parameters)?;
    Ok(())
}

/// A registry holding only the built-ins.
pub fn default_registry() -> Result<CapabilityRegistry, PipelineError> {
    let mut registry = CapabilityRegistry::new();
    register(&mut registry)?;
    Ok(registry)
}

/// Reverses the order of the tool paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReverseOrderModifier;

impl ToolPathModifier for ReverseOrderModifier {
    fn modify(&self, mut tool_paths: ToolPaths) -> Result<ToolPaths, CapabilityError> {
        tool_paths.reverse();
        Ok(tool_paths)
    }
}

/// Keeps at most the first `max_paths` tool paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TruncateModifier {
    pub max_paths: usize,
}

impl TruncateModifier {
    pub fn from_parameters(parameters: &Parameters) -> Result<Self, CapabilityError> {
        let Some(value) = parameters.get("max_paths") else {
            return Err(CapabilityError::invalid_parameter("max_paths", "missing"));
        };
        serde_json::from_value(Value::Object(parameters.clone())).map_err(|err| {
            CapabilityError::invalid_parameter("max_paths", format!("{value}: {err}"))
        })
    }
}

impl ToolPathModifier for TruncateModifier {
    fn modify(&self, mut tool_paths: ToolPaths) -> Result<ToolPaths, CapabilityError> {
        tool_paths.truncate(self.max_paths);
        Ok(tool_paths)
    }

    fn parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("max_paths".to_string(), Value::from(self.max_paths));
        parameters
    }
}
