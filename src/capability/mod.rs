//! Stage contracts for pipeline capabilities.
//!
//! A capability is a named, parameterized processing unit for one of the three
//! pipeline stages. Parameters are fixed when the registry factory builds the
//! instance; afterwards a capability is an immutable function of its input, so
//! instances are shared behind `Arc` and must be `Send + Sync`.
//!
//! Each contract reports its own parameter encoding through `parameters`; the
//! codec writes that block back next to the capability name when saving.

pub mod compound;

pub use compound::{CompoundMeshModifier, CompoundToolPathModifier};

use crate::error::CapabilityError;
use crate::geometry::{Mesh, ToolPaths};
use serde_json::{Map, Value};

/// Capability-specific parameter block: the document entry minus its `name`.
pub type Parameters = Map<String, Value>;

/// Prepares a mesh for planning. May split one mesh into several.
pub trait MeshModifier: Send + Sync {
    fn modify(&self, mesh: &Mesh) -> Result<Vec<Mesh>, CapabilityError>;

    fn parameters(&self) -> Parameters {
        Parameters::new()
    }
}

/// Generates tool paths over a single mesh.
pub trait ToolPathPlanner: Send + Sync {
    fn plan(&self, mesh: &Mesh) -> Result<ToolPaths, CapabilityError>;

    fn parameters(&self) -> Parameters {
        Parameters::new()
    }
}

/// Refines an already planned sequence of tool paths as a whole.
pub trait ToolPathModifier: Send + Sync {
    fn modify(&self, tool_paths: ToolPaths) -> Result<ToolPaths, CapabilityError>;

    fn parameters(&self) -> Parameters {
        Parameters::new()
    }
}

/// Returns the input mesh unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMeshModifier;

impl MeshModifier for NoOpMeshModifier {
    fn modify(&self, mesh: &Mesh) -> Result<Vec<Mesh>, CapabilityError> {
        Ok(vec![mesh.clone()])
    }
}

/// Plans nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpToolPathPlanner;

impl ToolPathPlanner for NoOpToolPathPlanner {
    fn plan(&self, _mesh: &Mesh) -> Result<ToolPaths, CapabilityError> {
        Ok(ToolPaths::new())
    }
}

/// Returns the tool paths unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpToolPathModifier;

impl ToolPathModifier for NoOpToolPathModifier {
    fn modify(&self, tool_paths: ToolPaths) -> Result<ToolPaths, CapabilityError> {
        Ok(tool_paths)
    }
}
