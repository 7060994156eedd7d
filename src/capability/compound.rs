//! Compound adapters: an ordered list of same-kind capabilities acting as one.
//!
//! Mesh modifiers compose by fan-out: every mesh produced by step `i` is fed
//! separately to step `i + 1` and the results are concatenated in input order.
//! Tool path modifiers compose linearly: each step consumes the previous step's
//! whole output. An empty compound is the identity for both.

use crate::capability::{MeshModifier, ToolPathModifier};
use crate::error::CapabilityError;
use crate::geometry::{Mesh, ToolPaths};
use std::fmt;
use std::sync::Arc;

/// Fan-out composition of mesh modifiers.
#[derive(Clone, Default)]
pub struct CompoundMeshModifier {
    modifiers: Vec<Arc<dyn MeshModifier>>,
}

impl CompoundMeshModifier {
    pub fn new(modifiers: Vec<Arc<dyn MeshModifier>>) -> Self {
        Self { modifiers }
    }
}

impl MeshModifier for CompoundMeshModifier {
    fn modify(&self, mesh: &Mesh) -> Result<Vec<Mesh>, CapabilityError> {
        let mut meshes = vec![mesh.clone()];
        for (position, modifier) in self.modifiers.iter().enumerate() {
            let mut next = Vec::with_capacity(meshes.len());
            for input in &meshes {
                let outputs = modifier
                    .modify(input)
                    .map_err(|err| err.context(format!("mesh modifier #{position}")))?;
                next.extend(outputs);
            }
            meshes = next;
        }
        Ok(meshes)
    }
}

impl fmt::Debug for CompoundMeshModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundMeshModifier")
            .field("len", &self.modifiers.len())
            .finish()
    }
}

/// Linear composition of tool path modifiers.
#[derive(Clone, Default)]
pub struct CompoundToolPathModifier {
    modifiers: Vec<Arc<dyn ToolPathModifier>>,
}

impl CompoundToolPathModifier {
    pub fn new(modifiers: Vec<Arc<dyn ToolPathModifier>>) -> Self {
        Self { modifiers }
    }
}

impl ToolPathModifier for CompoundToolPathModifier {
    fn modify(&self, tool_paths: ToolPaths) -> Result<ToolPaths, CapabilityError> {
        self.modifiers
            .iter()
            .enumerate()
            .try_fold(tool_paths, |paths, (position, modifier)| {
                modifier
                    .modify(paths)
                    .map_err(|err| err.context(format!("tool path modifier #{position}")))
            })
    }
}

impl fmt::Debug for CompoundToolPathModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundToolPathModifier")
            .field("len", &self.modifiers.len())
            .finish()
    }
}
