//! Executable pipeline: mesh modifier, then planner per mesh, then tool path modifier.

use crate::capability::{MeshModifier, ToolPathModifier, ToolPathPlanner};
use crate::error::{PipelineError, Section};
use crate::geometry::{Mesh, ToolPath, ToolPaths};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A fully assembled, immutable pipeline.
///
/// Holds its own references to the three stage capabilities, so it stays valid
/// and unchanged however the builder that produced it is edited afterwards.
#[derive(Clone)]
pub struct Pipeline {
    mesh_modifier: Arc<dyn MeshModifier>,
    planner: Arc<dyn ToolPathPlanner>,
    tool_path_modifier: Arc<dyn ToolPathModifier>,
}

impl Pipeline {
    pub fn new(
        mesh_modifier: Arc<dyn MeshModifier>,
        planner: Arc<dyn ToolPathPlanner>,
        tool_path_modifier: Arc<dyn ToolPathModifier>,
    ) -> Self {
        Self {
            mesh_modifier,
            planner,
            tool_path_modifier,
        }
    }

    /// Run every stage over `mesh`.
    ///
    /// The planner sees each prepared mesh separately; their tool paths are
    /// concatenated in mesh order before the tool path modifier runs once over
    /// the whole sequence. Failures are wrapped with the stage (and, for the
    /// planner, the mesh index) that produced them.
    pub fn run(&self, mesh: &Mesh) -> Result<ToolPaths, PipelineError> {
        let meshes = self
            .mesh_modifier
            .modify(mesh)
            .map_err(|err| PipelineError::from(err).in_section(Section::MeshModifiers, None))?;
        trace!(meshes = meshes.len(), "mesh modification done");

        let mut tool_paths = ToolPaths::new();
        for (index, prepared) in meshes.iter().enumerate() {
            let planned = self.planner.plan(prepared).map_err(|err| {
                PipelineError::from(err).in_section(Section::ToolPathPlanner, Some(index))
            })?;
            trace!(mesh = index, tool_paths = planned.len(), "planned mesh");
            tool_paths.extend(planned);
        }

        let modified = self
            .tool_path_modifier
            .modify(tool_paths)
            .map_err(|err| {
                PipelineError::from(err).in_section(Section::ToolPathModifiers, None)
            })?;
        trace!(
            tool_paths = modified.len(),
            waypoints = modified.iter().map(ToolPath::waypoint_count).sum::<usize>(),
            "tool path modification done"
        );
        Ok(modified)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}
