//! Mutable staging area the editor drives before a pipeline is built.
//!
//! The builder tracks the selected planner and the ordered modifier lists, each
//! entry remembering the name it was resolved from. `configure` swaps the whole
//! state in one step: the document is decoded into a fresh [`PipelineState`]
//! first, and only a complete decode replaces the current one. Any failure
//! leaves the builder in the safe default (no planner, empty lists).

use crate::capability::{
    CompoundMeshModifier, CompoundToolPathModifier, MeshModifier, NoOpMeshModifier,
    NoOpToolPathModifier, Parameters, ToolPathModifier, ToolPathPlanner,
};
use crate::catalog::{CapabilityKind, CapabilityRegistry};
use crate::codec;
use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A resolved capability together with the registry name it came from.
pub struct Selection<T: ?Sized> {
    name: String,
    capability: Arc<T>,
}

impl<T: ?Sized> Selection<T> {
    pub fn new(name: impl Into<String>, capability: Arc<T>) -> Self {
        Self {
            name: name.into(),
            capability,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capability(&self) -> &Arc<T> {
        &self.capability
    }
}

impl<T: ?Sized> Clone for Selection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            capability: Arc::clone(&self.capability),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selection").field(&self.name).finish()
    }
}

/// Ordered list of selections; list order is execution order.
pub struct SelectionList<T: ?Sized> {
    entries: Vec<Selection<T>>,
}

impl<T: ?Sized> Default for SelectionList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: ?Sized> Clone for SelectionList<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for SelectionList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<T: ?Sized> SelectionList<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Selection::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selection<T>> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Selection<T>> {
        self.entries.get(index)
    }

    pub fn push(&mut self, selection: Selection<T>) {
        self.entries.push(selection);
    }

    /// Remove the entry at `index`, returning it if it existed.
    pub fn remove(&mut self, index: usize) -> Option<Selection<T>> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Move the entry at `from` so it ends up at position `to`.
    ///
    /// Returns false (and leaves the list untouched) when either index is out
    /// of range.
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        if from >= self.entries.len() || to >= self.entries.len() {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The capabilities in execution order, detached from their names.
    pub fn capabilities(&self) -> Vec<Arc<T>> {
        self.entries
            .iter()
            .map(|entry| Arc::clone(&entry.capability))
            .collect()
    }
}

/// Everything a pipeline document describes, fully resolved.
#[derive(Clone, Debug, Default)]
pub struct PipelineState {
    pub mesh_modifiers: SelectionList<dyn MeshModifier>,
    pub planner: Option<Selection<dyn ToolPathPlanner>>,
    pub tool_path_modifiers: SelectionList<dyn ToolPathModifier>,
}

impl PipelineState {
    /// True for the safe default: no planner and no modifiers.
    pub fn is_empty(&self) -> bool {
        self.planner.is_none()
            && self.mesh_modifiers.is_empty()
            && self.tool_path_modifiers.is_empty()
    }
}

/// Assembles pipelines from registry names; see the module docs.
pub struct PipelineBuilder {
    registry: Arc<CapabilityRegistry>,
    state: PipelineState,
}

impl PipelineBuilder {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            state: PipelineState::default(),
        }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Names the editor can offer for `kind`, sorted.
    pub fn available(&self, kind: CapabilityKind) -> Vec<&str> {
        self.registry.names(kind)
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn planner_name(&self) -> Option<&str> {
        self.state.planner.as_ref().map(Selection::name)
    }

    pub fn mesh_modifier_names(&self) -> Vec<&str> {
        self.state.mesh_modifiers.names()
    }

    pub fn tool_path_modifier_names(&self) -> Vec<&str> {
        self.state.tool_path_modifiers.names()
    }

    /// Select the planner `name`, built from `parameters`.
    ///
    /// On failure the previous selection is kept.
    pub fn select_planner(
        &mut self,
        name: &str,
        parameters: &Parameters,
    ) -> Result<(), PipelineError> {
        let planner = self.registry.create_planner(name, parameters)?;
        self.state.planner = Some(Selection::new(name, planner));
        Ok(())
    }

    pub fn clear_planner(&mut self) {
        self.state.planner = None;
    }

    /// Append mesh modifier `name` to the end of the mesh modifier list.
    pub fn add_mesh_modifier(
        &mut self,
        name: &str,
        parameters: &Parameters,
    ) -> Result<(), PipelineError> {
        let modifier = self.registry.create_mesh_modifier(name, parameters)?;
        self.state.mesh_modifiers.push(Selection::new(name, modifier));
        Ok(())
    }

    /// Append tool path modifier `name` to the end of the tool path modifier list.
    pub fn add_tool_path_modifier(
        &mut self,
        name: &str,
        parameters: &Parameters,
    ) -> Result<(), PipelineError> {
        let modifier = self.registry.create_tool_path_modifier(name, parameters)?;
        self.state.tool_path_modifiers.push(Selection::new(name, modifier));
        Ok(())
    }

    /// Reorder or remove mesh modifiers.
    pub fn mesh_modifiers_mut(&mut self) -> &mut SelectionList<dyn MeshModifier> {
        &mut self.state.mesh_modifiers
    }

    /// Reorder or remove tool path modifiers.
    pub fn tool_path_modifiers_mut(&mut self) -> &mut SelectionList<dyn ToolPathModifier> {
        &mut self.state.tool_path_modifiers
    }

    /// Drop every selection, returning to the safe default.
    pub fn reset(&mut self) {
        self.state = PipelineState::default();
    }

    /// Replace the builder state with the pipeline described by `document`.
    ///
    /// Atomic: either every section decodes and the new state is installed, or
    /// the builder is reset and the failure is returned wrapped with the
    /// section that caused it.
    pub fn configure(&mut self, document: &Value) -> Result<(), PipelineError> {
        match codec::decode(&self.registry, document) {
            Ok(state) => {
                debug!(
                    planner = state.planner.as_ref().map(Selection::name).unwrap_or_default(),
                    mesh_modifiers = state.mesh_modifiers.len(),
                    tool_path_modifiers = state.tool_path_modifiers.len(),
                    "configured pipeline"
                );
                self.state = state;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err.chain_message(), "pipeline configuration failed; resetting");
                self.reset();
                Err(err)
            }
        }
    }

    /// Write the current state into `document`.
    ///
    /// The three section keys are replaced; other keys of an object document
    /// are kept. Fails with [`PipelineError::NoPlannerSelected`] without
    /// touching `document` when no planner is selected.
    pub fn save(&self, document: &mut Value) -> Result<(), PipelineError> {
        let encoded = codec::encode(&self.state)?;
        match (document, encoded) {
            (Value::Object(target), Value::Object(sections)) => target.extend(sections),
            (target, encoded) => *target = encoded,
        }
        Ok(())
    }

    /// The current state as a fresh document.
    pub fn to_document(&self) -> Result<Value, PipelineError> {
        codec::encode(&self.state)
    }

    /// Build an immutable pipeline from the current selections.
    ///
    /// Empty modifier lists use the no-op defaults directly; non-empty lists are
    /// wrapped in the matching compound adapter.
    pub fn build(&self) -> Result<Pipeline, PipelineError> {
        let planner = self
            .state
            .planner
            .as_ref()
            .ok_or(PipelineError::NoPlannerSelected)?;

        let mesh_modifier: Arc<dyn MeshModifier> = if self.state.mesh_modifiers.is_empty() {
            Arc::new(NoOpMeshModifier)
        } else {
            Arc::new(CompoundMeshModifier::new(self.state.mesh_modifiers.capabilities()))
        };

        let tool_path_modifier: Arc<dyn ToolPathModifier> =
            if self.state.tool_path_modifiers.is_empty() {
                Arc::new(NoOpToolPathModifier)
            } else {
                Arc::new(CompoundToolPathModifier::new(
                    self.state.tool_path_modifiers.capabilities(),
                ))
            };

        Ok(Pipeline::new(
            mesh_modifier,
            Arc::clone(planner.capability()),
            tool_path_modifier,
        ))
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
