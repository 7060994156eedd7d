//! Name → factory tables, one per capability kind.
//!
//! Entries live in `BTreeMap`s so `names` is lexicographic and stable across
//! runs. Registration is append-only: duplicate and empty names are rejected
//! instead of silently replacing an entry.

use crate::capability::{MeshModifier, Parameters, ToolPathModifier, ToolPathPlanner};
use crate::catalog::CapabilityKind;
use crate::error::{CapabilityError, PipelineError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds a configured capability from its parameter block.
pub type Factory<T> = Arc<dyn Fn(&Parameters) -> Result<Arc<T>, CapabilityError> + Send + Sync>;

/// A created capability of any kind, as returned by [`CapabilityRegistry::create`].
#[derive(Clone)]
pub enum Capability {
    MeshModifier(Arc<dyn MeshModifier>),
    ToolPathPlanner(Arc<dyn ToolPathPlanner>),
    ToolPathModifier(Arc<dyn ToolPathModifier>),
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::MeshModifier(_) => CapabilityKind::MeshModifier,
            Capability::ToolPathPlanner(_) => CapabilityKind::ToolPathPlanner,
            Capability::ToolPathModifier(_) => CapabilityKind::ToolPathModifier,
        }
    }

    /// The capability's own parameter encoding.
    pub fn parameters(&self) -> Parameters {
        match self {
            Capability::MeshModifier(cap) => cap.parameters(),
            Capability::ToolPathPlanner(cap) => cap.parameters(),
            Capability::ToolPathModifier(cap) => cap.parameters(),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.kind()).finish()
    }
}

struct Catalog<T: ?Sized> {
    kind: CapabilityKind,
    factories: BTreeMap<String, Factory<T>>,
}

impl<T: ?Sized> Catalog<T> {
    fn new(kind: CapabilityKind) -> Self {
        Self {
            kind,
            factories: BTreeMap::new(),
        }
    }

    fn register(&mut self, name: String, factory: Factory<T>) -> Result<(), PipelineError> {
        if name.trim().is_empty() {
            return Err(PipelineError::EmptyCapabilityName { kind: self.kind });
        }
        if self.factories.contains_key(&name) {
            return Err(PipelineError::DuplicateCapability {
                kind: self.kind,
                name,
            });
        }
        debug!(kind = self.kind.as_str(), name = %name, "registered capability");
        self.factories.insert(name, factory);
        Ok(())
    }

    fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    fn create(&self, name: &str, parameters: &Parameters) -> Result<Arc<T>, PipelineError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| PipelineError::UnknownCapability {
                kind: self.kind,
                name: name.to_string(),
            })?;
        Ok(factory(parameters)?)
    }
}

/// Registration table for every capability kind.
pub struct CapabilityRegistry {
    mesh_modifiers: Catalog<dyn MeshModifier>,
    planners: Catalog<dyn ToolPathPlanner>,
    tool_path_modifiers: Catalog<dyn ToolPathModifier>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self {
            mesh_modifiers: Catalog::new(CapabilityKind::MeshModifier),
            planners: Catalog::new(CapabilityKind::ToolPathPlanner),
            tool_path_modifiers: Catalog::new(CapabilityKind::ToolPathModifier),
        }
    }
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh modifier factory under `name`.
    pub fn register_mesh_modifier<F, M>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), PipelineError>
    where
        F: Fn(&Parameters) -> Result<M, CapabilityError> + Send + Sync + 'static,
        M: MeshModifier + 'static,
    {
        let factory: Factory<dyn MeshModifier> = Arc::new(move |parameters: &Parameters| {
            factory(parameters).map(|modifier| Arc::new(modifier) as Arc<dyn MeshModifier>)
        });
        self.mesh_modifiers.register(name.into(), factory)
    }

    /// Register a tool path planner factory under `name`.
    pub fn register_planner<F, P>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), PipelineError>
    where
        F: Fn(&Parameters) -> Result<P, CapabilityError> + Send + Sync + 'static,
        P: ToolPathPlanner + 'static,
    {
        let factory: Factory<dyn ToolPathPlanner> = Arc::new(move |parameters: &Parameters| {
            factory(parameters).map(|planner| Arc::new(planner) as Arc<dyn ToolPathPlanner>)
        });
        self.planners.register(name.into(), factory)
    }

    /// Register a tool path modifier factory under `name`.
    pub fn register_tool_path_modifier<F, M>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), PipelineError>
    where
        F: Fn(&Parameters) -> Result<M, CapabilityError> + Send + Sync + 'static,
        M: ToolPathModifier + 'static,
    {
        let factory: Factory<dyn ToolPathModifier> = Arc::new(move |parameters: &Parameters| {
            factory(parameters).map(|modifier| Arc::new(modifier) as Arc<dyn ToolPathModifier>)
        });
        self.tool_path_modifiers.register(name.into(), factory)
    }

    /// Registered names for `kind`, in lexicographic order.
    pub fn names(&self, kind: CapabilityKind) -> Vec<&str> {
        match kind {
            CapabilityKind::MeshModifier => self.mesh_modifiers.names(),
            CapabilityKind::ToolPathPlanner => self.planners.names(),
            CapabilityKind::ToolPathModifier => self.tool_path_modifiers.names(),
        }
    }

    pub fn contains(&self, kind: CapabilityKind, name: &str) -> bool {
        match kind {
            CapabilityKind::MeshModifier => self.mesh_modifiers.contains(name),
            CapabilityKind::ToolPathPlanner => self.planners.contains(name),
            CapabilityKind::ToolPathModifier => self.tool_path_modifiers.contains(name),
        }
    }

    /// Create a capability of any kind.
    ///
    /// Fails with [`PipelineError::UnknownCapability`] when `name` is not
    /// registered for `kind`, or with [`PipelineError::Capability`] when the
    /// factory rejects `parameters`.
    pub fn create(
        &self,
        kind: CapabilityKind,
        name: &str,
        parameters: &Parameters,
    ) -> Result<Capability, PipelineError> {
        Ok(match kind {
            CapabilityKind::MeshModifier => {
                Capability::MeshModifier(self.create_mesh_modifier(name, parameters)?)
            }
            CapabilityKind::ToolPathPlanner => {
                Capability::ToolPathPlanner(self.create_planner(name, parameters)?)
            }
            CapabilityKind::ToolPathModifier => {
                Capability::ToolPathModifier(self.create_tool_path_modifier(name, parameters)?)
            }
        })
    }

    pub fn create_mesh_modifier(
        &self,
        name: &str,
        parameters: &Parameters,
    ) -> Result<Arc<dyn MeshModifier>, PipelineError> {
        self.mesh_modifiers.create(name, parameters)
    }

    pub fn create_planner(
        &self,
        name: &str,
        parameters: &Parameters,
    ) -> Result<Arc<dyn ToolPathPlanner>, PipelineError> {
        self.planners.create(name, parameters)
    }

    pub fn create_tool_path_modifier(
        &self,
        name: &str,
        parameters: &Parameters,
    ) -> Result<Arc<dyn ToolPathModifier>, PipelineError> {
        self.tool_path_modifiers.create(name, parameters)
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("mesh_modifiers", &self.mesh_modifiers.names())
            .field("planners", &self.planners.names())
            .field("tool_path_modifiers", &self.tool_path_modifiers.names())
            .finish()
    }
}
