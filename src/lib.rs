//! Configurable tool path planning pipelines.
//!
//! A pipeline runs three stages over a mesh: an ordered list of mesh modifiers
//! (which may split the mesh), one tool path planner applied to every prepared
//! mesh, and an ordered list of tool path modifiers applied to the combined
//! result. Each stage is filled from a [`CapabilityRegistry`] by name, so
//! pipelines can be described in, and restored from, JSON documents.
//!
//! The usual flow: populate a registry (see [`builtins::register`]), hand it to
//! a [`PipelineBuilder`], `configure` the builder from a document or edit it
//! directly, then `build` a [`Pipeline`] and `run` it.

pub mod builder;
pub mod builtins;
pub mod capability;
pub mod catalog;
pub mod codec;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod schema_loader;

pub use builder::{PipelineBuilder, PipelineState, Selection, SelectionList};
pub use capability::{
    CompoundMeshModifier, CompoundToolPathModifier, MeshModifier, NoOpMeshModifier,
    NoOpToolPathModifier, NoOpToolPathPlanner, Parameters, ToolPathModifier, ToolPathPlanner,
};
pub use catalog::{Capability, CapabilityKind, CapabilityRegistry, Factory};
pub use codec::{decode, encode, read_document, write_document};
pub use error::{CapabilityError, PipelineError, Section};
pub use geometry::{Mesh, Point3, ToolPath, ToolPathSegment, ToolPaths, Waypoint};
pub use pipeline::Pipeline;
pub use schema_loader::{PIPELINE_DOCUMENT_SCHEMA, validate_document};
