//! Capability catalog wiring.
//!
//! The registry maps a capability kind and a name to a factory that builds a
//! configured instance. Callers populate it once at start-up, wrap it in an
//! `Arc`, and hand it to every `PipelineBuilder`; after that it is read-only.

pub mod identity;
pub mod registry;

pub use identity::CapabilityKind;
pub use registry::{Capability, CapabilityRegistry, Factory};
