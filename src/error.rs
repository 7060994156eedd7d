//! Error types shared by the registry, codec, builder and pipeline.
//!
//! `PipelineError` carries the structural failures the core detects on its own
//! (unknown names, a missing planner) and wraps everything else with the
//! document section and entry position it came from. The wrapped error stays
//! reachable through `std::error::Error::source`, so callers keep both the
//! original failure kind and where it happened.

use crate::catalog::CapabilityKind;
use std::fmt;
use thiserror::Error;

/// One of the three top-level sections of a pipeline document, which are also
/// the three stages of a running pipeline.
///
/// Ordered the way a document is decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    MeshModifiers,
    ToolPathPlanner,
    ToolPathModifiers,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::MeshModifiers,
        Section::ToolPathPlanner,
        Section::ToolPathModifiers,
    ];

    /// Document key holding this section.
    pub fn key(self) -> &'static str {
        match self {
            Section::MeshModifiers => "mesh_modifiers",
            Section::ToolPathPlanner => "tool_path_planner",
            Section::ToolPathModifiers => "tool_path_modifiers",
        }
    }

    /// The section stored under document key `key`, if any.
    pub fn from_key(key: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|section| section.key() == key)
    }

    /// Capability kind resolved for entries of this section.
    pub fn kind(self) -> CapabilityKind {
        match self {
            Section::MeshModifiers => CapabilityKind::MeshModifier,
            Section::ToolPathPlanner => CapabilityKind::ToolPathPlanner,
            Section::ToolPathModifiers => CapabilityKind::ToolPathModifier,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Failure reported by a concrete capability, either while decoding its
/// parameter block or while processing geometry.
///
/// The core treats the message as opaque; it only prefixes context.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CapabilityError {
    message: String,
}

impl CapabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A parameter was missing or could not be interpreted.
    pub fn invalid_parameter(parameter: &str, reason: impl fmt::Display) -> Self {
        Self::new(format!("invalid parameter '{parameter}': {reason}"))
    }

    /// Prefix the message with where the failure happened.
    pub fn context(self, context: impl fmt::Display) -> Self {
        Self::new(format!("{context}: {}", self.message))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for CapabilityError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown {kind} '{name}'")]
    UnknownCapability { kind: CapabilityKind, name: String },

    #[error("tool path planner entry is missing a 'name'")]
    MissingPlannerName,

    #[error("no tool path planner selected")]
    NoPlannerSelected,

    #[error("{kind} '{name}' is already registered")]
    DuplicateCapability { kind: CapabilityKind, name: String },

    #[error("cannot register a {kind} under an empty name")]
    EmptyCapabilityName { kind: CapabilityKind },

    #[error("invalid pipeline document: {message}")]
    InvalidDocument { message: String },

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// Context wrapper naming the section (and list position) that failed.
    #[error("failed at {section}{}", format_index(.index))]
    Section {
        section: Section,
        index: Option<usize>,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_index(index: &Option<usize>) -> String {
    index.map(|idx| format!("[{idx}]")).unwrap_or_default()
}

impl PipelineError {
    pub(crate) fn invalid_document(message: impl Into<String>) -> Self {
        PipelineError::InvalidDocument {
            message: message.into(),
        }
    }

    /// Wrap the error with the section (and optional entry index) it came from.
    pub fn in_section(self, section: Section, index: Option<usize>) -> Self {
        PipelineError::Section {
            section,
            index,
            source: Box::new(self),
        }
    }

    /// The innermost error, with every section wrapper peeled off.
    pub fn root_cause(&self) -> &PipelineError {
        let mut current = self;
        while let PipelineError::Section { source, .. } = current {
            current = source;
        }
        current
    }

    /// The outermost section context, if any.
    pub fn section(&self) -> Option<(Section, Option<usize>)> {
        match self {
            PipelineError::Section { section, index, .. } => Some((*section, *index)),
            _ => None,
        }
    }

    /// Full `outer: inner` message, for surfaces that only show one string.
    pub fn chain_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}
