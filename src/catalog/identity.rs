use std::fmt;

/// Which stage contract a registry entry satisfies.
///
/// Names are unique per kind only: the same name may be registered once as a
/// mesh modifier and once as a tool path modifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CapabilityKind {
    MeshModifier,
    ToolPathPlanner,
    ToolPathModifier,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 3] = [
        CapabilityKind::MeshModifier,
        CapabilityKind::ToolPathPlanner,
        CapabilityKind::ToolPathModifier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::MeshModifier => "mesh_modifier",
            CapabilityKind::ToolPathPlanner => "tool_path_planner",
            CapabilityKind::ToolPathModifier => "tool_path_modifier",
        }
    }

    /// Human label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            CapabilityKind::MeshModifier => "mesh modifier",
            CapabilityKind::ToolPathPlanner => "tool path planner",
            CapabilityKind::ToolPathModifier => "tool path modifier",
        }
    }

    /// Parse a kind from its canonical id or a CLI-friendly alias
    /// (`mesh-modifiers`, `planners`, `tool-path-modifiers`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().replace('-', "_");
        match normalized.as_str() {
            "mesh_modifier" | "mesh_modifiers" => Some(CapabilityKind::MeshModifier),
            "tool_path_planner" | "tool_path_planners" | "planner" | "planners" => {
                Some(CapabilityKind::ToolPathPlanner)
            }
            "tool_path_modifier" | "tool_path_modifiers" => {
                Some(CapabilityKind::ToolPathModifier)
            }
            _ => None,
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
