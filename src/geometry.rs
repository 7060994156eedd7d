//! Geometry carried between pipeline stages.
//!
//! These are plain data containers. The core never inspects them; concrete
//! capabilities do. They are serde-serializable so meshes and planned tool
//! paths can be exchanged as JSON.

use serde::{Deserialize, Serialize};

pub type Point3 = [f64; 3];

/// Triangle mesh: vertex positions plus faces indexing into them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default)]
    pub vertices: Vec<Point3>,
    #[serde(default)]
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<Point3>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// A single tool pose.
///
/// `orientation` is a unit quaternion stored as `[w, x, y, z]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Point3,
    #[serde(default = "identity_orientation")]
    pub orientation: [f64; 4],
}

impl Waypoint {
    /// Waypoint at `position` with the identity orientation.
    pub fn at(position: Point3) -> Self {
        Self {
            position,
            orientation: identity_orientation(),
        }
    }
}

fn identity_orientation() -> [f64; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

/// Contiguous run of waypoints the tool follows without lifting.
pub type ToolPathSegment = Vec<Waypoint>;

/// One tool path: an ordered list of segments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolPath {
    #[serde(default)]
    pub segments: Vec<ToolPathSegment>,
}

impl ToolPath {
    pub fn new(segments: Vec<ToolPathSegment>) -> Self {
        Self { segments }
    }

    pub fn waypoint_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

/// Ordered sequence of tool paths; the unit planners emit and modifiers refine.
pub type ToolPaths = Vec<ToolPath>;
