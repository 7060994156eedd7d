#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use tpp_pipeline::{
    CapabilityError, CapabilityRegistry, Mesh, MeshModifier, Parameters, ToolPath, ToolPathModifier,
    ToolPathPlanner, ToolPaths, Waypoint, builtins,
};

/// Splits a mesh into `parts` copies, appending a marker vertex `[id, part, 0]`
/// to each so the order of the fan-out shows up in planned paths.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitModifier {
    pub id: f64,
    #[serde(default = "default_parts")]
    pub parts: usize,
}

fn default_parts() -> usize {
    2
}

impl MeshModifier for SplitModifier {
    fn modify(&self, mesh: &Mesh) -> Result<Vec<Mesh>, CapabilityError> {
        Ok((0..self.parts)
            .map(|part| {
                let mut out = mesh.clone();
                out.vertices.push([self.id, part as f64, 0.0]);
                out
            })
            .collect())
    }

    fn parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("id".to_string(), json!(self.id));
        parameters.insert("parts".to_string(), json!(self.parts));
        parameters
    }
}

/// Fails on every mesh.
pub struct FailingModifier;

impl MeshModifier for FailingModifier {
    fn modify(&self, _mesh: &Mesh) -> Result<Vec<Mesh>, CapabilityError> {
        Err(CapabilityError::new("mesh is not manifold"))
    }
}

/// One single-waypoint path per mesh vertex, in vertex order.
pub struct VertexPlanner;

impl ToolPathPlanner for VertexPlanner {
    fn plan(&self, mesh: &Mesh) -> Result<ToolPaths, CapabilityError> {
        Ok(mesh
            .vertices
            .iter()
            .map(|vertex| ToolPath::new(vec![vec![Waypoint::at(*vertex)]]))
            .collect())
    }
}

/// Rejects meshes with fewer than `min_vertices` vertices.
pub struct PickyPlanner {
    pub min_vertices: usize,
}

impl ToolPathPlanner for PickyPlanner {
    fn plan(&self, mesh: &Mesh) -> Result<ToolPaths, CapabilityError> {
        if mesh.vertices.len() < self.min_vertices {
            return Err(CapabilityError::new(format!(
                "need at least {} vertices, got {}",
                self.min_vertices,
                mesh.vertices.len()
            )));
        }
        VertexPlanner.plan(mesh)
    }

    fn parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("min_vertices".to_string(), json!(self.min_vertices));
        parameters
    }
}

/// Appends one path at `[marker, 0, 0]`.
pub struct AppendMarker {
    pub marker: f64,
}

impl ToolPathModifier for AppendMarker {
    fn modify(&self, mut tool_paths: ToolPaths) -> Result<ToolPaths, CapabilityError> {
        tool_paths.push(ToolPath::new(vec![vec![Waypoint::at([self.marker, 0.0, 0.0])]]));
        Ok(tool_paths)
    }

    fn parameters(&self) -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("marker".to_string(), json!(self.marker));
        parameters
    }
}

fn required_f64(parameters: &Parameters, key: &str) -> Result<f64, CapabilityError> {
    parameters
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| CapabilityError::invalid_parameter(key, "expected a number"))
}

/// Built-ins plus the test capabilities above.
pub fn test_registry() -> CapabilityRegistry {
    let mut registry = builtins::default_registry().expect("builtins register cleanly");
    registry
        .register_mesh_modifier("split", |params: &Parameters| {
            Ok(serde_json::from_value::<SplitModifier>(Value::Object(params.clone()))?)
        })
        .expect("register split");
    registry
        .register_mesh_modifier("failing", |_| Ok(FailingModifier))
        .expect("register failing");
    registry
        .register_planner("vertices", |_| Ok(VertexPlanner))
        .expect("register vertices");
    registry
        .register_planner("picky", |params: &Parameters| {
            let min_vertices = required_f64(params, "min_vertices")? as usize;
            Ok(PickyPlanner { min_vertices })
        })
        .expect("register picky");
    registry
        .register_tool_path_modifier("append_marker", |params: &Parameters| {
            Ok(AppendMarker {
                marker: required_f64(params, "marker")?,
            })
        })
        .expect("register append_marker");
    registry
}

pub fn shared_registry() -> Arc<CapabilityRegistry> {
    Arc::new(test_registry())
}

/// A single triangle.
pub fn triangle() -> Mesh {
    Mesh::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![[0, 1, 2]],
    )
}

/// First-waypoint x coordinate of every path, for compact order assertions.
pub fn path_xs(tool_paths: &ToolPaths) -> Vec<f64> {
    tool_paths
        .iter()
        .map(|path| path.segments[0][0].position[0])
        .collect()
}

pub fn cli_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tpp-pipeline"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    std::fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}
