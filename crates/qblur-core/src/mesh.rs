//! Triangle meshes as sample grids
//!
//! Each vertex is an item with three slots (x, y, z). Three slots round up
//! to a slot width of four, so every vertex owns one padding amplitude that
//! encodes to zero.

use serde::{Deserialize, Serialize};

use crate::codec::{SampleSink, SampleSource};
use crate::effects::Effect;
use crate::error::Result;
use crate::simulator::StateVectorSimulator;
use crate::transform::transform_in_place;

/// Minimal mesh: positions plus the topology and texture coordinates that a
/// blur carries over unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
    pub uvs: Vec<[f64; 2]>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<[f64; 3]>) -> Self {
        Self {
            name: name.into(),
            vertices,
            ..Default::default()
        }
    }

    pub fn with_triangles(mut self, triangles: Vec<[u32; 3]>) -> Self {
        self.triangles = triangles;
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<[f64; 2]>) -> Self {
        self.uvs = uvs;
        self
    }

    /// Axis-aligned grid of `columns` by `rows` vertices in the z = 0 plane,
    /// two triangles per cell, uvs spanning `[0, 1]`.
    pub fn plane(name: impl Into<String>, columns: u32, rows: u32, size: f64) -> Self {
        let mut vertices = Vec::with_capacity((columns * rows) as usize);
        let mut uvs = Vec::with_capacity(vertices.capacity());
        let u_step = 1.0 / f64::from(columns.saturating_sub(1).max(1));
        let v_step = 1.0 / f64::from(rows.saturating_sub(1).max(1));
        for row in 0..rows {
            for column in 0..columns {
                let (u, v) = (f64::from(column) * u_step, f64::from(row) * v_step);
                vertices.push([(u - 0.5) * size, (v - 0.5) * size, 0.0]);
                uvs.push([u, v]);
            }
        }

        let mut triangles = Vec::new();
        for row in 0..rows.saturating_sub(1) {
            for column in 0..columns.saturating_sub(1) {
                let i = row * columns + column;
                triangles.push([i, i + columns, i + 1]);
                triangles.push([i + 1, i + columns, i + columns + 1]);
            }
        }

        Self {
            name: name.into(),
            vertices,
            triangles,
            uvs,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Name a blurred copy of this mesh gets
    pub fn blurred_name(&self) -> String {
        format!("{} blurred", self.name)
    }
}

impl SampleSource for Mesh {
    fn item_count(&self) -> usize {
        self.vertices.len()
    }

    fn slot_count(&self) -> usize {
        3
    }

    fn sample(&self, item: usize, slot: usize) -> f64 {
        self.vertices[item][slot]
    }
}

impl SampleSink for Mesh {
    fn set_sample(&mut self, item: usize, slot: usize, value: f64) {
        self.vertices[item][slot] = value;
    }
}

/// Copy of `mesh` with its vertex positions run through `effect`.
pub fn transform_mesh(mesh: &Mesh, effect: &Effect, max_qubits: u32) -> Result<Mesh> {
    let mut output = Mesh {
        name: mesh.blurred_name(),
        ..mesh.clone()
    };
    transform_in_place::<StateVectorSimulator, _>(&mut output, effect, max_qubits)?;
    tracing::debug!(name = %output.name, vertices = output.vertex_count(), "mesh transformed");
    Ok(output)
}

/// Copy of `mesh` blurred by `angle`, named `"<name> blurred"`.
///
/// ```
/// use qblur_core::mesh::{blur_mesh, Mesh};
///
/// let quad = Mesh::plane("quad", 2, 2, 1.0);
/// let blurred = blur_mesh(&quad, 0.1, 24).unwrap();
/// assert_eq!(blurred.name, "quad blurred");
/// assert_eq!(blurred.triangles, quad.triangles);
/// ```
pub fn blur_mesh(mesh: &Mesh, angle: f64, max_qubits: u32) -> Result<Mesh> {
    transform_mesh(mesh, &Effect::blur(angle), max_qubits)
}
