//! Native STL reading and printability checks.
//!
//! A mesh passes when it is watertight (every edge shared by exactly two
//! triangles), consistently wound (those two triangles traverse the edge in
//! opposite directions) and encloses a positive signed volume.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ToolchainError;

const BINARY_HEADER_LEN: usize = 80;
const BINARY_TRIANGLE_LEN: usize = 50;

/// A vertex position.
pub type Vertex = [f32; 3];
/// Three vertices in facet order.
pub type Triangle = [Vertex; 3];

/// Outcome of checking a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshReport {
    /// Non-degenerate triangles after welding.
    pub triangles: usize,
    /// Distinct vertices after welding.
    pub vertices: usize,
    /// Signed volume in cubic model units.
    pub volume: f64,
    /// Every edge is shared by exactly two triangles.
    pub watertight: bool,
    /// Shared edges are traversed in opposite directions.
    pub winding_consistent: bool,
}

impl MeshReport {
    /// Whether the mesh is printable.
    pub fn is_valid(&self) -> bool {
        self.issues().is_empty()
    }

    /// Human-readable list of failed checks.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.winding_consistent {
            issues.push("inconsistent winding".to_string());
        }
        if !self.watertight {
            issues.push("not watertight".to_string());
        }
        if self.volume <= 0.0 {
            issues.push("no volume".to_string());
        }
        issues
    }
}

/// Read an STL file and check it.
pub fn inspect_file(path: &Path) -> Result<MeshReport, ToolchainError> {
    let data = std::fs::read(path)?;
    let triangles = parse_stl(&data)?;
    Ok(inspect(&triangles))
}

/// Parse ASCII or binary STL.
pub fn parse_stl(data: &[u8]) -> Result<Vec<Triangle>, ToolchainError> {
    if data.len() >= BINARY_HEADER_LEN + 4 {
        let count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
        let expected = count
            .checked_mul(BINARY_TRIANGLE_LEN)
            .and_then(|n| n.checked_add(BINARY_HEADER_LEN + 4));
        if expected == Some(data.len()) {
            return Ok(parse_binary(&data[BINARY_HEADER_LEN + 4..], count));
        }
    }

    let head = &data[..data.len().min(512)];
    let text_head = String::from_utf8_lossy(head);
    if text_head.trim_start().starts_with("solid") {
        let text = std::str::from_utf8(data)
            .map_err(|_| ToolchainError::MeshParse("ASCII STL is not valid UTF-8".to_string()))?;
        return parse_ascii(text);
    }

    Err(ToolchainError::MeshParse(
        "not a binary or ASCII STL file".to_string(),
    ))
}

fn parse_binary(body: &[u8], count: usize) -> Vec<Triangle> {
    let read_f32 = |offset: usize| {
        f32::from_le_bytes([
            body[offset],
            body[offset + 1],
            body[offset + 2],
            body[offset + 3],
        ])
    };

    (0..count)
        .map(|i| {
            // Skip the 12-byte facet normal.
            let base = i * BINARY_TRIANGLE_LEN + 12;
            let mut tri = [[0.0f32; 3]; 3];
            for (v, vertex) in tri.iter_mut().enumerate() {
                for (c, coord) in vertex.iter_mut().enumerate() {
                    *coord = read_f32(base + v * 12 + c * 4);
                }
            }
            tri
        })
        .collect()
}

fn parse_ascii(text: &str) -> Result<Vec<Triangle>, ToolchainError> {
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut tokens = text.split_whitespace();

    while let Some(token) = tokens.next() {
        if token != "vertex" {
            continue;
        }
        let mut vertex = [0.0f32; 3];
        for coord in &mut vertex {
            let raw = tokens
                .next()
                .ok_or_else(|| ToolchainError::MeshParse("truncated vertex".to_string()))?;
            *coord = raw
                .parse()
                .map_err(|_| ToolchainError::MeshParse(format!("bad coordinate '{raw}'")))?;
        }
        vertices.push(vertex);
    }

    if vertices.len() % 3 != 0 {
        return Err(ToolchainError::MeshParse(format!(
            "{} vertices do not form whole triangles",
            vertices.len()
        )));
    }

    Ok(vertices
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect())
}

/// Weld vertices by exact coordinates and run the integrity checks.
pub fn inspect(triangles: &[Triangle]) -> MeshReport {
    let mut index: HashMap<[u32; 3], usize> = HashMap::new();
    let mut positions: Vec<[f64; 3]> = Vec::new();
    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(triangles.len());

    for tri in triangles {
        let mut face = [0usize; 3];
        for (slot, vertex) in face.iter_mut().zip(tri.iter()) {
            let key = vertex_key(vertex);
            *slot = *index.entry(key).or_insert_with(|| {
                positions.push([vertex[0] as f64, vertex[1] as f64, vertex[2] as f64]);
                positions.len() - 1
            });
        }
        if face[0] != face[1] && face[1] != face[2] && face[0] != face[2] {
            faces.push(face);
        }
    }

    // Undirected edge -> (uses, net direction). Forward traversal (low -> high)
    // counts +1, backward -1.
    let mut edges: HashMap<(usize, usize), (u32, i32)> = HashMap::new();
    for face in &faces {
        for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
            let (key, dir) = if a < b { ((a, b), 1) } else { ((b, a), -1) };
            let entry = edges.entry(key).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += dir;
        }
    }

    let watertight = !faces.is_empty() && edges.values().all(|(uses, _)| *uses == 2);
    let winding_consistent = edges
        .values()
        .filter(|(uses, _)| *uses == 2)
        .all(|(_, net)| *net == 0);

    let volume = faces
        .iter()
        .map(|f| {
            let (a, b, c) = (positions[f[0]], positions[f[1]], positions[f[2]]);
            dot(a, cross(b, c)) / 6.0
        })
        .sum();

    MeshReport {
        triangles: faces.len(),
        vertices: positions.len(),
        volume,
        watertight,
        winding_consistent,
    }
}

fn vertex_key(v: &Vertex) -> [u32; 3] {
    // Fold -0.0 into 0.0 so mirrored coordinates weld.
    v.map(|c| if c == 0.0 { 0.0f32.to_bits() } else { c.to_bits() })
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
