//! Curved surface shared by all four layers.
//!
//! A planar grid in surface-local XY, displaced along +Z by a fixed sum of
//! sine/cosine terms to mimic a free-form architectural panel. The same
//! resolution always yields bit-identical buffers.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

pub const SURFACE_WIDTH: f32 = 6.0;
pub const SURFACE_DEPTH: f32 = 4.0;
pub const DEFAULT_SEGMENTS: u32 = 64;
pub const MAX_SEGMENTS: u32 = 256;

const WAVE_X_FREQUENCY: f32 = 0.8;
const WAVE_X_AMPLITUDE: f32 = 0.5;
const WAVE_Y_FREQUENCY: f32 = 0.8;
const WAVE_Y_AMPLITUDE: f32 = 0.3;

/// Out-of-plane displacement at surface-local `(x, y)`.
pub fn surface_height(x: f32, y: f32) -> f32 {
    (x * WAVE_X_FREQUENCY).sin() * WAVE_X_AMPLITUDE + (y * WAVE_Y_FREQUENCY).cos() * WAVE_Y_AMPLITUDE
}

/// CPU-side buffers of the displaced grid, kept for picking after upload.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceGeometry {
    segments: u32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    bounds_min: Vec3,
    bounds_max: Vec3,
}

impl SurfaceGeometry {
    /// Builds a `width × depth` grid with `segments` quads per side.
    pub fn curved(width: f32, depth: f32, segments: u32) -> Self {
        let segments = segments.clamp(1, MAX_SEGMENTS);
        let columns = segments + 1;
        let half_width = width / 2.0;
        let half_depth = depth / 2.0;
        let step_x = width / segments as f32;
        let step_y = depth / segments as f32;

        let vertex_count = (columns * columns) as usize;
        let mut positions = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);

        // Rows run from +Y to -Y so triangles wind counter-clockwise seen from +Z.
        for iy in 0..columns {
            let y = half_depth - iy as f32 * step_y;
            for ix in 0..columns {
                let x = ix as f32 * step_x - half_width;
                positions.push(Vec3::new(x, y, surface_height(x, y)));
                uvs.push([
                    ix as f32 / segments as f32,
                    1.0 - iy as f32 / segments as f32,
                ]);
            }
        }

        let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
        for iy in 0..segments {
            for ix in 0..segments {
                let a = ix + columns * iy;
                let b = ix + columns * (iy + 1);
                let c = (ix + 1) + columns * (iy + 1);
                let d = (ix + 1) + columns * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let normals = vertex_normals(&positions, &indices);

        let (bounds_min, bounds_max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Self {
            segments,
            positions,
            normals,
            uvs,
            indices,
            bounds_min,
            bounds_max,
        }
    }

    pub fn with_segments(segments: u32) -> Self {
        Self::curved(SURFACE_WIDTH, SURFACE_DEPTH, segments)
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Local-space axis-aligned bounds `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min, self.bounds_max)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    /// Uploadable Bevy mesh with positions, normals, UVs and indices.
    pub fn to_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.positions.iter().map(|p| p.to_array()).collect();
        let normals: Vec<[f32; 3]> = self.normals.iter().map(|n| n.to_array()).collect();
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs.clone())
        .with_inserted_indices(Indices::U32(self.indices.clone()))
    }
}

/// Area-weighted vertex normals: each face adds its unnormalized normal to its corners.
fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[c] - positions[b]).cross(positions[a] - positions[b]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Z))
        .collect()
}
