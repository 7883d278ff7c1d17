//! Chunk surface extraction
//!
//! Emits one quad per exposed voxel face. Neighbors are sampled inside
//! the owning chunk only, with everything past the chunk boundary
//! treated as empty, so a chunk's mesh is a pure function of that chunk
//! and remeshing never needs neighbor locks. Version counters gate the
//! work: unchanged chunks are skipped outright and selection-only
//! changes rewrite one vertex channel in place.

use crate::core::types::IVec3;
use crate::voxel::chunk::Chunk;
use super::atlas::{AtlasMap, UvRect};

/// CPU-side vertex and index buffers for one chunk
#[derive(Clone, Debug, Default)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub occlusion: Vec<f32>,
    pub selection: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.uvs.clear();
        self.occlusion.clear();
        self.selection.clear();
        self.indices.clear();
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of emitted quads
    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }
}

/// What an update call did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshUpdate {
    /// Inputs identical to the cached mesh, nothing touched
    Unchanged,
    /// Only selection scalars rewritten
    SelectionOnly,
    /// Full geometry rebuild
    Rebuilt,
}

/// One cube face: outward normal, lower-left corner, and tangent axes.
///
/// Corner order is (ll, lr, ul, ur) with u and v chosen so the two
/// triangles wind counter-clockwise seen from outside.
struct FaceDef {
    normal: IVec3,
    origin: IVec3,
    u_axis: IVec3,
    v_axis: IVec3,
}

const FACES: [FaceDef; 6] = [
    FaceDef {
        normal: IVec3::new(1, 0, 0),
        origin: IVec3::new(1, 0, 1),
        u_axis: IVec3::new(0, 0, -1),
        v_axis: IVec3::new(0, 1, 0),
    },
    FaceDef {
        normal: IVec3::new(-1, 0, 0),
        origin: IVec3::new(0, 0, 0),
        u_axis: IVec3::new(0, 0, 1),
        v_axis: IVec3::new(0, 1, 0),
    },
    FaceDef {
        normal: IVec3::new(0, 1, 0),
        origin: IVec3::new(0, 1, 0),
        u_axis: IVec3::new(0, 0, 1),
        v_axis: IVec3::new(1, 0, 0),
    },
    FaceDef {
        normal: IVec3::new(0, -1, 0),
        origin: IVec3::new(0, 0, 1),
        u_axis: IVec3::new(0, 0, -1),
        v_axis: IVec3::new(1, 0, 0),
    },
    FaceDef {
        normal: IVec3::new(0, 0, 1),
        origin: IVec3::new(0, 0, 1),
        u_axis: IVec3::new(1, 0, 0),
        v_axis: IVec3::new(0, 1, 0),
    },
    FaceDef {
        normal: IVec3::new(0, 0, -1),
        origin: IVec3::new(1, 0, 0),
        u_axis: IVec3::new(-1, 0, 0),
        v_axis: IVec3::new(0, 1, 0),
    },
];

/// Incremental mesh builder for a single chunk
pub struct ChunkMesher {
    buffers: MeshBuffers,
    /// Owning cell of each emitted quad, for selection rewrites
    face_cells: Vec<IVec3>,
    ao_strength: f32,
    last_data_version: Option<u64>,
    last_selection_version: Option<u64>,
    last_atlas_id: Option<u64>,
}

impl ChunkMesher {
    /// Create a mesher; `ao_strength` is the darkening per occluder
    pub fn new(ao_strength: f32) -> Self {
        Self {
            buffers: MeshBuffers::default(),
            face_cells: Vec::new(),
            ao_strength,
            last_data_version: None,
            last_selection_version: None,
            last_atlas_id: None,
        }
    }

    /// Access the built buffers
    pub fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    /// Bring the mesh up to date with the chunk, doing the least work
    /// the version counters allow
    pub fn update(&mut self, chunk: &Chunk, atlas: &AtlasMap) -> MeshUpdate {
        let data_current = self.last_data_version == Some(chunk.data_version())
            && self.last_atlas_id == Some(atlas.id());
        let selection_current = self.last_selection_version == Some(chunk.selection_version());

        if data_current && selection_current {
            return MeshUpdate::Unchanged;
        }
        if data_current {
            self.rewrite_selection(chunk);
            self.last_selection_version = Some(chunk.selection_version());
            return MeshUpdate::SelectionOnly;
        }

        self.rebuild(chunk, atlas);
        self.last_data_version = Some(chunk.data_version());
        self.last_selection_version = Some(chunk.selection_version());
        self.last_atlas_id = Some(atlas.id());
        MeshUpdate::Rebuilt
    }

    fn rebuild(&mut self, chunk: &Chunk, atlas: &AtlasMap) {
        self.buffers.clear();
        self.face_cells.clear();

        for (cell, v) in chunk.voxels().cells() {
            if !v.is_visible() {
                continue;
            }
            let rect = atlas.uv_rect(v.block_type());
            for face in &FACES {
                if chunk.get(cell + face.normal).is_visible() {
                    continue;
                }
                self.emit_quad(chunk, cell, face, rect);
            }
        }
    }

    fn emit_quad(&mut self, chunk: &Chunk, cell: IVec3, face: &FaceDef, rect: UvRect) {
        let base = self.buffers.positions.len() as u32;
        let normal = face.normal.as_vec3().to_array();
        let selected = if chunk.is_selected(cell) { 1.0 } else { 0.0 };

        for (uo, vo) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            let corner = cell + face.origin + face.u_axis * uo + face.v_axis * vo;
            self.buffers.positions.push(corner.as_vec3().to_array());
            self.buffers.normals.push(normal);
            self.buffers.uvs.push([
                rect.u0 + (rect.u1 - rect.u0) * uo as f32,
                rect.v0 + (rect.v1 - rect.v0) * vo as f32,
            ]);
            let occ = corner_occlusion(chunk, cell, face, uo, vo, self.ao_strength);
            self.buffers.occlusion.push(occ);
            self.buffers.selection.push(selected);
        }

        self.buffers
            .indices
            .extend_from_slice(&[base, base + 1, base + 3, base, base + 3, base + 2]);
        self.face_cells.push(cell);
    }

    fn rewrite_selection(&mut self, chunk: &Chunk) {
        for (quad, cell) in self.face_cells.iter().enumerate() {
            let selected = if chunk.is_selected(*cell) { 1.0 } else { 0.0 };
            for corner in 0..4 {
                self.buffers.selection[quad * 4 + corner] = selected;
            }
        }
    }
}

/// Ambient occlusion scalar for one quad corner.
///
/// Samples the three neighbors that share the corner in the layer the
/// face looks into. Two occupied side neighbors count as full occlusion
/// even when the diagonal is open.
fn corner_occlusion(
    chunk: &Chunk,
    cell: IVec3,
    face: &FaceDef,
    uo: i32,
    vo: i32,
    strength: f32,
) -> f32 {
    let above = cell + face.normal;
    let su = if uo == 1 { face.u_axis } else { -face.u_axis };
    let sv = if vo == 1 { face.v_axis } else { -face.v_axis };

    let side1 = chunk.get(above + su).is_visible();
    let side2 = chunk.get(above + sv).is_visible();
    let corner = chunk.get(above + su + sv).is_visible();

    let occ = if side1 && side2 {
        3
    } else {
        side1 as u32 + side2 as u32 + corner as u32
    };
    (1.0 - strength * occ as f32).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UVec3;
    use crate::voxel::chunk::{Chunk, ChunkCoord};
    use crate::voxel::voxel::Voxel;

    fn test_atlas() -> AtlasMap {
        let mut atlas = AtlasMap::new(1, 4, 16, false);
        for t in 1..16 {
            atlas.assign(t, t as u32);
        }
        atlas
    }

    fn chunk_with(cells: &[(IVec3, Voxel)]) -> Chunk {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0), UVec3::splat(16));
        for (pos, v) in cells {
            chunk.set(*pos, *v);
        }
        chunk
    }

    #[test]
    fn test_single_voxel_cube() {
        let chunk = chunk_with(&[(IVec3::new(4, 4, 4), Voxel::new(2))]);
        let mut mesher = ChunkMesher::new(0.25);
        assert_eq!(mesher.update(&chunk, &test_atlas()), MeshUpdate::Rebuilt);

        let buffers = mesher.buffers();
        assert_eq!(buffers.quad_count(), 6);
        assert_eq!(buffers.vertex_count(), 24);
        assert_eq!(buffers.indices.len(), 36);
        // No neighbors anywhere, so no corner is occluded
        assert!(buffers.occlusion.iter().all(|&o| o == 1.0));
        assert!(buffers.selection.iter().all(|&s| s == 0.0));
        // All positions on the unit cube around the cell
        for p in &buffers.positions {
            assert!(p[0] == 4.0 || p[0] == 5.0);
            assert!(p[1] == 4.0 || p[1] == 5.0);
            assert!(p[2] == 4.0 || p[2] == 5.0);
        }
    }

    #[test]
    fn test_shared_faces_hidden() {
        let chunk = chunk_with(&[
            (IVec3::new(4, 4, 4), Voxel::new(1)),
            (IVec3::new(5, 4, 4), Voxel::new(1)),
        ]);
        let mut mesher = ChunkMesher::new(0.25);
        mesher.update(&chunk, &test_atlas());
        // Two cubes share one interior face pair
        assert_eq!(mesher.buffers().quad_count(), 10);
    }

    #[test]
    fn test_ghost_voxels_render() {
        let chunk = chunk_with(&[(IVec3::new(4, 4, 4), Voxel::new(1).as_ghost())]);
        let mut mesher = ChunkMesher::new(0.25);
        mesher.update(&chunk, &test_atlas());
        assert_eq!(mesher.buffers().quad_count(), 6);
    }

    #[test]
    fn test_chunk_boundary_faces_emitted() {
        // Voxel on the chunk's low corner still gets all six faces
        let chunk = chunk_with(&[(IVec3::new(0, 0, 0), Voxel::new(1))]);
        let mut mesher = ChunkMesher::new(0.25);
        mesher.update(&chunk, &test_atlas());
        assert_eq!(mesher.buffers().quad_count(), 6);
    }

    #[test]
    fn test_uvs_inside_atlas_rect() {
        let chunk = chunk_with(&[(IVec3::new(4, 4, 4), Voxel::new(2))]);
        let atlas = test_atlas();
        let mut mesher = ChunkMesher::new(0.25);
        mesher.update(&chunk, &atlas);

        let rect = atlas.uv_rect(2);
        for uv in &mesher.buffers().uvs {
            assert!(uv[0] >= rect.u0 - 1e-6 && uv[0] <= rect.u1 + 1e-6);
            assert!(uv[1] >= rect.v0 - 1e-6 && uv[1] <= rect.v1 + 1e-6);
        }
    }

    #[test]
    fn test_diagonal_neighbor_darkens_corner() {
        let chunk = chunk_with(&[
            (IVec3::new(0, 0, 0), Voxel::new(1)),
            (IVec3::new(1, 1, 0), Voxel::new(1)),
        ]);
        let mut mesher = ChunkMesher::new(0.25);
        mesher.update(&chunk, &test_atlas());

        // Find the top (+y) face of the cell at the origin
        let buffers = mesher.buffers();
        let mut checked = false;
        for quad in 0..buffers.quad_count() {
            let n = buffers.normals[quad * 4];
            let p = buffers.positions[quad * 4];
            if n == [0.0, 1.0, 0.0] && p[1] == 1.0 && p[0] < 1.5 {
                let occ: Vec<f32> = (0..4).map(|c| buffers.occlusion[quad * 4 + c]).collect();
                // Two corners touch the neighbor at (1,1,0), two do not
                assert_eq!(occ.iter().filter(|&&o| o == 0.75).count(), 2);
                assert_eq!(occ.iter().filter(|&&o| o == 1.0).count(), 2);
                checked = true;
            }
        }
        assert!(checked);
    }

    #[test]
    fn test_unchanged_inputs_skip_work() {
        let chunk = chunk_with(&[(IVec3::new(4, 4, 4), Voxel::new(2))]);
        let atlas = test_atlas();
        let mut mesher = ChunkMesher::new(0.25);
        assert_eq!(mesher.update(&chunk, &atlas), MeshUpdate::Rebuilt);
        assert_eq!(mesher.update(&chunk, &atlas), MeshUpdate::Unchanged);
    }

    #[test]
    fn test_selection_only_fast_path() {
        let mut chunk = chunk_with(&[(IVec3::new(4, 4, 4), Voxel::new(2))]);
        let atlas = test_atlas();
        let mut mesher = ChunkMesher::new(0.25);
        mesher.update(&chunk, &atlas);
        let positions_before = mesher.buffers().positions.clone();

        chunk.set_selected(IVec3::new(4, 4, 4), true);
        assert_eq!(mesher.update(&chunk, &atlas), MeshUpdate::SelectionOnly);
        assert_eq!(mesher.buffers().positions, positions_before);
        assert!(mesher.buffers().selection.iter().all(|&s| s == 1.0));

        chunk.set_selected(IVec3::new(4, 4, 4), false);
        assert_eq!(mesher.update(&chunk, &atlas), MeshUpdate::SelectionOnly);
        assert!(mesher.buffers().selection.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_data_change_forces_rebuild() {
        let mut chunk = chunk_with(&[(IVec3::new(4, 4, 4), Voxel::new(2))]);
        let atlas = test_atlas();
        let mut mesher = ChunkMesher::new(0.25);
        mesher.update(&chunk, &atlas);

        chunk.set(IVec3::new(6, 4, 4), Voxel::new(3));
        assert_eq!(mesher.update(&chunk, &atlas), MeshUpdate::Rebuilt);
        assert_eq!(mesher.buffers().quad_count(), 12);
    }

    #[test]
    fn test_atlas_change_forces_rebuild() {
        let chunk = chunk_with(&[(IVec3::new(4, 4, 4), Voxel::new(2))]);
        let mut mesher = ChunkMesher::new(0.25);
        mesher.update(&chunk, &test_atlas());

        let mut other = AtlasMap::new(2, 4, 16, false);
        other.assign(2, 9);
        assert_eq!(mesher.update(&chunk, &other), MeshUpdate::Rebuilt);
    }
}
