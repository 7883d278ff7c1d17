//! Sparse voxel octree mirror of a voxel volume

use crate::core::types::{IVec3, UVec3};
use crate::math::GridBounds;
use super::store::ChunkStore;
use super::voxel::Voxel;

/// Octree node: a uniform leaf or eight children
///
/// Child octant index packs the axis halves as bit 0 = x, bit 1 = y,
/// bit 2 = z.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Node {
    Leaf(Voxel),
    Internal(Box<[Node; 8]>),
}

/// Sparse voxel octree over a power-of-two cube
///
/// The root cube is the smallest power of two covering the logical
/// dimensions; cells in the padding stay empty because writes are
/// clipped. Uniform subtrees collapse back into single leaves on write,
/// so memory tracks occupied complexity rather than volume.
#[derive(Clone, Debug)]
pub struct SparseVoxelOctree {
    root: Node,
    size: u32,
    dims: UVec3,
    version: u64,
}

impl SparseVoxelOctree {
    /// Create an empty octree for the given logical dimensions
    pub fn new(dims: UVec3) -> Self {
        let size = dims.x.max(dims.y).max(dims.z).max(1).next_power_of_two();
        Self {
            root: Node::Leaf(Voxel::EMPTY),
            size,
            dims,
            version: 0,
        }
    }

    /// Build an octree mirroring a chunk store's contents
    pub fn from_store(store: &ChunkStore) -> Self {
        let mut tree = Self::new(store.dims());
        for chunk in store.chunks() {
            for (pos, v) in chunk.voxels().iter_non_empty() {
                tree.set(pos, v);
            }
        }
        tree
    }

    /// Get the logical dimensions
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Get the root cube side length
    pub fn root_size(&self) -> u32 {
        self.size
    }

    /// Version counter, bumped on every mutating write
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if a position is inside the logical dimensions
    pub fn contains(&self, pos: IVec3) -> bool {
        GridBounds::from_min_size(IVec3::ZERO, self.dims).contains(pos)
    }

    /// Read a voxel; out-of-range positions read as empty
    pub fn get(&self, pos: IVec3) -> Voxel {
        if !self.contains(pos) {
            return Voxel::EMPTY;
        }
        let mut node = &self.root;
        let mut size = self.size;
        let mut origin = IVec3::ZERO;
        loop {
            match node {
                Node::Leaf(v) => return *v,
                Node::Internal(children) => {
                    let half = (size / 2) as i32;
                    let idx = octant_index(pos, origin, half);
                    origin += octant_offset(idx, half);
                    node = &children[idx];
                    size /= 2;
                }
            }
        }
    }

    /// Write a voxel; out-of-range positions are a no-op.
    ///
    /// Returns true and bumps the version if the stored value changed.
    /// Leaves split on divergent writes and uniform subtrees collapse.
    pub fn set(&mut self, pos: IVec3, v: Voxel) -> bool {
        if !self.contains(pos) {
            return false;
        }
        let changed = set_in(&mut self.root, IVec3::ZERO, self.size, pos, v);
        if changed {
            self.version += 1;
        }
        changed
    }

    /// Fill every cell inside the logical dimensions with one value.
    ///
    /// The padding between the dimensions and the root cube stays empty,
    /// so region visits never report cells outside the grid. Returns true
    /// and bumps the version if at least one cell changed.
    pub fn fill(&mut self, v: Voxel) -> bool {
        let bounds = GridBounds::from_min_size(IVec3::ZERO, self.dims);
        let changed = fill_in(&mut self.root, IVec3::ZERO, self.size, bounds, v);
        if changed {
            self.version += 1;
        }
        changed
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        if self.root != Node::Leaf(Voxel::EMPTY) {
            self.root = Node::Leaf(Voxel::EMPTY);
            self.version += 1;
        }
    }

    /// Check if every cell is empty
    pub fn is_all_empty(&self) -> bool {
        !self.any_value(|v| !v.is_empty())
    }

    /// Test a predicate against every distinct stored value (air included)
    pub fn any_value(&self, pred: impl Fn(Voxel) -> bool) -> bool {
        any_in(&self.root, &pred)
    }

    /// Count non-empty cells
    pub fn count_non_empty(&self) -> usize {
        let mut count = 0usize;
        self.for_each_region(&mut |bounds, _| count += bounds.volume());
        count
    }

    /// Visit every uniform non-empty region as (bounds, value)
    pub fn for_each_region(&self, f: &mut impl FnMut(GridBounds, Voxel)) {
        visit_regions(&self.root, IVec3::ZERO, self.size, f);
    }

    /// Visit every non-empty cell as (position, value)
    pub fn for_each_voxel(&self, mut f: impl FnMut(IVec3, Voxel)) {
        self.for_each_region(&mut |bounds, v| {
            for pos in bounds.iter() {
                f(pos, v);
            }
        });
    }

    /// Total node count, for inspecting collapse behavior
    pub fn node_count(&self) -> usize {
        count_nodes(&self.root)
    }
}

fn octant_index(pos: IVec3, origin: IVec3, half: i32) -> usize {
    let local = pos - origin;
    ((local.x >= half) as usize)
        | (((local.y >= half) as usize) << 1)
        | (((local.z >= half) as usize) << 2)
}

fn octant_offset(idx: usize, half: i32) -> IVec3 {
    IVec3::new(
        if idx & 1 != 0 { half } else { 0 },
        if idx & 2 != 0 { half } else { 0 },
        if idx & 4 != 0 { half } else { 0 },
    )
}

fn set_in(node: &mut Node, origin: IVec3, size: u32, pos: IVec3, v: Voxel) -> bool {
    match node {
        Node::Leaf(cur) if *cur == v => false,
        Node::Leaf(cur) if size == 1 => {
            *cur = v;
            true
        }
        Node::Leaf(cur) => {
            let fill = *cur;
            *node = Node::Internal(Box::new(std::array::from_fn(|_| Node::Leaf(fill))));
            set_in(node, origin, size, pos, v)
        }
        Node::Internal(children) => {
            let half = (size / 2) as i32;
            let idx = octant_index(pos, origin, half);
            let child_origin = origin + octant_offset(idx, half);
            let changed = set_in(&mut children[idx], child_origin, size / 2, pos, v);
            if changed {
                if let Some(uniform) = uniform_leaf_value(children) {
                    *node = Node::Leaf(uniform);
                }
            }
            changed
        }
    }
}

fn fill_in(node: &mut Node, origin: IVec3, size: u32, bounds: GridBounds, v: Voxel) -> bool {
    let cube = GridBounds::from_min_size(origin, UVec3::splat(size));
    let overlap = cube.intersection(&bounds);
    if overlap.is_empty() {
        return false;
    }
    if overlap == cube {
        if *node == Node::Leaf(v) {
            return false;
        }
        *node = Node::Leaf(v);
        return true;
    }
    // Cube straddles the dims boundary, so only part of it changes
    match node {
        Node::Leaf(cur) if *cur == v => false,
        Node::Leaf(cur) => {
            let fill = *cur;
            *node = Node::Internal(Box::new(std::array::from_fn(|_| Node::Leaf(fill))));
            fill_in(node, origin, size, bounds, v)
        }
        Node::Internal(children) => {
            let half = (size / 2) as i32;
            let mut changed = false;
            for (idx, child) in children.iter_mut().enumerate() {
                changed |= fill_in(child, origin + octant_offset(idx, half), size / 2, bounds, v);
            }
            if changed {
                if let Some(uniform) = uniform_leaf_value(children) {
                    *node = Node::Leaf(uniform);
                }
            }
            changed
        }
    }
}

fn uniform_leaf_value(children: &[Node; 8]) -> Option<Voxel> {
    let first = match &children[0] {
        Node::Leaf(v) => *v,
        Node::Internal(_) => return None,
    };
    for child in &children[1..] {
        match child {
            Node::Leaf(v) if *v == first => {}
            _ => return None,
        }
    }
    Some(first)
}

fn visit_regions(node: &Node, origin: IVec3, size: u32, f: &mut impl FnMut(GridBounds, Voxel)) {
    match node {
        Node::Leaf(v) => {
            if !v.is_empty() {
                f(GridBounds::from_min_size(origin, UVec3::splat(size)), *v);
            }
        }
        Node::Internal(children) => {
            let half = (size / 2) as i32;
            for (idx, child) in children.iter().enumerate() {
                visit_regions(child, origin + octant_offset(idx, half), size / 2, f);
            }
        }
    }
}

fn any_in(node: &Node, pred: &impl Fn(Voxel) -> bool) -> bool {
    match node {
        Node::Leaf(v) => pred(*v),
        Node::Internal(children) => children.iter().any(|c| any_in(c, pred)),
    }
}

fn count_nodes(node: &Node) -> usize {
    match node {
        Node::Leaf(_) => 1,
        Node::Internal(children) => 1 + children.iter().map(count_nodes).sum::<usize>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_size_covers_dims() {
        assert_eq!(SparseVoxelOctree::new(UVec3::new(20, 16, 33)).root_size(), 64);
        assert_eq!(SparseVoxelOctree::new(UVec3::splat(16)).root_size(), 16);
        assert_eq!(SparseVoxelOctree::new(UVec3::splat(1)).root_size(), 1);
    }

    #[test]
    fn test_get_set_round_trip() {
        let mut tree = SparseVoxelOctree::new(UVec3::splat(16));
        assert_eq!(tree.get(IVec3::new(5, 6, 7)), Voxel::EMPTY);
        assert!(tree.set(IVec3::new(5, 6, 7), Voxel::new(3)));
        assert_eq!(tree.get(IVec3::new(5, 6, 7)), Voxel::new(3));
        assert_eq!(tree.get(IVec3::new(5, 6, 8)), Voxel::EMPTY);
    }

    #[test]
    fn test_out_of_range_noop() {
        let mut tree = SparseVoxelOctree::new(UVec3::new(10, 10, 10));
        // Inside root cube padding but outside logical dims
        assert!(!tree.set(IVec3::new(12, 0, 0), Voxel::new(1)));
        assert_eq!(tree.get(IVec3::new(12, 0, 0)), Voxel::EMPTY);
        assert_eq!(tree.version(), 0);
    }

    #[test]
    fn test_version_bumps_only_on_change() {
        let mut tree = SparseVoxelOctree::new(UVec3::splat(8));
        assert!(tree.set(IVec3::ZERO, Voxel::new(2)));
        let v = tree.version();
        assert!(!tree.set(IVec3::ZERO, Voxel::new(2)));
        assert_eq!(tree.version(), v);
        assert!(tree.set(IVec3::ZERO, Voxel::new(4)));
        assert_eq!(tree.version(), v + 1);
    }

    #[test]
    fn test_collapse_on_uniform() {
        let mut tree = SparseVoxelOctree::new(UVec3::splat(2));
        let v = Voxel::new(5);
        for pos in GridBounds::from_min_size(IVec3::ZERO, UVec3::splat(2)).iter() {
            tree.set(pos, v);
        }
        // All eight cells equal, so the split root collapsed back
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.get(IVec3::new(1, 1, 1)), v);

        tree.set(IVec3::ZERO, Voxel::EMPTY);
        assert_eq!(tree.node_count(), 9);
    }

    #[test]
    fn test_no_internal_with_uniform_children() {
        // Fill and unfill a larger volume, then check the structural invariant
        let mut tree = SparseVoxelOctree::new(UVec3::splat(8));
        let region = GridBounds::from_min_size(IVec3::ZERO, UVec3::new(8, 4, 8));
        for pos in region.iter() {
            tree.set(pos, Voxel::new(1));
        }
        for pos in region.iter() {
            if (pos.x + pos.z) % 2 == 0 {
                tree.set(pos, Voxel::EMPTY);
            }
        }
        assert_no_uniform_internal(&tree.root);
    }

    fn assert_no_uniform_internal(node: &Node) {
        if let Node::Internal(children) = node {
            assert!(uniform_leaf_value(children).is_none());
            for child in children.iter() {
                assert_no_uniform_internal(child);
            }
        }
    }

    #[test]
    fn test_fill_collapses_to_single_leaf() {
        let mut tree = SparseVoxelOctree::new(UVec3::splat(16));
        assert!(tree.fill(Voxel::new(6)));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.count_non_empty(), 16 * 16 * 16);
        assert!(!tree.fill(Voxel::new(6)));
    }

    #[test]
    fn test_fill_clips_to_dims() {
        // Root cube is 4 but the grid is 3, so the padding must stay empty
        let mut tree = SparseVoxelOctree::new(UVec3::splat(3));
        assert!(tree.fill(Voxel::new(2)));
        assert_eq!(tree.count_non_empty(), 27);
        assert_eq!(tree.get(IVec3::new(2, 2, 2)), Voxel::new(2));

        let v = tree.version();
        assert!(tree.fill(Voxel::EMPTY));
        assert!(tree.is_all_empty());
        assert_eq!(tree.version(), v + 1);
    }

    #[test]
    fn test_count_and_regions() {
        let mut tree = SparseVoxelOctree::new(UVec3::splat(4));
        let region = GridBounds::from_min_size(IVec3::ZERO, UVec3::splat(2));
        for pos in region.iter() {
            tree.set(pos, Voxel::new(7));
        }
        assert_eq!(tree.count_non_empty(), 8);

        let mut regions = Vec::new();
        tree.for_each_region(&mut |bounds, v| regions.push((bounds, v)));
        // Uniform octant stored as a single region
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].0.size(), UVec3::splat(2));
        assert_eq!(regions[0].1, Voxel::new(7));
    }

    #[test]
    fn test_from_store() {
        let mut store = ChunkStore::new(UVec3::splat(20));
        store.set(IVec3::new(0, 0, 0), Voxel::new(1));
        store.set(IVec3::new(19, 19, 19), Voxel::new(2));

        let tree = SparseVoxelOctree::from_store(&store);
        assert_eq!(tree.root_size(), 32);
        assert_eq!(tree.get(IVec3::new(19, 19, 19)), Voxel::new(2));
        assert_eq!(tree.count_non_empty(), 2);
        assert!(tree.any_value(|v| v.block_type() == 1));
        assert!(!tree.any_value(|v| v.block_type() == 9));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut tree = SparseVoxelOctree::new(UVec3::splat(8));
        tree.set(IVec3::ZERO, Voxel::new(1));
        let snapshot = tree.clone();
        tree.set(IVec3::ZERO, Voxel::new(2));
        assert_eq!(snapshot.get(IVec3::ZERO), Voxel::new(1));
        assert_eq!(tree.get(IVec3::ZERO), Voxel::new(2));
    }
}
