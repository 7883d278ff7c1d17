//! Integer bounds on the voxel grid

use crate::core::types::{IVec3, UVec3};

/// Axis-aligned box of grid cells, min inclusive and max exclusive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridBounds {
    pub min: IVec3,
    pub max: IVec3,
}

impl GridBounds {
    /// Create bounds from min (inclusive) and max (exclusive) corners
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    /// Create bounds covering two inclusive corner cells in any order
    pub fn from_corners(a: IVec3, b: IVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b) + IVec3::ONE,
        }
    }

    /// Create bounds from min corner and size
    pub fn from_min_size(min: IVec3, size: UVec3) -> Self {
        Self {
            min,
            max: min + size.as_ivec3(),
        }
    }

    /// Get size (max - min), zero on any degenerate axis
    pub fn size(&self) -> UVec3 {
        (self.max - self.min).max(IVec3::ZERO).as_uvec3()
    }

    /// Number of cells covered
    pub fn volume(&self) -> usize {
        let s = self.size();
        s.x as usize * s.y as usize * s.z as usize
    }

    /// Check if bounds cover no cells
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y || self.max.z <= self.min.z
    }

    /// Check if a cell lies inside the bounds
    pub fn contains(&self, p: IVec3) -> bool {
        p.x >= self.min.x && p.x < self.max.x &&
        p.y >= self.min.y && p.y < self.max.y &&
        p.z >= self.min.z && p.z < self.max.z
    }

    /// Intersection of two bounds, possibly empty
    pub fn intersection(&self, other: &GridBounds) -> GridBounds {
        GridBounds {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Clip to the grid [0, dims)
    pub fn clamped_to_dims(&self, dims: UVec3) -> GridBounds {
        self.intersection(&GridBounds::new(IVec3::ZERO, dims.as_ivec3()))
    }

    /// Shift both corners by an offset
    pub fn translated(&self, offset: IVec3) -> GridBounds {
        GridBounds {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Smallest bounds containing both
    pub fn merged(&self, other: &GridBounds) -> GridBounds {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        GridBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow to include a cell
    pub fn expand_to_include(&mut self, p: IVec3) {
        if self.is_empty() {
            self.min = p;
            self.max = p + IVec3::ONE;
        } else {
            self.min = self.min.min(p);
            self.max = self.max.max(p + IVec3::ONE);
        }
    }

    /// Iterate cells in x-major, then y, then z order
    pub fn iter(&self) -> impl Iterator<Item = IVec3> + use<> {
        let b = *self;
        (b.min.x..b.max.x).flat_map(move |x| {
            (b.min.y..b.max.y).flat_map(move |y| {
                (b.min.z..b.max.z).map(move |z| IVec3::new(x, y, z))
            })
        })
    }
}

/// Wrap a cell into [0, dims) on each axis (toroidal addressing)
pub fn wrap_to_dims(p: IVec3, dims: UVec3) -> IVec3 {
    let d = dims.as_ivec3();
    IVec3::new(
        ((p.x % d.x) + d.x) % d.x,
        ((p.y % d.y) + d.y) % d.y,
        ((p.z % d.z) + d.z) % d.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_any_order() {
        let a = GridBounds::from_corners(IVec3::new(3, 1, 2), IVec3::new(0, 4, 2));
        assert_eq!(a.min, IVec3::new(0, 1, 2));
        assert_eq!(a.max, IVec3::new(4, 5, 3));
        assert_eq!(a.size(), UVec3::new(4, 4, 1));
    }

    #[test]
    fn test_contains() {
        let b = GridBounds::from_min_size(IVec3::ZERO, UVec3::splat(4));
        assert!(b.contains(IVec3::ZERO));
        assert!(b.contains(IVec3::splat(3)));
        assert!(!b.contains(IVec3::splat(4)));
        assert!(!b.contains(IVec3::new(-1, 0, 0)));
    }

    #[test]
    fn test_intersection_and_empty() {
        let a = GridBounds::from_min_size(IVec3::ZERO, UVec3::splat(4));
        let b = GridBounds::from_min_size(IVec3::splat(2), UVec3::splat(4));
        let i = a.intersection(&b);
        assert_eq!(i.min, IVec3::splat(2));
        assert_eq!(i.max, IVec3::splat(4));
        assert!(!i.is_empty());

        let c = GridBounds::from_min_size(IVec3::splat(10), UVec3::splat(2));
        assert!(a.intersection(&c).is_empty());
        assert_eq!(a.intersection(&c).volume(), 0);
    }

    #[test]
    fn test_iter_order_and_count() {
        let b = GridBounds::from_min_size(IVec3::ZERO, UVec3::new(2, 2, 2));
        let cells: Vec<IVec3> = b.iter().collect();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0], IVec3::new(0, 0, 0));
        assert_eq!(cells[1], IVec3::new(0, 0, 1));
        assert_eq!(cells[2], IVec3::new(0, 1, 0));
        assert_eq!(cells[4], IVec3::new(1, 0, 0));
    }

    #[test]
    fn test_translated() {
        let b = GridBounds::from_min_size(IVec3::ZERO, UVec3::splat(4));
        let t = b.translated(IVec3::new(10, -2, 0));
        assert_eq!(t.min, IVec3::new(10, -2, 0));
        assert_eq!(t.size(), b.size());
    }

    #[test]
    fn test_expand_to_include() {
        let mut b = GridBounds::default();
        assert!(b.is_empty());
        b.expand_to_include(IVec3::new(2, 2, 2));
        b.expand_to_include(IVec3::new(-1, 3, 2));
        assert_eq!(b.min, IVec3::new(-1, 2, 2));
        assert_eq!(b.max, IVec3::new(3, 4, 3));
    }

    #[test]
    fn test_wrap_to_dims() {
        let dims = UVec3::new(16, 8, 4);
        assert_eq!(wrap_to_dims(IVec3::new(0, 0, 0), dims), IVec3::new(0, 0, 0));
        assert_eq!(wrap_to_dims(IVec3::new(16, 8, 4), dims), IVec3::new(0, 0, 0));
        assert_eq!(wrap_to_dims(IVec3::new(-1, -9, 5), dims), IVec3::new(15, 7, 1));
        assert_eq!(wrap_to_dims(IVec3::new(33, -1, -4), dims), IVec3::new(1, 7, 0));
    }
}
