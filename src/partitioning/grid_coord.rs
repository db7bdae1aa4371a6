use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use std::hash::{Hash, Hasher};

/// The integer coordinates of a cell of the static geometry grid.
///
/// The cell `(x, y, z)` of a grid with cells of size `s` is centered at `(x·s, y·s, z·s)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct GridCoord {
    /// The cell index along the `x` axis.
    pub x: i32,
    /// The cell index along the `y` axis.
    pub y: i32,
    /// The cell index along the `z` axis.
    pub z: i32,
}

impl GridCoord {
    /// Creates a grid coordinate from its components.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The coordinates of the cell containing `pt`.
    ///
    /// Each component is rounded to the nearest integer, with ties rounded away from zero.
    #[inline]
    pub fn from_point(pt: &Point<Real>, cell_size: Real) -> Self {
        let to_coord = |v: Real| (v / cell_size).round() as i32;
        Self::new(to_coord(pt.x), to_coord(pt.y), to_coord(pt.z))
    }

    /// The order-sensitive hash code of this coordinate: `31·(31·(31 + x) + y) + z`.
    #[inline]
    pub fn hash_code(&self) -> i32 {
        31i32
            .wrapping_add(self.x)
            .wrapping_mul(31)
            .wrapping_add(self.y)
            .wrapping_mul(31)
            .wrapping_add(self.z)
    }

    /// This coordinate shifted by the given number of cells on each axis.
    #[inline]
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The world-space center of this cell.
    #[inline]
    pub fn cell_center(&self, cell_size: Real) -> Point<Real> {
        Point::new(
            self.x as Real * cell_size,
            self.y as Real * cell_size,
            self.z as Real * cell_size,
        )
    }

    /// The world-space bounds of this cell.
    #[inline]
    pub fn cell_aabb(&self, cell_size: Real) -> Aabb {
        Aabb::from_half_extents(
            self.cell_center(cell_size),
            Vector::repeat(cell_size * 0.5),
        )
    }

    /// The coordinates of all the cells intersecting `aabb`.
    pub fn cells_intersecting(aabb: &Aabb, cell_size: Real) -> impl Iterator<Item = GridCoord> {
        Self::range(
            Self::from_point(&aabb.mins, cell_size),
            Self::from_point(&aabb.maxs, cell_size),
        )
    }

    /// All the coordinates between `mins` and `maxs`, both inclusive.
    ///
    /// The `z` component varies fastest.
    pub fn range(mins: GridCoord, maxs: GridCoord) -> impl Iterator<Item = GridCoord> {
        (mins.x..=maxs.x).flat_map(move |x| {
            (mins.y..=maxs.y)
                .flat_map(move |y| (mins.z..=maxs.z).map(move |z| GridCoord::new(x, y, z)))
        })
    }
}

impl Hash for GridCoord {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code())
    }
}

impl From<[i32; 3]> for GridCoord {
    #[inline]
    fn from(c: [i32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

#[cfg(test)]
mod test {
    use super::GridCoord;
    use crate::bounding_volume::Aabb;
    use crate::math::Point;

    #[test]
    fn rounds_to_nearest_cell() {
        let s = 32.0;
        assert_eq!(
            GridCoord::from_point(&Point::new(0.0, 15.9, -15.9), s),
            GridCoord::new(0, 0, 0)
        );
        assert_eq!(
            GridCoord::from_point(&Point::new(16.0, -16.0, 47.0), s),
            GridCoord::new(1, -1, 1)
        );
        assert_eq!(
            GridCoord::from_point(&Point::new(-48.1, 48.1, 100.0), s),
            GridCoord::new(-2, 2, 3)
        );

        for coord in [GridCoord::new(-3, 0, 7), GridCoord::new(5, -1, -2)] {
            assert_eq!(GridCoord::from_point(&coord.cell_center(s), s), coord);
            assert!(coord.cell_aabb(s).contains_local_point(&coord.cell_center(s)));
        }
    }

    #[test]
    fn hash_code_is_order_sensitive() {
        assert_eq!(GridCoord::new(0, 0, 0).hash_code(), 29791);
        assert_eq!(GridCoord::new(1, 2, 3).hash_code(), 31 * (31 * 32 + 2) + 3);
        assert_ne!(
            GridCoord::new(1, 2, 3).hash_code(),
            GridCoord::new(3, 2, 1).hash_code()
        );
        // Never overflows.
        let _ = GridCoord::new(i32::MAX, i32::MAX, i32::MAX).hash_code();
    }

    #[test]
    fn range_is_inclusive() {
        let aabb = Aabb::new(Point::new(-20.0, -1.0, 0.0), Point::new(20.0, 1.0, 17.0));
        let cells: Vec<_> = GridCoord::cells_intersecting(&aabb, 32.0).collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], GridCoord::new(-1, 0, 0));
        assert_eq!(cells[1], GridCoord::new(-1, 0, 1));
        assert_eq!(*cells.last().unwrap(), GridCoord::new(1, 0, 1));
    }
}
