//! Square regions of chunk coordinates around the viewer.

use std::cmp::Ordering;

use super::voxels::chunk::ChunkCoordinate;

/// All chunk coordinates within a Chebyshev radius of a center chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadWindow {
    center: ChunkCoordinate,
    radius: i32,
}

impl LoadWindow {
    /// Creates the window of half extent `radius` around `center`.
    pub fn new(center: ChunkCoordinate, radius: i32) -> Self {
        Self {
            center,
            radius: radius.max(0),
        }
    }

    /// Center chunk.
    pub fn center(&self) -> ChunkCoordinate {
        self.center
    }

    /// Half extent in chunks.
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Whether a coordinate lies inside the window.
    pub fn contains(&self, coordinate: ChunkCoordinate) -> bool {
        self.center.chebyshev_distance(coordinate) <= self.radius
    }

    /// Number of coordinates in the window.
    pub fn len(&self) -> usize {
        let side = (2 * self.radius + 1) as usize;
        side * side
    }

    /// Whether the window is empty. A window always holds at least its center.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every coordinate in the window, x-major.
    pub fn coordinates(&self) -> impl Iterator<Item = ChunkCoordinate> + '_ {
        let r = self.radius;
        (-r..=r).flat_map(move |dx| {
            (-r..=r).map(move |dz| ChunkCoordinate::new(self.center.x + dx, self.center.z + dz))
        })
    }

    /// Every coordinate in the window, nearest to the center first.
    ///
    /// Ties on Chebyshev distance are broken by Euclidean distance, then by
    /// coordinate, so the order is fully deterministic.
    pub fn coordinates_nearest_first(&self) -> Vec<ChunkCoordinate> {
        let mut coordinates: Vec<_> = self.coordinates().collect();
        coordinates.sort_by(|a, b| self.compare_distance(*a, *b));
        coordinates
    }

    /// Orders two coordinates by distance to the center.
    pub fn compare_distance(&self, a: ChunkCoordinate, b: ChunkCoordinate) -> Ordering {
        let key = |c: ChunkCoordinate| {
            let (dx, dz) = (c.x - self.center.x, c.z - self.center.z);
            (self.center.chebyshev_distance(c), dx * dx + dz * dz, c)
        };
        key(a).cmp(&key(b))
    }

    /// Coordinates in this window that are not in `other`.
    pub fn difference<'a>(
        &'a self,
        other: &'a LoadWindow,
    ) -> impl Iterator<Item = ChunkCoordinate> + 'a {
        self.coordinates().filter(move |c| !other.contains(*c))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use test_case::test_case;

    #[test_case(0, 1)]
    #[test_case(1, 9)]
    #[test_case(2, 25)]
    #[test_case(5, 121)]
    fn window_size_is_odd_square(radius: i32, expected: usize) {
        let window = LoadWindow::new(ChunkCoordinate::new(7, -3), radius);
        assert_eq!(window.len(), expected);
        let unique: HashSet<_> = window.coordinates().collect();
        assert_eq!(unique.len(), expected);
    }

    #[test]
    fn moving_one_chunk_swaps_one_column() {
        let before = LoadWindow::new(ChunkCoordinate::new(0, 0), 2);
        let after = LoadWindow::new(ChunkCoordinate::new(1, 0), 2);

        let added: Vec<_> = after.difference(&before).collect();
        let removed: Vec<_> = before.difference(&after).collect();
        assert_eq!(added.len(), 5);
        assert_eq!(removed.len(), 5);
        assert!(added.iter().all(|c| c.x == 3));
        assert!(removed.iter().all(|c| c.x == -2));
    }

    #[test]
    fn nearest_first_starts_at_center() {
        let window = LoadWindow::new(ChunkCoordinate::new(2, 2), 2);
        let ordered = window.coordinates_nearest_first();
        assert_eq!(ordered[0], ChunkCoordinate::new(2, 2));
        assert!(ordered[1..9]
            .iter()
            .all(|c| c.chebyshev_distance(window.center()) == 1));
        assert!(ordered[9..]
            .iter()
            .all(|c| c.chebyshev_distance(window.center()) == 2));
    }
}
