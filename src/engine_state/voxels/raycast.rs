//! Voxel ray casting.
//!
//! Grid traversal (DDA) from an origin along a direction, stepping one voxel
//! boundary at a time until a solid voxel is entered or the maximum distance
//! is exceeded. The voxel containing the origin is not tested.

use cgmath::{InnerSpace, Point3, Vector3};

/// The first solid voxel hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCastHit {
    /// Absolute position of the hit voxel
    pub block_position: Point3<i32>,
    /// Unit normal of the face the ray entered through
    pub normal: Vector3<i32>,
    /// Distance along the ray to the entry point
    pub distance: f32,
}

impl RayCastHit {
    /// Position of the empty voxel in front of the hit face, where a placed block goes.
    pub fn adjacent_position(&self) -> Point3<i32> {
        self.block_position + self.normal
    }
}

/// Casts a ray through the voxel grid.
///
/// `is_solid` is asked about each voxel the ray enters, in order. Returns
/// `None` when the direction is zero or nothing solid lies within
/// `max_distance`.
pub fn cast_ray(
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
    mut is_solid: impl FnMut(Point3<i32>) -> bool,
) -> Option<RayCastHit> {
    if direction.magnitude2() == 0.0 || !max_distance.is_finite() {
        return None;
    }
    let direction = direction.normalize();

    let mut cell = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );
    let origin = [origin.x, origin.y, origin.z];
    let dir = [direction.x, direction.y, direction.z];

    let mut step = [0i32; 3];
    let mut delta = [f32::INFINITY; 3];
    let mut side_distance = [f32::INFINITY; 3];
    let start = [cell.x, cell.y, cell.z];
    for axis in 0..3 {
        if dir[axis] > 0.0 {
            step[axis] = 1;
            delta[axis] = 1.0 / dir[axis];
            side_distance[axis] = ((start[axis] + 1) as f32 - origin[axis]) * delta[axis];
        } else if dir[axis] < 0.0 {
            step[axis] = -1;
            delta[axis] = -1.0 / dir[axis];
            side_distance[axis] = (origin[axis] - start[axis] as f32) * delta[axis];
        }
    }

    loop {
        let axis = if side_distance[0] < side_distance[1] {
            if side_distance[0] < side_distance[2] {
                0
            } else {
                2
            }
        } else if side_distance[1] < side_distance[2] {
            1
        } else {
            2
        };

        let distance = side_distance[axis];
        if distance > max_distance {
            return None;
        }
        side_distance[axis] += delta[axis];

        let mut normal = Vector3::new(0, 0, 0);
        match axis {
            0 => {
                cell.x += step[0];
                normal.x = -step[0];
            }
            1 => {
                cell.y += step[1];
                normal.y = -step[1];
            }
            _ => {
                cell.z += step[2];
                normal.z = -step[2];
            }
        }

        if is_solid(cell) {
            return Some(RayCastHit {
                block_position: cell,
                normal,
                distance,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_floor_below_origin() {
        let hit = cast_ray(
            Point3::new(0.5, 10.5, 0.5),
            Vector3::new(0.0, -1.0, 0.0),
            20.0,
            |p| p.y <= 3,
        )
        .unwrap();
        assert_eq!(hit.block_position, Point3::new(0, 3, 0));
        assert_eq!(hit.normal, Vector3::new(0, 1, 0));
        assert_eq!(hit.adjacent_position(), Point3::new(0, 4, 0));
        assert!((hit.distance - 6.5).abs() < 1e-4);
    }

    #[test]
    fn stops_at_max_distance() {
        let hit = cast_ray(
            Point3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
            3.0,
            |p| p.x == 10,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn negative_direction_reports_positive_face() {
        let hit = cast_ray(
            Point3::new(-0.5, 0.5, 0.5),
            Vector3::new(-1.0, 0.0, 0.0),
            10.0,
            |p| p.x == -4,
        )
        .unwrap();
        assert_eq!(hit.block_position, Point3::new(-4, 0, 0));
        assert_eq!(hit.normal, Vector3::new(1, 0, 0));
    }

    #[test]
    fn diagonal_ray_visits_cells_in_order() {
        let mut visited = Vec::new();
        let hit = cast_ray(
            Point3::new(0.2, 0.5, 0.1),
            Vector3::new(1.0, 0.0, 1.0),
            4.0,
            |p| {
                visited.push(p);
                p == Point3::new(2, 0, 2)
            },
        );
        assert!(hit.is_some());
        for pair in visited.windows(2) {
            let step = pair[1] - pair[0];
            assert_eq!(step.x.abs() + step.y.abs() + step.z.abs(), 1);
        }
    }

    #[test]
    fn zero_direction_is_rejected() {
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert!(cast_ray(origin, Vector3::new(0.0, 0.0, 0.0), 5.0, |_| true).is_none());
    }
}
