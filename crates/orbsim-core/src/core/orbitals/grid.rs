use nalgebra::{Point3, Vector3};

/// A regular rectilinear sample lattice.
///
/// Axis `k` carries `resolution[k]` points spread evenly from `center - half_extent` to
/// `center + half_extent`, endpoints included. A resolution of 1 places the single sample
/// on the center plane. Flat indices run x fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    center: Point3<f64>,
    half_extent: Vector3<f64>,
    resolution: [usize; 3],
}

impl Grid {
    pub fn new(center: Point3<f64>, half_extent: Vector3<f64>, resolution: [usize; 3]) -> Self {
        Self {
            center,
            half_extent: half_extent.map(f64::abs),
            resolution,
        }
    }

    /// A cube of half-width `extent` around `center`.
    pub fn cube(center: Point3<f64>, extent: f64, resolution: [usize; 3]) -> Self {
        Self::new(center, Vector3::repeat(extent), resolution)
    }

    /// The grid spanning the box between two corners.
    pub fn from_bounds(min: Point3<f64>, max: Point3<f64>, resolution: [usize; 3]) -> Self {
        let center = nalgebra::center(&min, &max);
        Self::new(center, (max - min) / 2.0, resolution)
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    pub fn half_extent(&self) -> Vector3<f64> {
        self.half_extent
    }

    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.resolution.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of samples in one z-slab.
    pub fn slab_len(&self) -> usize {
        self.resolution[0] * self.resolution[1]
    }

    /// Distance between neighbouring samples along each axis; 0 for a collapsed axis.
    pub fn spacing(&self) -> [f64; 3] {
        std::array::from_fn(|axis| {
            let count = self.resolution[axis];
            if count <= 1 {
                0.0
            } else {
                2.0 * self.half_extent[axis] / (count - 1) as f64
            }
        })
    }

    /// Sample coordinates along one axis.
    pub fn axis_points(&self, axis: usize) -> Vec<f64> {
        let count = self.resolution[axis];
        let start = self.center[axis] - self.half_extent[axis];
        let step = self.spacing()[axis];
        if count == 1 {
            return vec![self.center[axis]];
        }
        (0..count).map(|i| start + step * i as f64).collect()
    }

    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + self.resolution[0] * (iy + self.resolution[1] * iz)
    }

    /// Inverse of [`index`](Self::index).
    pub fn coordinates(&self, index: usize) -> [usize; 3] {
        let [nx, ny, _] = self.resolution;
        [index % nx, (index / nx) % ny, index / (nx * ny)]
    }

    pub fn point(&self, ix: usize, iy: usize, iz: usize) -> Point3<f64> {
        let spacing = self.spacing();
        let coord = |axis: usize, i: usize| {
            if self.resolution[axis] == 1 {
                self.center[axis]
            } else {
                self.center[axis] - self.half_extent[axis] + spacing[axis] * i as f64
            }
        };
        Point3::new(coord(0, ix), coord(1, iy), coord(2, iz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn cube_axis_points_include_both_ends() {
        let grid = Grid::cube(Point3::new(1.0, 0.0, 0.0), 2.0, [5, 3, 2]);
        assert_eq!(grid.axis_points(0), vec![-1.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(grid.axis_points(1), vec![-2.0, 0.0, 2.0]);
        assert_eq!(grid.axis_points(2), vec![-2.0, 2.0]);
        assert_eq!(grid.len(), 30);
        assert_eq!(grid.slab_len(), 15);
    }

    #[test]
    fn resolution_one_collapses_axis_to_center_plane() {
        let grid = Grid::cube(Point3::new(0.5, -1.0, 2.0), 3.0, [1, 4, 1]);
        assert_eq!(grid.axis_points(0), vec![0.5]);
        assert_eq!(grid.spacing()[0], 0.0);
        for iy in 0..4 {
            let p = grid.point(0, iy, 0);
            assert!(f64_approx_equal(p.x, 0.5));
            assert!(f64_approx_equal(p.z, 2.0));
        }
    }

    #[test]
    fn index_and_coordinates_are_inverse() {
        let grid = Grid::cube(Point3::origin(), 1.0, [3, 4, 5]);
        for i in 0..grid.len() {
            let [ix, iy, iz] = grid.coordinates(i);
            assert_eq!(grid.index(ix, iy, iz), i);
        }
        assert_eq!(grid.index(1, 0, 0), 1);
        assert_eq!(grid.index(0, 1, 0), 3);
        assert_eq!(grid.index(0, 0, 1), 12);
    }

    #[test]
    fn point_agrees_with_axis_points() {
        let grid = Grid::from_bounds(
            Point3::new(-1.0, -2.0, -3.0),
            Point3::new(1.0, 2.0, 3.0),
            [3, 5, 7],
        );
        let xs = grid.axis_points(0);
        let ys = grid.axis_points(1);
        let zs = grid.axis_points(2);
        let p = grid.point(2, 4, 6);
        assert!(f64_approx_equal(p.x, xs[2]));
        assert!(f64_approx_equal(p.y, ys[4]));
        assert!(f64_approx_equal(p.z, zs[6]));
        assert!(f64_approx_equal(p.z, 3.0));
    }
}
