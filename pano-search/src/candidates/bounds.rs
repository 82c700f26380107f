use core::f32::consts::{PI, TAU};
use pano_core::{nalgebra::Vector3, rank_quantiles, PointCloud};

/// Fraction of points trimmed from each end of every axis by default.
pub const DEFAULT_OUT_QUANTILE: f32 = 0.05;

/// The search box of a pose: the extent of the cloud with outliers trimmed
/// from every axis, and the range of each angle.
///
/// Downstream optimizers use it to bound their search and to reject poses
/// that left the room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBounds {
    pub x: (f32, f32),
    pub y: (f32, f32),
    pub z: (f32, f32),
    pub yaw: (f32, f32),
    pub pitch: (f32, f32),
    pub roll: (f32, f32),
}

impl SearchBounds {
    /// Bounds between the `out_quantile` and `1 - out_quantile` ranks of every
    /// axis, with full angle ranges.
    pub fn new(cloud: &PointCloud, out_quantile: f32) -> Self {
        let axis = |axis| rank_quantiles(&cloud.sorted_axis(axis), out_quantile);
        Self {
            x: axis(0),
            y: axis(1),
            z: axis(2),
            yaw: (0.0, TAU),
            pitch: (0.0, PI),
            roll: (0.0, TAU),
        }
    }

    /// Whether `translation` lies outside the trimmed extent. Points on the
    /// boundary count as outside.
    pub fn is_out_of_room(&self, translation: &Vector3<f32>) -> bool {
        let inside = |(low, high): (f32, f32), value: f32| low < value && value < high;
        !(inside(self.x, translation.x) && inside(self.y, translation.y) && inside(self.z, translation.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pano_core::nalgebra::Point3;

    #[test]
    fn outliers_are_trimmed() {
        let mut positions: Vec<Point3<f32>> = (0..100)
            .map(|i| Point3::new(i as f32 / 100.0, i as f32 / 100.0, i as f32 / 100.0))
            .collect();
        positions[99] = Point3::new(50.0, 50.0, 50.0);
        let colors = vec![Vector3::repeat(0.5); positions.len()];
        let cloud = PointCloud::new(positions, colors).unwrap();
        let bounds = SearchBounds::new(&cloud, DEFAULT_OUT_QUANTILE);
        assert_eq!(bounds.x.0, 0.05);
        assert!(bounds.x.1 > 0.9 && bounds.x.1 < 1.0);
        assert!(!bounds.is_out_of_room(&Vector3::repeat(0.5)));
        assert!(bounds.is_out_of_room(&Vector3::new(0.5, 0.5, 2.0)));
        assert!(bounds.is_out_of_room(&Vector3::new(0.95, 0.5, 0.5)));
        assert_eq!(bounds.pitch, (0.0, PI));
    }
}
