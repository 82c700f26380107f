use crate::{Error, Result};
use nalgebra::{Point3, Rotation3, Vector3};

/// A colored point cloud.
///
/// Positions and colors are co-indexed: the color at index `i` belongs to the
/// position at index `i`. Neither sequence is ever reordered on its own, and any
/// function that internally reorders the points restores the original order
/// before handing per-point results back.
///
/// Colors are RGB in `[0, 1]`. The color `[0, 0, 0]` is reserved as the empty
/// pixel sentinel of rendered panoramas, so a perfectly black point renders as
/// a hole.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    positions: Vec<Point3<f32>>,
    colors: Vec<Vector3<f32>>,
}

impl PointCloud {
    /// Creates a cloud, checking that it is non-empty and that every position has a color.
    pub fn new(positions: Vec<Point3<f32>>, colors: Vec<Vector3<f32>>) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::EmptyCloud);
        }
        if positions.len() != colors.len() {
            return Err(Error::ColorMismatch {
                positions: positions.len(),
                colors: colors.len(),
            });
        }
        Ok(Self { positions, colors })
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn colors(&self) -> &[Vector3<f32>] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always `false`, a cloud cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        self.positions.iter().skip(1).fold(
            (self.positions[0], self.positions[0]),
            |(min, max), p| (min.inf(p), max.sup(p)),
        )
    }

    /// The centroid of all positions.
    pub fn mean(&self) -> Point3<f32> {
        let sum = self
            .positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.positions.len() as f32)
    }

    /// The values of one axis (0 = x, 1 = y, 2 = z), sorted ascending.
    pub fn sorted_axis(&self, axis: usize) -> Vec<f32> {
        let mut values: Vec<f32> = self.positions.iter().map(|p| p[axis]).collect();
        values.sort_by(f32::total_cmp);
        values
    }

    /// Expresses every point in the frame of a camera located at `translation`
    /// with orientation `rotation`, computing `R (p - t)` for each point.
    ///
    /// The output keeps the cloud's point order.
    pub fn relative_to(&self, translation: &Vector3<f32>, rotation: &Rotation3<f32>) -> Vec<Vector3<f32>> {
        self.positions
            .iter()
            .map(|p| rotation * (p.coords - translation))
            .collect()
    }

    /// Same as [`PointCloud::relative_to`] with the identity rotation.
    pub fn translated(&self, translation: &Vector3<f32>) -> Vec<Vector3<f32>> {
        self.positions.iter().map(|p| p.coords - translation).collect()
    }
}

/// Quantile of ascending `sorted` values with linear interpolation between
/// the two closest ranks.
///
/// `sorted` must be non-empty.
pub fn quantile(sorted: &[f32], q: f32) -> f32 {
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = position - lower as f32;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Quantile of ascending `sorted` values picked by truncated rank, returning the
/// `q` and `1 - q` values as a `(low, high)` pair.
///
/// This is the coarse estimate used for outlier trimming of room extents.
pub fn rank_quantiles(sorted: &[f32], q: f32) -> (f32, f32) {
    let last = sorted.len() - 1;
    let low = ((sorted.len() as f32 * q) as usize).min(last);
    let high = ((sorted.len() as f32 * (1.0 - q)) as usize).min(last);
    (sorted[low], sorted[high])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cloud() -> PointCloud {
        PointCloud::new(
            vec![
                Point3::new(-1.0, 0.0, 2.0),
                Point3::new(3.0, -2.0, 0.0),
                Point3::new(1.0, 1.0, 1.0),
            ],
            vec![Vector3::new(0.5, 0.5, 0.5); 3],
        )
        .unwrap()
    }

    #[test]
    fn empty_cloud_is_rejected() {
        assert!(matches!(
            PointCloud::new(vec![], vec![]),
            Err(Error::EmptyCloud)
        ));
    }

    #[test]
    fn color_count_must_match() {
        let result = PointCloud::new(vec![Point3::origin(); 2], vec![Vector3::zeros()]);
        assert!(matches!(
            result,
            Err(Error::ColorMismatch {
                positions: 2,
                colors: 1
            })
        ));
    }

    #[test]
    fn bounds_and_mean() {
        let cloud = cloud();
        let (min, max) = cloud.bounds();
        assert_eq!(min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Point3::new(3.0, 1.0, 2.0));
        assert_relative_eq!(cloud.mean(), Point3::new(1.0, -1.0 / 3.0, 1.0));
    }

    #[test]
    fn relative_to_applies_translation_then_rotation() {
        let cloud = cloud();
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), core::f32::consts::FRAC_PI_2);
        let translation = Vector3::new(1.0, 0.0, 0.0);
        let relative = cloud.relative_to(&translation, &rotation);
        // (3, -2, 0) - (1, 0, 0) = (2, -2, 0), rotated a quarter turn about z.
        assert_relative_eq!(relative[1], Vector3::new(2.0, 2.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn linear_quantile_interpolates() {
        let sorted = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile(&sorted, 0.5), 2.0);
        assert_relative_eq!(quantile(&sorted, 0.1), 0.4);
        assert_relative_eq!(quantile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn rank_quantiles_truncate() {
        let sorted: Vec<f32> = (0..20).map(|i| i as f32).collect();
        assert_eq!(rank_quantiles(&sorted, 0.05), (1.0, 19.0));
    }
}
