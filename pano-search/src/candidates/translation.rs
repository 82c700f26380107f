use float_ord::FloatOrd;
use itertools::iproduct;
use log::debug;
use pano_core::{nalgebra::Vector3, quantile, Error, PointCloud, Result};
use pano_octree::{generate_octree, generate_octree_2d, OctreeConfig};

/// Quantiles bounding the extent used to apportion grid counts between axes.
const EXTENT_QUANTILES: (f32, f32) = (0.1, 0.9);

/// Grid points closer than this to an octree candidate are dropped by
/// [`TranslationMode::GridOctree`].
pub const DEFAULT_GRID_OCTREE_SEPARATION: f32 = 1.5;

/// Strategy for placing translation candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TranslationMode {
    /// Centers of the empty interior cells of an adaptive octree.
    Octree(OctreeConfig),
    /// Octree candidates plus a quantile grid with as many points, keeping
    /// only the grid points farther than `separation` from every octree
    /// candidate.
    GridOctree {
        octree: OctreeConfig,
        separation: f32,
    },
    /// A grid of about `budget` points spaced by per-axis quantiles.
    Quantile { budget: usize },
    /// Points `size` apart inside the box between the `quantile` and
    /// `1 - quantile` quantiles of each axis.
    Voxel { size: f32, quantile: f32 },
    /// A grid of about `budget` points evenly spaced strictly inside the
    /// bounding box.
    Uniform { budget: usize },
    /// A grid of about `budget` points evenly spaced from `min` to `max`
    /// inclusive.
    Manual {
        budget: usize,
        min: Vector3<f32>,
        max: Vector3<f32>,
    },
}

/// A validated translation candidate strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationConfig {
    mode: TranslationMode,
    /// Camera constrained to a horizontal plane, at the given height or at the
    /// mean height of the cloud.
    planar: Option<Option<f32>>,
}

impl TranslationConfig {
    pub fn new(mode: TranslationMode) -> Result<Self> {
        match mode {
            TranslationMode::Octree(_) => {}
            TranslationMode::GridOctree { separation, .. } => {
                if !(separation >= 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "grid separation {} must be non-negative",
                        separation
                    )));
                }
            }
            TranslationMode::Quantile { budget }
            | TranslationMode::Uniform { budget }
            | TranslationMode::Manual { budget, .. } => {
                if budget == 0 {
                    return Err(Error::InvalidConfig(
                        "translation budget must be positive".into(),
                    ));
                }
            }
            TranslationMode::Voxel { size, quantile } => {
                if !(size > 0.0) || !(0.0..=1.0).contains(&quantile) {
                    return Err(Error::InvalidConfig(format!(
                        "voxel size {} must be positive and quantile {} within [0, 1]",
                        size, quantile
                    )));
                }
            }
        }
        Ok(Self { mode, planar: None })
    }

    /// Restricts candidates to the plane `z = height`, or to the mean height
    /// of the cloud when `height` is `None`.
    pub fn planar(self, height: Option<f32>) -> Result<Self> {
        match self.mode {
            TranslationMode::GridOctree { .. } | TranslationMode::Voxel { .. } => Err(
                Error::InvalidConfig(format!("{:?} has no planar variant", self.mode)),
            ),
            _ => Ok(Self {
                planar: Some(height),
                ..self
            }),
        }
    }

    pub fn mode(&self) -> &TranslationMode {
        &self.mode
    }

    /// The translation candidates for `cloud`.
    pub fn candidates(&self, cloud: &PointCloud) -> Result<Vec<Vector3<f32>>> {
        let candidates = match self.planar {
            None => self.candidates_3d(cloud)?,
            Some(height) => {
                let height = height.unwrap_or_else(|| cloud.mean().z);
                self.candidates_planar(cloud, height)?
            }
        };
        debug!("generated {} translation candidates", candidates.len());
        if candidates.is_empty() {
            return Err(Error::EmptyCandidates("translation"));
        }
        Ok(candidates)
    }

    fn candidates_3d(&self, cloud: &PointCloud) -> Result<Vec<Vector3<f32>>> {
        Ok(match self.mode {
            TranslationMode::Octree(config) => to_vectors(generate_octree(cloud, &config)?),
            TranslationMode::GridOctree { octree, separation } => {
                let octree = to_vectors(generate_octree(cloud, &octree)?);
                let counts = adaptive_counts(cloud, octree.len().max(1))?;
                let mut candidates: Vec<Vector3<f32>> = meshgrid(&axis_values(cloud, &self.mode, counts))
                    .into_iter()
                    .filter(|point| {
                        octree
                            .iter()
                            .map(|other| FloatOrd((point - other).norm()))
                            .min()
                            .map_or(true, |FloatOrd(distance)| distance > separation)
                    })
                    .collect();
                candidates.extend(octree);
                candidates
            }
            TranslationMode::Voxel { size, quantile: q } => {
                let q = q.min(1.0 - q);
                let axes = [0, 1, 2].map(|axis| {
                    let sorted = cloud.sorted_axis(axis);
                    let (low, high) = (quantile(&sorted, q), quantile(&sorted, 1.0 - q));
                    linspace(low, high, ((high - low) / size).floor() as usize)
                });
                meshgrid(&axes)
            }
            TranslationMode::Quantile { budget }
            | TranslationMode::Uniform { budget }
            | TranslationMode::Manual { budget, .. } => {
                let counts = adaptive_counts(cloud, budget)?;
                meshgrid(&axis_values(cloud, &self.mode, counts))
            }
        })
    }

    fn candidates_planar(&self, cloud: &PointCloud, height: f32) -> Result<Vec<Vector3<f32>>> {
        match self.mode {
            TranslationMode::Octree(config) => Ok(to_vectors(generate_octree_2d(cloud, height, &config)?)),
            TranslationMode::Quantile { budget }
            | TranslationMode::Uniform { budget }
            | TranslationMode::Manual { budget, .. } => {
                let [nx, ny] = adaptive_counts_planar(cloud, budget)?;
                let [xs, ys, _] = axis_values(cloud, &self.mode, [nx, ny, 1]);
                Ok(iproduct!(xs, ys)
                    .map(|(x, y)| Vector3::new(x, y, height))
                    .collect())
            }
            TranslationMode::GridOctree { .. } | TranslationMode::Voxel { .. } => Err(
                Error::InvalidConfig(format!("{:?} has no planar variant", self.mode)),
            ),
        }
    }
}

fn to_vectors(points: Vec<pano_core::nalgebra::Point3<f32>>) -> Vec<Vector3<f32>> {
    points.into_iter().map(|p| p.coords).collect()
}

/// Lengths of the axes between the 10% and 90% quantiles.
fn trimmed_lengths(cloud: &PointCloud) -> Result<[f32; 3]> {
    let mut lengths = [0.0; 3];
    for (axis, length) in lengths.iter_mut().enumerate() {
        let sorted = cloud.sorted_axis(axis);
        *length = quantile(&sorted, EXTENT_QUANTILES.1) - quantile(&sorted, EXTENT_QUANTILES.0);
        if !(*length > 0.0) {
            return Err(Error::DegenerateAxis { axis });
        }
    }
    Ok(lengths)
}

/// Per-axis grid counts whose product is about `budget`, in proportion to
/// the extent of each axis. Even counts are reduced by one so every axis has
/// a center sample.
pub fn adaptive_counts(cloud: &PointCloud, budget: usize) -> Result<[usize; 3]> {
    let [lx, ly, lz] = trimmed_lengths(cloud)?;
    let budget = budget as f32;
    let count = |own: f32, a: f32, b: f32| {
        let count = ((own * own * budget / (a * b)).cbrt().ceil() as usize).max(1);
        if count % 2 == 0 {
            count - 1
        } else {
            count
        }
    };
    Ok([count(lx, ly, lz), count(ly, lx, lz), count(lz, lx, ly)])
}

/// [`adaptive_counts`] for a grid over x and y only.
pub fn adaptive_counts_planar(cloud: &PointCloud, budget: usize) -> Result<[usize; 2]> {
    let [lx, ly, _] = trimmed_lengths(cloud)?;
    let budget = budget as f32;
    let count = |own: f32, other: f32| ((own * budget / other).sqrt().ceil() as usize).max(1);
    Ok([count(lx, ly), count(ly, lx)])
}

/// Sample positions along each axis for the grid modes.
fn axis_values(cloud: &PointCloud, mode: &TranslationMode, counts: [usize; 3]) -> [Vec<f32>; 3] {
    let (min, max) = cloud.bounds();
    let mut axes: [Vec<f32>; 3] = Default::default();
    for (axis, values) in axes.iter_mut().enumerate() {
        let n = counts[axis];
        *values = match *mode {
            TranslationMode::Uniform { .. } => (0..n)
                .map(|k| (k + 1) as f32 / (n + 1) as f32 * (max[axis] - min[axis]) + min[axis])
                .collect(),
            TranslationMode::Manual {
                min: low, max: high, ..
            } => {
                if n == 1 {
                    vec![(low[axis] + high[axis]) / 2.0]
                } else {
                    linspace(low[axis], high[axis], n)
                }
            }
            _ => {
                let sorted = cloud.sorted_axis(axis);
                quantile_splits(n)
                    .into_iter()
                    .map(|q| quantile(&sorted, q))
                    .collect()
            }
        };
    }
    axes
}

/// Quantiles at which a quantile grid samples an axis with `n` points: evenly
/// spaced strictly inside `(0, 1)` while their gap exceeds 0.1, and spread over
/// `[0.1, 0.9]` otherwise.
fn quantile_splits(n: usize) -> Vec<f32> {
    if 1.0 / (n + 1) as f32 > 0.1 {
        (0..n).map(|k| (k + 1) as f32 / (n + 1) as f32).collect()
    } else {
        linspace(0.1, 0.9, n)
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f32, end: f32, n: usize) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|k| start + (end - start) * k as f32 / (n - 1) as f32)
            .collect(),
    }
}

/// Every combination of the axis values, x varying slowest.
fn meshgrid(axes: &[Vec<f32>; 3]) -> Vec<Vector3<f32>> {
    iproduct!(axes[0].iter(), axes[1].iter(), axes[2].iter())
        .map(|(&x, &y, &z)| Vector3::new(x, y, z))
        .collect()
}

/// A `num_split^3` grid of translations spanning `range` along every axis,
/// centered on `center`.
pub fn translation_candidates_around(
    center: &Vector3<f32>,
    range: f32,
    num_split: usize,
) -> Vec<Vector3<f32>> {
    let axes = [0, 1, 2].map(|axis| linspace(center[axis] - range / 2.0, center[axis] + range / 2.0, num_split));
    meshgrid(&axes)
}
