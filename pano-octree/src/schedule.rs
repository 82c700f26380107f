use crate::OctreeConfig;
use pano_core::{Error, Result};

/// Per-axis subdivision depths of an adaptive octree.
///
/// Every axis is split in half at each level until it reaches its own depth,
/// after which it stops subdividing. Longer axes get deeper, so cells stay
/// roughly cubic. The branching factor at a level is `2^k` where `k` is the
/// number of axes still subdividing, so in 3d it degrades from 8 to 4 to 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSchedule<const D: usize> {
    depths: [u32; D],
    half_extents: [f32; D],
}

impl<const D: usize> AxisSchedule<D> {
    /// Derives the depths from the half extents of the bounding box.
    ///
    /// The axis with the smallest extent gets exactly `config.base_depth`
    /// levels, the others `ceil(base_depth * sqrt(extent / min_extent) - 0.2)`.
    pub fn new(half_extents: [f32; D], config: &OctreeConfig) -> Result<Self> {
        for (axis, &half) in half_extents.iter().enumerate() {
            if !(half > 0.0 && half.is_finite()) {
                return Err(Error::DegenerateAxis { axis });
            }
        }
        let min_root = half_extents
            .iter()
            .map(|half| half.sqrt())
            .fold(f32::INFINITY, f32::min);
        let mut depths = half_extents.map(|half| {
            (config.base_depth as f32 * half.sqrt() / min_root - 0.2)
                .ceil()
                .max(1.0) as u32
        });

        if let Some(min_leaves) = config.min_leaves {
            let total: u32 = depths.iter().sum();
            if total < 64 && (1u64 << total) < min_leaves {
                depths.iter_mut().for_each(|depth| *depth += 1);
            }
        }
        if let Some(cap) = config.max_axis_depth {
            depths.iter_mut().for_each(|depth| *depth = (*depth).min(cap));
        }

        let total: u32 = depths.iter().sum();
        if total > config.max_total_depth {
            return Err(Error::OctreeTooDeep {
                depth: total,
                limit: config.max_total_depth,
            });
        }
        Ok(Self {
            depths,
            half_extents,
        })
    }

    pub fn depths(&self) -> [u32; D] {
        self.depths
    }

    /// Length of every cell code, the depth of the deepest axis.
    pub fn max_depth(&self) -> usize {
        self.depths.iter().copied().max().unwrap_or(0) as usize
    }

    /// Axes that are still being subdivided at `level`, in axis order.
    ///
    /// The `i`th axis yielded here owns bit `i` of the cell index at that level.
    pub fn active_axes(&self, level: usize) -> impl Iterator<Item = usize> + '_ {
        (0..D).filter(move |&axis| self.depths[axis] as usize > level)
    }

    /// Number of children of a cell at `level`.
    pub fn branching(&self, level: usize) -> usize {
        1 << self.active_axes(level).count()
    }

    /// Number of leaves under a cell whose code is fixed for the first `level`
    /// levels. A group of that many empty sibling leaves collapses into one cell.
    pub fn leaves_below(&self, level: usize) -> u64 {
        (level..self.max_depth())
            .map(|level| self.branching(level) as u64)
            .product()
    }

    /// Number of leaves of the whole tree.
    pub fn leaf_count(&self) -> u64 {
        self.leaves_below(0)
    }

    /// Distance from a cell center at `level` to the centers of its children
    /// along `axis`.
    pub fn step(&self, axis: usize, level: usize) -> f32 {
        self.half_extents[axis] * 0.5f32.powi(level as i32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smallest_axis_gets_base_depth() {
        let schedule = AxisSchedule::new([1.0, 4.0, 16.0], &OctreeConfig::default()).unwrap();
        // sqrt ratios 1, 2, 4 -> ceil(2 - 0.2), ceil(4 - 0.2), ceil(8 - 0.2)
        assert_eq!(schedule.depths(), [2, 4, 8]);
        assert_eq!(schedule.max_depth(), 8);
        assert_eq!(schedule.branching(0), 8);
        assert_eq!(schedule.branching(2), 4);
        assert_eq!(schedule.branching(4), 2);
    }

    #[test]
    fn small_trees_get_an_extra_level() {
        let schedule = AxisSchedule::new([2.0, 2.0, 2.0], &OctreeConfig::default()).unwrap();
        // 2^(2 + 2 + 2) = 64 leaves is below the minimum of 256.
        assert_eq!(schedule.depths(), [3, 3, 3]);
        assert_eq!(schedule.leaf_count(), 512);
    }

    #[test]
    fn planar_depth_is_capped() {
        let schedule = AxisSchedule::new([1.0, 100.0], &OctreeConfig::planar()).unwrap();
        assert_eq!(schedule.depths(), [4, 8]);
    }

    #[test]
    fn zero_extent_axis_is_an_error() {
        let result = AxisSchedule::new([1.0, 0.0, 1.0], &OctreeConfig::default());
        assert!(matches!(result, Err(Error::DegenerateAxis { axis: 1 })));
    }

    #[test]
    fn extreme_aspect_ratio_is_an_error() {
        let result = AxisSchedule::new([1e-3, 1e3, 1e3], &OctreeConfig::default());
        assert!(matches!(result, Err(Error::OctreeTooDeep { .. })));
    }

    /// The merge threshold written out for three axes with depths
    /// `nmin <= nmed <= nmax` at code prefix length `j`.
    fn closed_form_merge_count(j: u32, nmin: u32, nmed: u32, nmax: u32) -> u64 {
        let i = nmax - 1 - j;
        if j < nmin {
            2u64.pow(nmax - nmed) * 4u64.pow(nmed - nmin) * 8u64.pow(i + nmin + 1 - nmax)
        } else if j < nmed {
            2u64.pow(nmax - nmed) * 4u64.pow(i + nmed + 1 - nmax)
        } else {
            2u64.pow(i + 1)
        }
    }

    #[test]
    fn leaves_below_matches_branching_schedule() {
        let config = OctreeConfig::default();
        for extents in [[1.0, 4.0, 16.0], [1.0, 1.0, 9.0], [3.0, 1.0, 3.0], [2.0, 5.0, 3.0]] {
            let schedule = AxisSchedule::new(extents, &config).unwrap();
            let mut depths = schedule.depths();
            depths.sort_unstable();
            let [nmin, nmed, nmax] = depths;
            for j in 1..nmax {
                assert_eq!(
                    schedule.leaves_below(j as usize),
                    closed_form_merge_count(j, nmin, nmed, nmax),
                    "extents {:?} at level {}",
                    extents,
                    j
                );
            }
        }
    }
}
