use crate::{
    code::{empty_leaves, merge_empty, CodeTable, MERGED},
    AxisSchedule, OctreeConfig,
};
use float_ord::FloatOrd;
use log::debug;
use pano_core::{Error, Result};
use std::collections::BTreeSet;

/// Adaptive octree over a set of `D`-dimensional points.
///
/// Building the partition assigns every point to a leaf, collapses complete
/// groups of empty leaves and drops empty cells that lie outside the region
/// spanned by the occupied cells of their closest occupied ancestor. The
/// centers of what remains are the candidate positions.
#[derive(Debug, Clone)]
pub struct Partition<const D: usize> {
    center: [f32; D],
    schedule: AxisSchedule<D>,
    occupied: Vec<Vec<i8>>,
    empty: CodeTable,
    interior: CodeTable,
}

/// Per-point cell descent, advanced one level at a time.
struct Descent<const D: usize> {
    planes: Vec<[f32; D]>,
    codes: Vec<Vec<i8>>,
}

impl<const D: usize> Descent<D> {
    fn new(points: usize, depth: usize) -> Self {
        Self {
            planes: vec![[0.0; D]; points],
            codes: vec![vec![0; depth]; points],
        }
    }

    /// Records the child taken at `level` and moves each splitting plane to
    /// the center of that child.
    fn descend(mut self, points: &[[f32; D]], schedule: &AxisSchedule<D>, level: usize) -> Self {
        for ((point, plane), code) in points
            .iter()
            .zip(self.planes.iter_mut())
            .zip(self.codes.iter_mut())
        {
            let mut child = 0i8;
            for (bit, axis) in schedule.active_axes(level).enumerate() {
                if point[axis] >= plane[axis] {
                    child |= 1 << bit;
                }
            }
            code[level] = child;
            for (bit, axis) in schedule.active_axes(level).enumerate() {
                let sign = if child >> bit & 1 == 1 { 1.0 } else { -1.0 };
                plane[axis] += sign * schedule.step(axis, level);
            }
        }
        self
    }
}

impl<const D: usize> Partition<D> {
    pub fn build(points: &[[f32; D]], config: &OctreeConfig) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyCloud);
        }
        let mut min = [f32::INFINITY; D];
        let mut max = [f32::NEG_INFINITY; D];
        for point in points {
            for axis in 0..D {
                min[axis] = min[axis].min(point[axis]);
                max[axis] = max[axis].max(point[axis]);
            }
        }
        let mut center = [0.0; D];
        let mut half_extents = [0.0; D];
        for axis in 0..D {
            center[axis] = (min[axis] + max[axis]) / 2.0;
            half_extents[axis] = (max[axis] - center[axis]).abs();
        }
        let schedule = AxisSchedule::new(half_extents, config)?;

        let relative: Vec<[f32; D]> = points
            .iter()
            .map(|point| {
                let mut offset = [0.0; D];
                for axis in 0..D {
                    offset[axis] = point[axis] - center[axis];
                }
                offset
            })
            .collect();
        let depth = schedule.max_depth();
        let descent = (0..depth).fold(Descent::new(relative.len(), depth), |descent, level| {
            descent.descend(&relative, &schedule, level)
        });
        let occupied: Vec<Vec<i8>> = descent
            .codes
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut empty = empty_leaves(&schedule, &occupied);
        merge_empty(&mut empty, &schedule);

        let mut interior = CodeTable::new(depth);
        for code in empty.rows() {
            if is_interior(code, &occupied, &schedule) {
                interior.push(code);
            }
        }
        debug!(
            "octree with axis depths {:?}: {} occupied leaves, {} empty cells, {} interior",
            schedule.depths(),
            occupied.len(),
            empty.len(),
            interior.len()
        );

        Ok(Self {
            center,
            schedule,
            occupied,
            empty,
            interior,
        })
    }

    pub fn schedule(&self) -> &AxisSchedule<D> {
        &self.schedule
    }

    /// Center of the bounding box of the input points.
    pub fn center(&self) -> [f32; D] {
        self.center
    }

    /// Distinct leaf codes holding at least one point, sorted.
    pub fn occupied_codes(&self) -> &[Vec<i8>] {
        &self.occupied
    }

    /// Empty cells after collapsing complete sibling groups.
    pub fn empty_codes(&self) -> &CodeTable {
        &self.empty
    }

    /// Empty cells surrounded by occupied space.
    pub fn interior_codes(&self) -> &CodeTable {
        &self.interior
    }

    /// World-space center of a cell.
    pub fn cell_center(&self, code: &[i8]) -> [f32; D] {
        let mut position = self.center;
        for (level, &child) in code.iter().enumerate() {
            if child == MERGED {
                continue;
            }
            for (bit, axis) in self.schedule.active_axes(level).enumerate() {
                let sign = if child >> bit & 1 == 1 { 1.0 } else { -1.0 };
                position[axis] += sign * self.schedule.step(axis, level);
            }
        }
        position
    }

    /// Centers of the interior cells, sorted lexicographically and deduplicated.
    pub fn interior_centers(&self) -> Vec<[f32; D]> {
        let mut centers: Vec<[f32; D]> = self
            .interior
            .rows()
            .map(|code| self.cell_center(code))
            .collect();
        centers.sort_by_key(|center| center.map(FloatOrd));
        centers.dedup();
        centers
    }
}

/// Integer location of a cell relative to the tree center, accumulated over
/// levels `0..=depth`. Level `k` contributes `±2^(max_depth - k)` on every
/// axis subdividing there.
fn cell_location<const D: usize>(code: &[i8], depth: usize, schedule: &AxisSchedule<D>) -> [i64; D] {
    let max_depth = schedule.max_depth();
    let mut location = [0i64; D];
    for (level, &child) in code.iter().enumerate().take(depth + 1) {
        if child == MERGED {
            continue;
        }
        let weight = 1i64 << (max_depth - level);
        for (bit, axis) in schedule.active_axes(level).enumerate() {
            location[axis] += if child >> bit & 1 == 1 { weight } else { -weight };
        }
    }
    location
}

/// Decides whether an empty cell lies within the span of the occupied leaves
/// that share its longest common code prefix.
///
/// A cell with no occupied leaf in its top level octant is outside. Otherwise
/// the cell is outside when, along some axis, it lies beyond the extreme
/// occupied sibling on the side away from the tree center.
fn is_interior<const D: usize>(empty: &[i8], occupied: &[Vec<i8>], schedule: &AxisSchedule<D>) -> bool {
    let max_depth = schedule.max_depth();
    let (mut low, mut high) = (0, occupied.len());
    let mut depth = 0;
    while depth < max_depth {
        let candidates = &occupied[low..high];
        let start = candidates.partition_point(|code| code[depth] < empty[depth]);
        let end = candidates.partition_point(|code| code[depth] <= empty[depth]);
        if start == end {
            break;
        }
        high = low + end;
        low += start;
        depth += 1;
    }
    if depth == 0 || depth == max_depth {
        return false;
    }

    let empty_location = cell_location(empty, depth, schedule);
    let mut max_location = [i64::MIN; D];
    let mut min_location = [i64::MAX; D];
    for code in &occupied[low..high] {
        let location = cell_location(code, depth, schedule);
        for axis in 0..D {
            max_location[axis] = max_location[axis].max(location[axis]);
            min_location[axis] = min_location[axis].min(location[axis]);
        }
    }
    (0..D).all(|axis| {
        let beyond_max = max_location[axis] > 0 && max_location[axis] < empty_location[axis];
        let beyond_min = min_location[axis] < 0 && min_location[axis] > empty_location[axis];
        !beyond_max && !beyond_min
    })
}
