//! Adaptive octree partitioning of a point cloud into candidate camera positions.
//!
//! The bounding box of the cloud is split in half along every axis, level by
//! level. Each axis gets its own depth, longer axes more, so that leaves stay
//! close to cubic even in elongated rooms. Leaves that contain no point are
//! gathered, complete groups of empty siblings are collapsed into their
//! parent, and empty cells lying beyond the occupied neighbourhood of their
//! closest occupied ancestor are discarded. The centers of the remaining
//! empty cells are places a camera could have been: free space enclosed by
//! the scanned surfaces.
//!
//! ```text
//!   +-------+-------+---------------+
//!   | . . . |       |               |
//!   +---+---+   o   |       o       |     . occupied leaf
//!   | . | o |       |               |     o interior cell center
//!   +---+---+-------+-------+-------+
//!   |       |       |       | . . . |
//!   |   o   |   o   |   o   +---+---+
//!   |       |       |       | o | . |
//!   +-------+-------+-------+---+---+
//! ```
//!
//! The partitioner is generic over the dimension. [`generate_octree`] runs it
//! over the full 3d cloud and [`generate_octree_2d`] over a horizontal slice
//! of the cloud for a camera known to sit at a fixed height.

mod code;
mod partition;
mod schedule;

pub use code::{CodeTable, MERGED};
pub use partition::Partition;
pub use schedule::AxisSchedule;

use pano_core::{nalgebra::Point3, Error, PointCloud, Result};

/// Depth rules for [`Partition::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeConfig {
    /// Depth of the axis with the smallest extent.
    pub base_depth: u32,
    /// Every axis gets one more level if the tree would have fewer leaves.
    pub min_leaves: Option<u64>,
    /// Upper limit on the depth of a single axis.
    pub max_axis_depth: Option<u32>,
    /// Upper limit on the summed depth of all axes, so the tree has at most
    /// `2^max_total_depth` leaves.
    pub max_total_depth: u32,
    /// Half thickness of the horizontal slice used by [`generate_octree_2d`].
    pub slice_half_width: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            base_depth: 2,
            min_leaves: Some(256),
            max_axis_depth: None,
            max_total_depth: 24,
            slice_half_width: 0.2,
        }
    }
}

impl OctreeConfig {
    /// Rules for the planar variant: deeper base, no leaf minimum and each
    /// axis capped at 8 levels.
    pub fn planar() -> Self {
        Self {
            base_depth: 4,
            min_leaves: None,
            max_axis_depth: Some(8),
            ..Self::default()
        }
    }
}

/// Candidate positions inside the free space of `cloud`.
pub fn generate_octree(cloud: &PointCloud, config: &OctreeConfig) -> Result<Vec<Point3<f32>>> {
    let points: Vec<[f32; 3]> = cloud.positions().iter().map(|p| [p.x, p.y, p.z]).collect();
    let partition = Partition::build(&points, config)?;
    Ok(partition
        .interior_centers()
        .into_iter()
        .map(Point3::from)
        .collect())
}

/// Candidate positions at a fixed `height`, found by partitioning the points
/// whose z lies strictly within `config.slice_half_width` of it.
pub fn generate_octree_2d(
    cloud: &PointCloud,
    height: f32,
    config: &OctreeConfig,
) -> Result<Vec<Point3<f32>>> {
    let half_width = config.slice_half_width;
    let points: Vec<[f32; 2]> = cloud
        .positions()
        .iter()
        .filter(|p| p.z > height - half_width && p.z < height + half_width)
        .map(|p| [p.x, p.y])
        .collect();
    if points.is_empty() {
        return Err(Error::InvalidConfig(format!(
            "no points within {} of height {}",
            half_width, height
        )));
    }
    let partition = Partition::build(&points, config)?;
    Ok(partition
        .interior_centers()
        .into_iter()
        .map(|[x, y]| Point3::new(x, y, height))
        .collect())
}
