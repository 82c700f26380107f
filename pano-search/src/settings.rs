use crate::Statistic;
use pano_render::{GroupMinimum, PatchGrid, ScatterMinimum, SortSegmentMinimum, DEFAULT_BINS};
#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Rows of patches cleared at the top and bottom of a 2d score map, where the
/// panorama is stretched the most.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Margin {
    /// The same number of rows at the top and the bottom.
    Symmetric(usize),
    /// `top` rows at the top and `bottom` rows at the bottom.
    Split { top: usize, bottom: usize },
}

impl Margin {
    /// `(top, bottom)` rows to clear.
    pub fn rows(self) -> (usize, usize) {
        match self {
            Margin::Symmetric(rows) => (rows, rows),
            Margin::Split { top, bottom } => (top, bottom),
        }
    }
}

/// Which [`GroupMinimum`] resolves occlusion between points sharing a pixel.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OcclusionFilter {
    Scatter,
    SortSegment,
}

impl OcclusionFilter {
    pub fn group_minimum(self) -> &'static dyn GroupMinimum {
        match self {
            OcclusionFilter::Scatter => &ScatterMinimum,
            OcclusionFilter::SortSegment => &SortSegmentMinimum,
        }
    }
}

/// The settings shared by the pose search strategies.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SearchSettings {
    /// The number of patch rows the panorama is split into
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_split_rows"))]
    pub split_rows: usize,
    /// The number of patch columns the panorama is split into
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_split_cols"))]
    pub split_cols: usize,
    /// The number of histogram bins per color channel
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_bins"))]
    pub bins: usize,
    /// How per-patch intersections are reduced to one score
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub statistic: Statistic,
    /// The lower rank cutoff of the robust statistics
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_low_cutoff"))]
    pub low_cutoff: f32,
    /// The upper rank cutoff of the robust statistics
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_high_cutoff"))]
    pub high_cutoff: f32,
    /// The number of poses kept by a search
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_top_n"))]
    pub top_n: usize,
    /// The number of poses the sampling loss keeps before the histogram pass of the hybrid search
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_num_intermediate")
    )]
    pub num_intermediate: usize,
    /// Weight each patch by the sine of its polar angle
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub use_sin_weight: bool,
    /// Rows of the 2d score map cleared at the poles, `None` to keep every row
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub margin: Option<Margin>,
    /// Drop points hidden behind nearer points before computing the sampling loss
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub occlusion_filter: Option<OcclusionFilter>,
}

impl SearchSettings {
    pub fn patch_grid(&self) -> PatchGrid {
        PatchGrid::new(self.split_rows, self.split_cols)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            split_rows: default_split_rows(),
            split_cols: default_split_cols(),
            bins: default_bins(),
            statistic: Statistic::default(),
            low_cutoff: default_low_cutoff(),
            high_cutoff: default_high_cutoff(),
            top_n: default_top_n(),
            num_intermediate: default_num_intermediate(),
            use_sin_weight: false,
            margin: None,
            occlusion_filter: None,
        }
    }
}

fn default_split_rows() -> usize {
    8
}

fn default_split_cols() -> usize {
    16
}

fn default_bins() -> usize {
    DEFAULT_BINS
}

fn default_low_cutoff() -> f32 {
    0.25
}

fn default_high_cutoff() -> f32 {
    0.75
}

fn default_top_n() -> usize {
    10
}

fn default_num_intermediate() -> usize {
    100
}
