//! Pieces shared by the searches that compare patch histograms.

use crate::SearchSettings;
use ndarray::{Array2, ArrayView2};
use pano_core::{
    nalgebra::Vector3, polar_sin_weights, Error, GridDirection, PointCloud, Result,
    SamplingGrid, Ypr,
};
use pano_render::{
    render_projected, warp, Background, Interpolation, Padding, Panorama, PatchGrid,
    PatchHistograms, Projection,
};

/// Patch histograms of a real panorama together with its valid pixels.
#[derive(Debug, Clone)]
pub(crate) struct Reference {
    pub mask: Vec<bool>,
    pub histograms: PatchHistograms,
}

impl Reference {
    pub fn new(image: &Panorama, grid: PatchGrid, bins: usize) -> Result<Self> {
        let mask = image.valid_mask();
        let histograms = PatchHistograms::new(image, &mask, grid, bins)?;
        Ok(Self { mask, histograms })
    }
}

pub(crate) fn check_candidates(translations: &[Vector3<f32>], rotations: &[Ypr]) -> Result<()> {
    if translations.is_empty() {
        return Err(Error::EmptyCandidates("translation"));
    }
    if rotations.is_empty() {
        return Err(Error::EmptyCandidates("rotation"));
    }
    Ok(())
}

/// Sampling grids of every rotation at patch resolution.
pub(crate) fn patch_grids(rotations: &[Ypr], grid: PatchGrid, direction: GridDirection) -> Vec<SamplingGrid> {
    rotations
        .iter()
        .map(|&ypr| SamplingGrid::new(ypr, grid.rows, grid.cols, direction))
        .collect()
}

/// Panorama seen from `translation` with the identity rotation.
pub(crate) fn canonical_render(
    cloud: &PointCloud,
    translation: &Vector3<f32>,
    resolution: (usize, usize),
) -> Result<(Panorama, Projection)> {
    render_projected(
        &cloud.translated(translation),
        cloud.colors(),
        resolution,
        Background::Black,
    )
}

/// Histograms of a synthetic panorama over the pixels valid in both it and
/// the reference.
pub(crate) fn synthetic_histograms(
    render: &Panorama,
    reference: &Reference,
    grid: PatchGrid,
    bins: usize,
) -> Result<PatchHistograms> {
    let mask: Vec<bool> = render
        .valid_mask()
        .into_iter()
        .zip(&reference.mask)
        .map(|(valid, &real)| valid && real)
        .collect();
    PatchHistograms::new(render, &mask, grid, bins)
}

/// Per-patch intersection of the reference with the canonical histograms
/// moved to where a rotated camera would see them.
pub(crate) fn rotated_intersection(
    canonical: &PatchHistograms,
    grid: &SamplingGrid,
    reference: &Reference,
) -> Array2<f32> {
    let warped = warp(
        canonical.view(),
        grid,
        Interpolation::Nearest,
        Padding::Reflection,
    );
    reference.histograms.intersection(warped.view())
}

/// Per-patch weights from the polar sine and a caller supplied map:
/// the sine alone, their average when both are given, or the map alone.
pub(crate) fn patch_weights(
    settings: &SearchSettings,
    weight_map: Option<ArrayView2<f32>>,
) -> Result<Option<Array2<f32>>> {
    let shape = (settings.split_rows, settings.split_cols);
    if let Some(map) = &weight_map {
        if map.dim() != shape {
            return Err(Error::InvalidConfig(format!(
                "patch weight map is {:?}, expected {:?}",
                map.dim(),
                shape
            )));
        }
    }
    let sin = settings.use_sin_weight.then(|| {
        Array2::from_shape_vec(shape, polar_sin_weights(shape.0, shape.1))
            .expect("one weight per patch")
    });
    Ok(match (sin, weight_map) {
        (Some(sin), Some(map)) => Some(sin * 0.5 + &map * 0.5),
        (Some(sin), None) => Some(sin),
        (None, Some(map)) => Some(map.to_owned()),
        (None, None) => None,
    })
}
