use crate::{
    scorer::{
        canonical_render, check_candidates, patch_grids, rotated_intersection, synthetic_histograms,
        Reference,
    },
    SearchSettings,
};
use log::{debug, info};
use ndarray::{s, Array2, ArrayView2, ArrayViewMut2, Zip};
use pano_core::{nalgebra::Vector3, GridDirection, PointCloud, Result, Ypr};
use pano_render::Panorama;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// How well each patch of `image` is explained by the cloud at any of the
/// candidate poses.
///
/// Each patch keeps its highest histogram intersection over every
/// translation and rotation. Rows inside `settings.margin` of the poles are
/// then cleared and the remaining rows smoothed with a 3 x 3 mean that only
/// counts cells inside those rows. Patches of moving objects or scene changes
/// end up with low scores.
///
/// Returns a `(split_rows, split_cols)` map.
pub fn score_map_2d(
    image: &Panorama,
    cloud: &PointCloud,
    translations: &[Vector3<f32>],
    rotations: &[Ypr],
    settings: &SearchSettings,
) -> Result<Array2<f32>> {
    check_candidates(translations, rotations)?;
    let grid = settings.patch_grid();
    let reference = Reference::new(image, grid, settings.bins)?;
    let grids = patch_grids(rotations, grid, GridDirection::Forward);

    let best_of_translation = |(index, translation): (usize, &Vector3<f32>)| -> Result<Array2<f32>> {
        let (render, _) = canonical_render(cloud, translation, image.dim())?;
        let canonical = synthetic_histograms(&render, &reference, grid, settings.bins)?;
        let mut best = Array2::<f32>::zeros((grid.rows, grid.cols));
        for grid in &grids {
            let intersection = rotated_intersection(&canonical, grid, &reference);
            Zip::from(&mut best)
                .and(&intersection)
                .for_each(|best, &value| *best = best.max(value));
        }
        debug!("mapped translation {} of {}", index + 1, translations.len());
        Ok(best)
    };

    #[cfg(not(feature = "rayon"))]
    let maps = translations
        .iter()
        .enumerate()
        .map(best_of_translation)
        .collect::<Result<Vec<_>>>()?;
    #[cfg(feature = "rayon")]
    let maps = translations
        .par_iter()
        .enumerate()
        .map(best_of_translation)
        .collect::<Result<Vec<_>>>()?;

    let mut scores = Array2::<f32>::zeros((grid.rows, grid.cols));
    for map in &maps {
        Zip::from(&mut scores)
            .and(map)
            .for_each(|score, &value| *score = score.max(value));
    }

    let (top, bottom) = settings.margin.map_or((0, 0), |margin| margin.rows());
    let end = grid.rows.saturating_sub(bottom).max(top.min(grid.rows));
    let top = top.min(end);
    scores.slice_mut(s![..top, ..]).fill(0.0);
    scores.slice_mut(s![end.., ..]).fill(0.0);
    mean_pool_3x3(scores.slice_mut(s![top..end, ..]));
    info!(
        "2d score map over {} poses, mean score {}",
        translations.len() * rotations.len(),
        scores.mean().unwrap_or(0.0)
    );
    Ok(scores)
}

/// Replaces every cell with the mean of its 3 x 3 neighbourhood, counting only
/// neighbours inside the array.
fn mean_pool_3x3(mut values: ArrayViewMut2<f32>) {
    let (rows, cols) = values.dim();
    let source = values.to_owned();
    for ((row, col), value) in values.indexed_iter_mut() {
        let window = source.slice(s![
            row.saturating_sub(1)..(row + 2).min(rows),
            col.saturating_sub(1)..(col + 2).min(cols)
        ]);
        *value = window.sum() / window.len() as f32;
    }
}

/// Nearest neighbour upsampling of a patch score map to `(height, width)`
/// pixels. Output pixel `(i, j)` reads cell `(i * rows / height, j * cols / width)`.
pub fn upsample_scores(scores: ArrayView2<f32>, (height, width): (usize, usize)) -> Array2<f32> {
    let (rows, cols) = scores.dim();
    Array2::from_shape_fn((height, width), |(row, col)| {
        scores[[row * rows / height, col * cols / width]]
    })
}

/// Pixels of a `(height, width)` image whose patch scored at least
/// `threshold`.
pub fn inlier_mask(
    scores: ArrayView2<f32>,
    (height, width): (usize, usize),
    threshold: f32,
) -> Array2<bool> {
    upsample_scores(scores, (height, width)).mapv(|score| score >= threshold)
}
