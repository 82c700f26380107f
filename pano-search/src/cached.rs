use crate::{
    rank::{rank_table, Order},
    scorer::{
        canonical_render, check_candidates, patch_grids, patch_weights, rotated_intersection,
        synthetic_histograms, Reference,
    },
    RankedPose, SearchSettings,
};
use log::{debug, info};
use ndarray::{Array2, ArrayView2};
use pano_core::{nalgebra::Vector3, GridDirection, PointCloud, Result, Ypr};
use pano_render::Panorama;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Scores every combination of translation and rotation by comparing patch
/// color histograms of `image` with those of the cloud rendered at the pose.
///
/// The cloud is rendered once per translation. Rotating the camera only moves
/// patches around the sphere, so the histograms of each rotated view are
/// taken from the canonical ones through a nearest neighbour warp instead of
/// another render.
///
/// Returns a `(translations, rotations)` table where higher is better.
pub fn histogram_score_table(
    image: &Panorama,
    cloud: &PointCloud,
    translations: &[Vector3<f32>],
    rotations: &[Ypr],
    settings: &SearchSettings,
    weight_map: Option<ArrayView2<f32>>,
) -> Result<Array2<f32>> {
    check_candidates(translations, rotations)?;
    let grid = settings.patch_grid();
    let reference = Reference::new(image, grid, settings.bins)?;
    let weights = patch_weights(settings, weight_map)?;
    let grids = patch_grids(rotations, grid, GridDirection::Forward);

    let score_translation = |(index, translation): (usize, &Vector3<f32>)| -> Result<Vec<f32>> {
        let (render, _) = canonical_render(cloud, translation, image.dim())?;
        let canonical = synthetic_histograms(&render, &reference, grid, settings.bins)?;
        let scores = grids
            .iter()
            .map(|grid| {
                let mut intersection = rotated_intersection(&canonical, grid, &reference);
                if let Some(weights) = &weights {
                    intersection *= weights;
                }
                settings.statistic.aggregate(
                    intersection
                        .as_slice()
                        .expect("intersections are in standard layout"),
                    settings.low_cutoff,
                    settings.high_cutoff,
                )
            })
            .collect();
        debug!("scored translation {} of {}", index + 1, translations.len());
        Ok(scores)
    };

    #[cfg(not(feature = "rayon"))]
    let rows = translations
        .iter()
        .enumerate()
        .map(score_translation)
        .collect::<Result<Vec<_>>>()?;
    #[cfg(feature = "rayon")]
    let rows = translations
        .par_iter()
        .enumerate()
        .map(score_translation)
        .collect::<Result<Vec<_>>>()?;

    let table = Array2::from_shape_vec(
        (translations.len(), rotations.len()),
        rows.into_iter().flatten().collect(),
    )
    .expect("one score per translation and rotation");
    Ok(table)
}

/// The `settings.top_n` best poses of [`histogram_score_table`], best first.
pub fn histogram_pose_search(
    image: &Panorama,
    cloud: &PointCloud,
    translations: &[Vector3<f32>],
    rotations: &[Ypr],
    settings: &SearchSettings,
    weight_map: Option<ArrayView2<f32>>,
) -> Result<Vec<RankedPose>> {
    let table = histogram_score_table(image, cloud, translations, rotations, settings, weight_map)?;
    let scores = table
        .as_slice()
        .expect("score tables are in standard layout");
    let ranked = rank_table(scores, translations, rotations, settings.top_n, Order::HighestFirst);
    if let Some(best) = ranked.first() {
        info!(
            "best of {} poses scored {} at translation {:?} rotation {:?}",
            scores.len(),
            best.score,
            best.pose.translation,
            best.pose.rotation
        );
    }
    Ok(ranked)
}
