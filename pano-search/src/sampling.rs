use crate::{
    rank::{rank_table, Order},
    scorer::check_candidates,
    RankedPose, SearchSettings,
};
use log::{debug, info};
use ndarray::{Array2, ArrayView3, Axis};
use pano_core::{nalgebra::Vector3, sphere, PointCloud, Result, Ypr};
use pano_render::{sample, visible_points, GroupMinimum, Interpolation, Padding, Panorama};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Mean color distance between the points of `cloud` seen from a pose and the
/// pixels of `image` they project to.
///
/// Only points landing on a non-empty pixel count. A pose where none do, or
/// whose loss is not a number, gets an infinite loss.
fn sampling_loss(
    image: ArrayView3<f32>,
    cloud: &PointCloud,
    translation: &Vector3<f32>,
    rotation: Ypr,
    group_minimum: Option<&dyn GroupMinimum>,
) -> f32 {
    let points = cloud.relative_to(translation, &rotation.rotation());
    let mut coords: Vec<_> = points.iter().map(sphere::project).collect();
    let mut colors: Vec<Vector3<f32>> = cloud.colors().to_vec();
    if let Some(group_minimum) = group_minimum {
        let depths: Vec<f32> = points.iter().map(|point| point.norm()).collect();
        let (height, width, _) = image.dim();
        let visible = visible_points(&coords, &depths, (height, width), group_minimum);
        coords = visible.iter().map(|&index| coords[index]).collect();
        colors = visible.iter().map(|&index| colors[index]).collect();
    }

    let samples = sample(image, &coords, Interpolation::Bilinear, Padding::Zeros);
    let (total, count) = samples
        .axis_iter(Axis(0))
        .zip(&colors)
        .filter(|(sampled, _)| sampled.iter().any(|&channel| channel != 0.0))
        .fold((0.0f32, 0usize), |(total, count), (sampled, color)| {
            let distance = Vector3::new(sampled[0], sampled[1], sampled[2]) - color;
            (total + distance.norm(), count + 1)
        });
    let loss = total / count as f32;
    if count == 0 || loss.is_nan() {
        f32::INFINITY
    } else {
        loss
    }
}

/// The sampling loss of every combination of translation and rotation as a
/// `(translations, rotations)` table where lower is better.
///
/// This is much cheaper than rendering, at the cost of ignoring which points
/// hide others unless `settings.occlusion_filter` is set.
pub fn sampling_loss_table(
    image: &Panorama,
    cloud: &PointCloud,
    translations: &[Vector3<f32>],
    rotations: &[Ypr],
    settings: &SearchSettings,
) -> Result<Array2<f32>> {
    check_candidates(translations, rotations)?;
    let source = image.ref_array3();
    let group_minimum = settings.occlusion_filter.map(|filter| filter.group_minimum());

    let score_translation = |(index, translation): (usize, &Vector3<f32>)| -> Vec<f32> {
        let losses = rotations
            .iter()
            .map(|&rotation| sampling_loss(source, cloud, translation, rotation, group_minimum))
            .collect();
        debug!("sampled translation {} of {}", index + 1, translations.len());
        losses
    };

    #[cfg(not(feature = "rayon"))]
    let rows: Vec<Vec<f32>> = translations.iter().enumerate().map(score_translation).collect();
    #[cfg(feature = "rayon")]
    let rows: Vec<Vec<f32>> = translations.par_iter().enumerate().map(score_translation).collect();

    let table = Array2::from_shape_vec(
        (translations.len(), rotations.len()),
        rows.into_iter().flatten().collect(),
    )
    .expect("one loss per translation and rotation");
    Ok(table)
}

/// The `count` poses of lowest sampling loss, best first.
pub(crate) fn lowest_loss_poses(
    image: &Panorama,
    cloud: &PointCloud,
    translations: &[Vector3<f32>],
    rotations: &[Ypr],
    settings: &SearchSettings,
    count: usize,
) -> Result<Vec<RankedPose>> {
    let table = sampling_loss_table(image, cloud, translations, rotations, settings)?;
    let losses = table
        .as_slice()
        .expect("loss tables are in standard layout");
    let ranked = rank_table(losses, translations, rotations, count, Order::LowestFirst);
    if let Some(best) = ranked.first() {
        info!(
            "lowest sampling loss of {} poses is {} at translation {:?} rotation {:?}",
            losses.len(),
            best.score,
            best.pose.translation,
            best.pose.rotation
        );
    }
    Ok(ranked)
}

/// The `settings.top_n` poses of lowest sampling loss, best first.
pub fn sampling_loss_pose_search(
    image: &Panorama,
    cloud: &PointCloud,
    translations: &[Vector3<f32>],
    rotations: &[Ypr],
    settings: &SearchSettings,
) -> Result<Vec<RankedPose>> {
    lowest_loss_poses(image, cloud, translations, rotations, settings, settings.top_n)
}
