use crate::{
    rank::{best_indices, Order},
    sampling::lowest_loss_poses,
    scorer::{check_candidates, Reference},
    Pose, RankedPose, SearchSettings,
};
use log::{debug, info};
use ndarray::{s, Array2, ArrayView3};
use pano_core::{nalgebra::Vector3, Error, PointCloud, Result, Ypr};
use pano_render::{intersection, joint_mask, render, Background, Panorama, PatchHistograms};

/// Histogram similarity of one pose, rendering the cloud at the full pose.
///
/// The top and bottom patch rows are skipped. Within a row, patches are
/// compared left to right until one with no pixels to compare on either
/// side, which ends the row. The sum of the intersections is divided by the
/// total number of patches.
fn direct_score(
    image: &Panorama,
    reference: &Reference,
    cloud: &PointCloud,
    pose: &Pose,
    settings: &SearchSettings,
) -> Result<f32> {
    let grid = settings.patch_grid();
    let points = cloud.relative_to(&pose.translation, &pose.rotation.rotation());
    let synthetic = render(&points, cloud.colors(), image.dim(), Background::Black)?;
    let mask = joint_mask(&synthetic, image)?;
    let synthetic = PatchHistograms::new(&synthetic, &mask, grid, settings.bins)?;
    let real = &reference.histograms;

    let mut splits = Array2::<f32>::zeros((grid.rows, grid.cols));
    for row in 1..grid.rows.saturating_sub(1) {
        for col in 0..grid.cols {
            if synthetic.counts()[[row, col]] == 0 || real.counts()[[row, col]] == 0 {
                break;
            }
            splits[[row, col]] =
                intersection(patch(&synthetic, row, col), patch(real, row, col))[[0, 0]];
        }
    }
    splits.mapv_inplace(|split| if split.is_nan() { 0.0 } else { split });
    Ok(splits.sum() / grid.len() as f32)
}

fn patch(histograms: &PatchHistograms, row: usize, col: usize) -> ArrayView3<'_, f32> {
    histograms
        .view()
        .slice_move(s![row..row + 1, col..col + 1, ..])
}

/// Rescores `candidates` by rendering every pose in full and comparing patch
/// histograms, keeping the `settings.top_n` best, best first.
///
/// Slower than [`histogram_pose_search`](crate::histogram_pose_search) since
/// nothing is shared between rotations, so it is meant for short lists.
/// Candidate indices are carried over and scores replaced.
pub fn direct_histogram_pose_search(
    image: &Panorama,
    cloud: &PointCloud,
    candidates: &[RankedPose],
    settings: &SearchSettings,
) -> Result<Vec<RankedPose>> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidates("pose"));
    }
    let reference = Reference::new(image, settings.patch_grid(), settings.bins)?;
    let scores = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            debug!("rendering candidate {} of {}", index + 1, candidates.len());
            direct_score(image, &reference, cloud, &candidate.pose, settings)
        })
        .collect::<Result<Vec<f32>>>()?;

    let ranked: Vec<RankedPose> = best_indices(&scores, settings.top_n, Order::HighestFirst)
        .into_iter()
        .map(|index| RankedPose {
            score: scores[index],
            ..candidates[index]
        })
        .collect();
    if let Some(best) = ranked.first() {
        info!(
            "best of {} rendered candidates scored {} at translation {:?} rotation {:?}",
            candidates.len(),
            best.score,
            best.pose.translation,
            best.pose.rotation
        );
    }
    Ok(ranked)
}

/// Shrinks every combination of translation and rotation to
/// `settings.num_intermediate` poses by sampling loss, then keeps the
/// `settings.top_n` best of those by [`direct_histogram_pose_search`].
pub fn hybrid_pose_search(
    image: &Panorama,
    cloud: &PointCloud,
    translations: &[Vector3<f32>],
    rotations: &[Ypr],
    settings: &SearchSettings,
) -> Result<Vec<RankedPose>> {
    check_candidates(translations, rotations)?;
    let intermediate = lowest_loss_poses(
        image,
        cloud,
        translations,
        rotations,
        settings,
        settings.num_intermediate,
    )?;
    debug!("{} poses survived the sampling loss", intermediate.len());
    direct_histogram_pose_search(image, cloud, &intermediate, settings)
}
