use crate::{
    scorer::{
        canonical_render, check_candidates, patch_grids, rotated_intersection, synthetic_histograms,
        Reference,
    },
    SearchSettings,
};
use float_ord::FloatOrd;
use itertools::Itertools;
use log::{debug, info};
use ndarray::{Array3, Axis};
use pano_core::{nalgebra::Vector3, Error, GridDirection, PointCloud, Result, Ypr};
use pano_render::{color_match, warp, Interpolation, Padding, Panorama};

/// Score ranges narrower than this normalize to all zeros.
const FLAT_RANGE: f32 = 1e-12;

/// How well each point of `cloud` agrees with the query `images`, normalized
/// to `[0, 1]`.
///
/// Every patch intersection of every translation, rotation and image is
/// carried back to the canonical patch layout and credited to the points
/// that fall in that patch, as a running average over all updates. A zero
/// intersection leaves a point's score as it was. Points of objects that have
/// since moved or disappeared end up near zero.
///
/// Images are brought to the size of the first one. With `match_colors` set,
/// each image is first matched to the color distribution of the cloud.
pub fn score_map_3d(
    images: &[Panorama],
    cloud: &PointCloud,
    translations: &[Vector3<f32>],
    rotations: &[Ypr],
    settings: &SearchSettings,
    match_colors: bool,
) -> Result<Vec<f32>> {
    check_candidates(translations, rotations)?;
    let first = images.first().ok_or(Error::EmptyCandidates("query image"))?;
    let resolution = first.dim();
    let grid = settings.patch_grid();
    let queries = images
        .iter()
        .map(|image| {
            let image = if match_colors {
                color_match(image, cloud.colors())
            } else {
                image.clone()
            };
            if image.dim() != resolution {
                image.resized(resolution.0, resolution.1)
            } else {
                image
            }
        })
        .collect_vec();
    let references = queries
        .iter()
        .map(|image| Reference::new(image, grid, settings.bins))
        .collect::<Result<Vec<_>>>()?;
    let forward = patch_grids(rotations, grid, GridDirection::Forward);
    let inverse = patch_grids(rotations, grid, GridDirection::Inverse);

    let mut scores = vec![0.0f32; cloud.len()];
    let mut count = 0usize;
    for (index, translation) in translations.iter().enumerate() {
        let (render, projection) = canonical_render(cloud, translation, resolution)?;
        let patches = projection
            .pixels
            .iter()
            .map(|&(row, col)| (row * grid.rows / resolution.0, col * grid.cols / resolution.1))
            .collect_vec();
        let canonicals = references
            .iter()
            .map(|reference| synthetic_histograms(&render, reference, grid, settings.bins))
            .collect::<Result<Vec<_>>>()?;

        for (forward, inverse) in forward.iter().zip(&inverse) {
            for (canonical, reference) in canonicals.iter().zip(&references) {
                let intersection = rotated_intersection(canonical, forward, reference)
                    .insert_axis(Axis(2));
                let restored: Array3<f32> = warp(
                    intersection.view(),
                    inverse,
                    Interpolation::Nearest,
                    Padding::Reflection,
                );
                count += 1;
                let kept = (count - 1) as f32 / count as f32;
                for (score, &(row, col)) in scores.iter_mut().zip(&patches) {
                    let update = match restored[[row, col, 0]] {
                        update if update == 0.0 => *score,
                        update => update,
                    };
                    *score = *score * kept + update / count as f32;
                }
            }
        }
        debug!("credited translation {} of {}", index + 1, translations.len());
    }

    normalize(&mut scores);
    info!(
        "scored {} points over {} updates from {} images",
        scores.len(),
        count,
        images.len()
    );
    Ok(scores)
}

/// Min-max normalization into `[0, 1]`. A flat input becomes all zeros.
fn normalize(scores: &mut [f32]) {
    let (min, max) = match scores.iter().copied().map(FloatOrd).minmax().into_option() {
        Some((FloatOrd(min), FloatOrd(max))) => (min, max),
        None => return,
    };
    let range = max - min;
    if range <= FLAT_RANGE {
        scores.iter_mut().for_each(|score| *score = 0.0);
    } else {
        scores.iter_mut().for_each(|score| *score = (*score - min) / range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pano_core::nalgebra::Point3;
    use pano_render::{render, Background};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    /// A sphere of radius 2 whose color depends on the direction quadrant.
    fn quadrant_sphere(count: usize) -> PointCloud {
        let mut rng = Pcg64::seed_from_u64(5);
        let mut positions = Vec::new();
        let mut colors = Vec::new();
        while positions.len() < count {
            let v = Vector3::new(
                rng.gen_range(-1.0f32..1.0),
                rng.gen_range(-1.0f32..1.0),
                rng.gen_range(-1.0f32..1.0),
            );
            let norm = v.norm();
            if !(0.1..=1.0).contains(&norm) {
                continue;
            }
            let dir = v / norm;
            let channel = |value: f32| if value > 0.0 { 0.8 } else { 0.3 };
            positions.push(Point3::from(dir * 2.0));
            colors.push(Vector3::new(channel(dir.x), channel(dir.y), 0.5));
        }
        PointCloud::new(positions, colors).unwrap()
    }

    fn settings() -> SearchSettings {
        SearchSettings {
            split_rows: 4,
            split_cols: 8,
            bins: 4,
            ..SearchSettings::default()
        }
    }

    #[test]
    fn normalization() {
        let mut scores = vec![1.0, 3.0, 2.0];
        normalize(&mut scores);
        assert_eq!(scores, vec![0.0, 1.0, 0.5]);

        let mut flat = vec![0.4; 4];
        normalize(&mut flat);
        assert_eq!(flat, vec![0.0; 4]);
    }

    #[test]
    fn repainted_region_scores_lowest() {
        let cloud = quadrant_sphere(20_000);
        let mut image = render(&cloud.translated(&Vector3::zeros()), cloud.colors(), (32, 64), Background::Black).unwrap();
        // Repaint the second patch row in the first two patch columns.
        for row in 8..16 {
            for col in 0..16 {
                image.put(row, col, [0.05, 0.05, 0.95]);
            }
        }
        let scores = score_map_3d(
            &[image],
            &cloud,
            &[Vector3::zeros()],
            &[Ypr::IDENTITY],
            &settings(),
            false,
        )
        .unwrap();
        assert_eq!(scores.len(), cloud.len());
        assert!(scores.iter().all(|score| (0.0..=1.0).contains(score)));

        let (_, projection) = canonical_render(&cloud, &Vector3::zeros(), (32, 64)).unwrap();
        for (score, &(row, col)) in scores.iter().zip(&projection.pixels) {
            let repainted = (8..16).contains(&row) && col < 16;
            if repainted {
                assert_relative_eq!(*score, 0.0);
            } else {
                assert_relative_eq!(*score, 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn mismatched_sizes_are_resized() {
        let cloud = quadrant_sphere(5_000);
        let points = cloud.translated(&Vector3::zeros());
        let images = [
            render(&points, cloud.colors(), (32, 64), Background::Black).unwrap(),
            render(&points, cloud.colors(), (16, 32), Background::Black).unwrap(),
        ];
        let scores = score_map_3d(
            &images,
            &cloud,
            &[Vector3::zeros()],
            &[Ypr::IDENTITY, Ypr::yaw(core::f32::consts::PI)],
            &settings(),
            true,
        )
        .unwrap();
        assert_eq!(scores.len(), cloud.len());
        assert!(scores.iter().all(|score| (0.0..=1.0).contains(score)));
    }

    #[test]
    fn no_images_is_an_error() {
        let cloud = quadrant_sphere(100);
        assert!(score_map_3d(&[], &cloud, &[Vector3::zeros()], &[Ypr::IDENTITY], &settings(), false).is_err());
    }
}
