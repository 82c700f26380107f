use pano::{
    nalgebra::{Point3, Vector3},
    render::{render, Background, Panorama},
    search::*,
    PointCloud, Ypr,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Points on the faces of the cube `[-2, 2]^3`, colored by position.
fn room() -> PointCloud {
    let mut rng = Pcg64::seed_from_u64(0);
    let (positions, colors): (Vec<_>, Vec<_>) = (0..10_000)
        .map(|_| {
            let mut point: [f32; 3] = [
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
            ];
            let face = rng.gen_range(0..6);
            point[face / 2] = if face % 2 == 0 { -2.0 } else { 2.0 };
            let point = Point3::from(point);
            let color = point.coords.map(|v| ((v + 2.0) / 4.0).clamp(0.02, 0.98));
            (point, color)
        })
        .unzip();
    PointCloud::new(positions, colors).unwrap()
}

fn query(cloud: &PointCloud, translation: &Vector3<f32>, rotation: Ypr) -> Panorama {
    let points = cloud.relative_to(translation, &rotation.rotation());
    render(&points, cloud.colors(), (64, 128), Background::Black).unwrap()
}

fn translation_grid() -> Vec<Vector3<f32>> {
    let steps: &[f32] = &[-1.0, -0.5, 0.0, 0.5, 1.0];
    steps
        .iter()
        .flat_map(|&x| {
            steps
                .iter()
                .flat_map(move |&y| steps.iter().map(move |&z| Vector3::new(x, y, z)))
        })
        .collect()
}

#[test]
fn cached_histogram_search_ranks_the_true_pose() {
    let _ = pretty_env_logger::try_init();
    let cloud = room();
    let translations = translation_grid();
    let rotations = RotationConfig::yaw_only(8).unwrap().candidates();
    assert_eq!(translations.len() * rotations.len(), 1000);

    let truth = translations
        .iter()
        .position(|t| *t == Vector3::new(0.5, -0.5, 0.0))
        .unwrap();
    let image = query(&cloud, &translations[truth], rotations[3]);

    let settings = SearchSettings::default();
    let ranked = histogram_pose_search(&image, &cloud, &translations, &rotations, &settings, None).unwrap();
    assert_eq!(ranked.len(), settings.top_n);
    assert!(
        ranked
            .iter()
            .any(|pose| pose.translation_index == truth && pose.rotation_index == 3),
        "{:?}",
        ranked
    );
}

#[test]
fn sampling_loss_prefers_the_true_pose() {
    let _ = pretty_env_logger::try_init();
    let cloud = room();
    let translations = translation_grid();
    let rotations = RotationConfig::yaw_only(8).unwrap().candidates();
    let truth = 62;
    let image = query(&cloud, &translations[truth], rotations[5]);

    let settings = SearchSettings {
        occlusion_filter: Some(OcclusionFilter::Scatter),
        ..SearchSettings::default()
    };
    let ranked = sampling_loss_pose_search(&image, &cloud, &translations, &rotations, &settings).unwrap();
    assert_eq!(
        (ranked[0].translation_index, ranked[0].rotation_index),
        (truth, 5)
    );
    assert!(ranked.windows(2).all(|pair| pair[0].score <= pair[1].score));
}

#[test]
fn inlier_map_flags_a_changed_region() {
    let cloud = room();
    let translation = Vector3::zeros();
    let mut image = query(&cloud, &translation, Ypr::IDENTITY);
    // A poster that was not there when the room was scanned.
    for row in 24..40 {
        for col in 48..64 {
            image.put(row, col, [0.95, 0.05, 0.95]);
        }
    }
    let settings = SearchSettings {
        margin: Some(Margin::Symmetric(1)),
        ..SearchSettings::default()
    };
    let scores = score_map_2d(&image, &cloud, &[translation], &[Ypr::IDENTITY], &settings).unwrap();
    let mask = inlier_mask(scores.view(), image.dim(), 0.9);
    assert_eq!(mask.dim(), (64, 128));
    assert!(!mask[[30, 55]]);
    assert!(mask[[30, 110]]);
    assert!(!mask[[0, 0]]);
}
