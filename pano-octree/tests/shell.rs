use pano_core::{nalgebra::Point3, nalgebra::Vector3, PointCloud};
use pano_octree::{generate_octree, generate_octree_2d, OctreeConfig};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Points scattered over the faces of the cube `[-2, 2]^3`.
fn cube_shell(count: usize) -> PointCloud {
    let mut rng = Pcg64::seed_from_u64(7);
    let positions: Vec<Point3<f32>> = (0..count)
        .map(|_| {
            let face = rng.gen_range(0..6);
            let mut p = [rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0)];
            p[face / 2] = if face % 2 == 0 { -2.0 } else { 2.0 };
            Point3::from(p)
        })
        .collect();
    let colors = vec![Vector3::new(0.5, 0.5, 0.5); positions.len()];
    PointCloud::new(positions, colors).unwrap()
}

#[test]
fn cube_shell_interior() {
    let _ = pretty_env_logger::try_init();
    let cloud = cube_shell(10_000);
    let centers = generate_octree(&cloud, &OctreeConfig::default()).unwrap();
    assert!(!centers.is_empty());
    for center in &centers {
        assert!(center.coords.iter().all(|c| c.abs() < 2.0), "{:?}", center);
    }
    for &x in &[-0.5f32, 0.5] {
        for &y in &[-0.5f32, 0.5] {
            for &z in &[-0.5f32, 0.5] {
                assert!(
                    centers.iter().any(|c| (c - Point3::new(x, y, z)).norm() < 1e-3),
                    "missing cell at ({}, {}, {})",
                    x,
                    y,
                    z
                );
            }
        }
    }
}

#[test]
fn octree_is_deterministic() {
    let cloud = cube_shell(5_000);
    let config = OctreeConfig::default();
    let first = generate_octree(&cloud, &config).unwrap();
    let second = generate_octree(&cloud, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn planar_slice_stays_at_height() {
    let cloud = cube_shell(20_000);
    let centers = generate_octree_2d(&cloud, 0.0, &OctreeConfig::planar()).unwrap();
    assert!(!centers.is_empty());
    assert!(centers.iter().all(|c| c.z == 0.0));
    assert!(centers.iter().all(|c| c.x.abs() < 2.0 && c.y.abs() < 2.0));
    assert!(centers.iter().any(|c| c.x.abs() < 1.0 && c.y.abs() < 1.0));
}

#[test]
fn planar_slice_without_points_is_an_error() {
    let cloud = cube_shell(1_000);
    assert!(generate_octree_2d(&cloud, 10.0, &OctreeConfig::planar()).is_err());
}
