//! Mapping between 3d directions and normalized equirectangular coordinates.
//!
//! A normalized coordinate is a point in `[-1, 1] x [-1, 1]`. The first
//! component is horizontal (azimuth) and the second is vertical (polar angle),
//! with `-1` at the top of the panorama (the `+z` pole) and `1` at the bottom.

use core::f32::consts::PI;
use nalgebra::{Point2, Vector3};

/// Offset added to the `atan2` denominators so that the poles and the origin map
/// to a defined coordinate.
pub const POLE_EPSILON: f32 = 1e-6;

/// Projects a direction (any non-zero vector, treated as a ray from the origin)
/// to its normalized equirectangular coordinate.
pub fn project(xyz: &Vector3<f32>) -> Point2<f32> {
    // Polar angle in [0, pi] measured from +z.
    let theta = xyz.xy().norm().atan2(xyz.z + POLE_EPSILON);
    // Azimuth shifted into [0, 2pi].
    let phi = xyz.y.atan2(xyz.x + POLE_EPSILON) + PI;
    let u = 1.0 - phi / (2.0 * PI);
    let v = theta / PI;
    Point2::new(2.0 * u - 1.0, 2.0 * v - 1.0)
}

/// The exact inverse of [`project`], producing a point on the unit sphere.
pub fn unproject(coord: &Point2<f32>) -> Vector3<f32> {
    let u = (coord.x + 1.0) / 2.0;
    let v = (coord.y + 1.0) / 2.0;
    let phi = (1.0 - u) * 2.0 * PI - PI;
    let theta = PI * v;
    Vector3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
}

/// Integer pixel `(row, col)` of a normalized coordinate in an image of
/// `(height, width)` pixels.
///
/// The coordinate range is stretched over `width - 1` and `height - 1` pixels
/// and truncated, which is the rasterization used by the panorama renderer.
pub fn coord_to_pixel(coord: &Point2<f32>, (height, width): (usize, usize)) -> (usize, usize) {
    let col = ((coord.x + 1.0) / 2.0 * (width - 1) as f32).max(0.0) as usize;
    let row = ((coord.y + 1.0) / 2.0 * (height - 1) as f32).max(0.0) as usize;
    (row.min(height - 1), col.min(width - 1))
}

/// Unit-sphere direction seen through the integer pixel `(row, col)` of an image
/// of `(height, width)` pixels, the inverse of [`coord_to_pixel`] up to truncation.
pub fn pixel_to_bearing(
    (row, col): (usize, usize),
    (height, width): (usize, usize),
) -> Vector3<f32> {
    let x = col as f32 / (width - 1).max(1) as f32;
    let y = row as f32 / (height - 1).max(1) as f32;
    unproject(&Point2::new(2.0 * x - 1.0, 2.0 * y - 1.0))
}
