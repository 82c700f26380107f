use crate::{sphere, Ypr};
use core::f32::consts::PI;
use nalgebra::{Point2, Vector3};

/// Which way a [`SamplingGrid`] maps between the canonical and rotated layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridDirection {
    /// Sample the canonical (identity rotation) layout to produce the view of the
    /// rotated camera. Rays are rotated by `R^T`.
    Forward,
    /// Sample the rotated layout to bring it back into the canonical frame. Rays
    /// are rotated by `R`.
    Inverse,
}

/// A dense `height x width` array of normalized source coordinates.
///
/// Resampling a panorama (or any per-cell tensor laid out like one) through this
/// grid reproduces the layout it would have under another rotation without going
/// back to the 3d points. Cell `(row, col)` holds the coordinate to read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingGrid {
    height: usize,
    width: usize,
    coords: Vec<Point2<f32>>,
}

impl SamplingGrid {
    /// Computes the grid for a camera rotated by `ypr`.
    ///
    /// Each cell is represented by the ray through its center: the azimuth is
    /// shifted by half a cell width and the polar angle by half a cell height
    /// before the ray is rotated and projected back.
    pub fn new(ypr: Ypr, height: usize, width: usize, direction: GridDirection) -> Self {
        let rotation = match direction {
            GridDirection::Forward => ypr.rotation().transpose(),
            GridDirection::Inverse => ypr.rotation(),
        };
        let coords = (0..height)
            .flat_map(|row| (0..width).map(move |col| (row, col)))
            .map(|cell| sphere::project(&(rotation * cell_ray(cell, height, width))))
            .collect();
        Self {
            height,
            width,
            coords,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Row-major source coordinates.
    pub fn coords(&self) -> &[Point2<f32>] {
        &self.coords
    }

    pub fn get(&self, row: usize, col: usize) -> Point2<f32> {
        self.coords[row * self.width + col]
    }

    /// The coordinates rounded to `decimals` decimal places, as integers.
    ///
    /// Two grids with equal signatures resample identically for all practical
    /// purposes, which is used to drop redundant rotation candidates.
    pub fn signature(&self, decimals: u32) -> Vec<i64> {
        let scale = 10f32.powi(decimals as i32);
        self.coords
            .iter()
            .flat_map(|c| [c.x, c.y])
            .map(|v| (v * scale).round() as i64)
            .collect()
    }
}

/// Unit ray through the center of cell `(row, col)` of a `height x width` grid
/// laid over the panorama.
pub fn cell_ray((row, col): (usize, usize), height: usize, width: usize) -> Vector3<f32> {
    let azimuth = PI - col as f32 * 2.0 * PI / width as f32 - PI / width as f32;
    let polar = polar_angle(row, height);
    Vector3::new(
        polar.sin() * azimuth.cos(),
        polar.sin() * azimuth.sin(),
        polar.cos(),
    )
}

/// Polar angle of the center of grid row `row` out of `height` rows.
fn polar_angle(row: usize, height: usize) -> f32 {
    row as f32 * PI / height as f32 + PI / (2 * height) as f32
}

/// Row-major `height x width` weights equal to the sine of each cell center's
/// polar angle, which is proportional to the solid angle the cell covers.
pub fn polar_sin_weights(height: usize, width: usize) -> Vec<f32> {
    (0..height)
        .flat_map(|row| {
            let weight = polar_angle(row, height).sin();
            (0..width).map(move |_| weight)
        })
        .collect()
}
