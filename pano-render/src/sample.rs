//! Resampling of per-cell tensors at normalized equirectangular coordinates.
//!
//! Sources are `(height, width, channels)` arrays, so the same code reads
//! colors out of a panorama and histograms out of a patch histogram stack.
//! Coordinates follow the unaligned-corner convention: `-1` and `1` are the
//! outer edges of the first and last cells, not their centers.

use ndarray::{Array2, Array3, ArrayView3, ArrayViewMut1, Axis};
use pano_core::{nalgebra::Point2, SamplingGrid};

/// Coordinates are clamped to this magnitude before sampling so that the
/// outermost cells are never blended with padding.
pub const COORD_LIMIT: f32 = 0.99;

/// What a sample outside the source reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Zero in every channel.
    Zeros,
    /// The closest edge cell.
    Border,
    /// The source mirrored about its edges.
    Reflection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Bilinear,
}

/// Samples `source` at every coordinate, producing one row per coordinate.
pub fn sample(
    source: ArrayView3<f32>,
    coords: &[Point2<f32>],
    interpolation: Interpolation,
    padding: Padding,
) -> Array2<f32> {
    let mut samples = Array2::zeros((coords.len(), source.dim().2));
    for (coord, out) in coords.iter().zip(samples.axis_iter_mut(Axis(0))) {
        sample_into(&source, coord, interpolation, padding, out);
    }
    samples
}

/// Resamples `source` through `grid`, producing a tensor laid out like the grid.
pub fn warp(
    source: ArrayView3<f32>,
    grid: &SamplingGrid,
    interpolation: Interpolation,
    padding: Padding,
) -> Array3<f32> {
    let channels = source.dim().2;
    let samples = sample(source, grid.coords(), interpolation, padding);
    samples
        .into_shape((grid.height(), grid.width(), channels))
        .expect("one sample per grid cell")
}

fn sample_into(
    source: &ArrayView3<f32>,
    coord: &Point2<f32>,
    interpolation: Interpolation,
    padding: Padding,
    mut out: ArrayViewMut1<f32>,
) {
    let (height, width, _) = source.dim();
    let x = source_position(coord.x, width, padding);
    let y = source_position(coord.y, height, padding);
    let mut tap = |row: f32, col: f32, weight: f32| {
        if weight == 0.0 || row < 0.0 || col < 0.0 {
            return;
        }
        let (row, col) = (row as usize, col as usize);
        if row < height && col < width {
            out.scaled_add(weight, &source.slice(ndarray::s![row, col, ..]));
        }
    };
    match interpolation {
        Interpolation::Nearest => tap(round_half_even(y), round_half_even(x), 1.0),
        Interpolation::Bilinear => {
            let (x0, y0) = (x.floor(), y.floor());
            let (fx, fy) = (x - x0, y - y0);
            tap(y0, x0, (1.0 - fx) * (1.0 - fy));
            tap(y0, x0 + 1.0, fx * (1.0 - fy));
            tap(y0 + 1.0, x0, (1.0 - fx) * fy);
            tap(y0 + 1.0, x0 + 1.0, fx * fy);
        }
    }
}

/// Continuous cell position of a normalized coordinate along an axis of
/// `size` cells, with padding applied.
fn source_position(coord: f32, size: usize, padding: Padding) -> f32 {
    let coord = coord.clamp(-COORD_LIMIT, COORD_LIMIT);
    let position = ((coord + 1.0) * size as f32 - 1.0) / 2.0;
    let last = (size - 1) as f32;
    match padding {
        Padding::Zeros => position,
        Padding::Border => position.clamp(0.0, last),
        Padding::Reflection => reflect(position, -0.5, size as f32 - 0.5).clamp(0.0, last),
    }
}

/// Folds `position` into `[low, high]` by mirroring about the bounds.
fn reflect(position: f32, low: f32, high: f32) -> f32 {
    let span = high - low;
    if span <= 0.0 {
        return 0.0;
    }
    let offset = (position - low).abs();
    let extra = offset % span;
    let flips = (offset / span).floor() as i64;
    if flips % 2 == 0 {
        low + extra
    } else {
        high - extra
    }
}

fn round_half_even(value: f32) -> f32 {
    let rounded = value.round();
    if (value - value.trunc()).abs() == 0.5 {
        2.0 * (value / 2.0).round()
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr3, Array3};
    use pano_core::{GridDirection, Ypr};

    fn ramp(height: usize, width: usize) -> Array3<f32> {
        Array3::from_shape_fn((height, width, 1), |(row, col, _)| (row * width + col) as f32)
    }

    /// Normalized coordinate of the center of cell `index` of `size`.
    fn center(index: usize, size: usize) -> f32 {
        (2 * index + 1) as f32 / size as f32 - 1.0
    }

    #[test]
    fn cell_centers_read_their_cell() {
        let source = ramp(4, 8);
        let coords: Vec<_> = (0..4)
            .flat_map(|row| (0..8).map(move |col| Point2::new(center(col, 8), center(row, 4))))
            .collect();
        for interpolation in [Interpolation::Nearest, Interpolation::Bilinear] {
            let samples = sample(source.view(), &coords, interpolation, Padding::Zeros);
            for (index, value) in samples.column(0).iter().enumerate() {
                assert_relative_eq!(*value, index as f32, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn bilinear_blends_neighbours() {
        let source = arr3(&[[[0.0f32], [1.0]], [[2.0], [3.0]]]);
        let samples = sample(
            source.view(),
            &[Point2::new(0.0, 0.0)],
            Interpolation::Bilinear,
            Padding::Border,
        );
        assert_relative_eq!(samples[[0, 0]], 1.5, epsilon = 1e-6);
    }

    #[test]
    fn zero_padding_darkens_the_edge() {
        let source = Array3::from_elem((2, 2, 1), 1.0f32);
        let edge = [Point2::new(-1.0, 0.0)];
        let zeros = sample(source.view(), &edge, Interpolation::Bilinear, Padding::Zeros);
        let border = sample(source.view(), &edge, Interpolation::Bilinear, Padding::Border);
        let reflection = sample(source.view(), &edge, Interpolation::Bilinear, Padding::Reflection);
        assert!(zeros[[0, 0]] < 1.0);
        assert_relative_eq!(border[[0, 0]], 1.0, epsilon = 1e-6);
        assert_relative_eq!(reflection[[0, 0]], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn reflection_folds_about_edges() {
        assert_relative_eq!(reflect(-1.0, -0.5, 3.5), 0.0);
        assert_relative_eq!(reflect(4.0, -0.5, 3.5), 3.0);
        assert_relative_eq!(reflect(1.25, -0.5, 3.5), 1.25);
    }

    #[test]
    fn nearest_rounds_half_to_even() {
        assert_eq!(round_half_even(0.5), 0.0);
        assert_eq!(round_half_even(1.5), 2.0);
        assert_eq!(round_half_even(2.4), 2.0);
    }

    #[test]
    fn identity_warp_is_exact() {
        let source = ramp(4, 8);
        let grid = SamplingGrid::new(Ypr::IDENTITY, 4, 8, GridDirection::Forward);
        let warped = warp(source.view(), &grid, Interpolation::Nearest, Padding::Reflection);
        assert_eq!(warped, source);
    }

    #[test]
    fn warp_keeps_channels() {
        let source = Array3::from_shape_fn((2, 4, 5), |(_, _, c)| c as f32);
        let grid = SamplingGrid::new(Ypr::yaw(1.0), 2, 4, GridDirection::Inverse);
        let warped = warp(source.view(), &grid, Interpolation::Nearest, Padding::Reflection);
        assert_eq!(warped.dim(), (2, 4, 5));
        for cell in warped.lanes(Axis(2)) {
            assert_eq!(cell.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        }
    }
}
