use crate::Panorama;
use ndarray::{Array2, Array3, ArrayView3, Axis, Zip};
use pano_core::{Error, Result};

/// Default number of bins per color channel.
pub const DEFAULT_BINS: usize = 8;

/// How a panorama is tiled into patches: `rows x cols` equal rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchGrid {
    pub rows: usize,
    pub cols: usize,
}

impl PatchGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(height, width)` of one patch of an image of `(height, width)` pixels.
    pub fn patch_size(&self, (height, width): (usize, usize)) -> Result<(usize, usize)> {
        if self.rows == 0 || height % self.rows != 0 {
            return Err(Error::PatchGrid {
                size: height,
                splits: self.rows,
            });
        }
        if self.cols == 0 || width % self.cols != 0 {
            return Err(Error::PatchGrid {
                size: width,
                splits: self.cols,
            });
        }
        Ok((height / self.rows, width / self.cols))
    }
}

/// Joint RGB histograms of every patch of a panorama.
///
/// Each histogram has `bins^3` entries and is normalized by the number of
/// pixels that went into it, so it sums to one, or is all zero for a patch
/// without valid pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchHistograms {
    bins: usize,
    histograms: Array3<f32>,
    counts: Array2<usize>,
}

impl PatchHistograms {
    /// Histograms of the pixels of `image` selected by the row-major `mask`.
    pub fn new(image: &Panorama, mask: &[bool], grid: PatchGrid, bins: usize) -> Result<Self> {
        let (height, width) = image.dim();
        if bins == 0 {
            return Err(Error::InvalidConfig("histograms need at least one bin per channel".into()));
        }
        if mask.len() != height * width {
            return Err(Error::InvalidConfig(format!(
                "mask of {} pixels for a {} x {} image",
                mask.len(),
                height,
                width
            )));
        }
        let (patch_height, patch_width) = grid.patch_size((height, width))?;

        let mut histograms = Array3::zeros((grid.rows, grid.cols, bins * bins * bins));
        let mut counts = Array2::zeros((grid.rows, grid.cols));
        for ((index, pixel), _) in image
            .pixels()
            .enumerate()
            .zip(mask)
            .filter(|(_, &valid)| valid)
        {
            let patch = (index / width / patch_height, index % width / patch_width);
            let [r, g, b] = pixel.0.map(|value| bin(value, bins));
            histograms[[patch.0, patch.1, (r * bins + g) * bins + b]] += 1.0;
            counts[patch] += 1;
        }
        Zip::from(histograms.lanes_mut(Axis(2)))
            .and(&counts)
            .for_each(|mut histogram, &count| {
                if count > 0 {
                    histogram /= count as f32;
                }
            });

        Ok(Self {
            bins,
            histograms,
            counts,
        })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// The `(rows, cols, bins^3)` histogram stack.
    pub fn view(&self) -> ArrayView3<f32> {
        self.histograms.view()
    }

    /// Number of valid pixels in each patch.
    pub fn counts(&self) -> &Array2<usize> {
        &self.counts
    }

    /// Per-patch intersection with another stack of the same shape.
    pub fn intersection(&self, other: ArrayView3<f32>) -> Array2<f32> {
        intersection(self.view(), other)
    }
}

/// Bin of a channel value in `[0, 1]`; values outside fall in the end bins.
fn bin(value: f32, bins: usize) -> usize {
    ((value * bins as f32).floor().max(0.0) as usize).min(bins - 1)
}

/// Sum over bins of the smaller of the two histograms, per patch.
pub fn intersection(first: ArrayView3<f32>, second: ArrayView3<f32>) -> Array2<f32> {
    assert_eq!(first.dim(), second.dim(), "histogram stacks must match");
    Zip::from(first.lanes(Axis(2)))
        .and(second.lanes(Axis(2)))
        .map_collect(|a, b| a.iter().zip(b.iter()).map(|(x, y)| x.min(*y)).sum())
}

/// Row-major mask of pixels valid in both panoramas.
pub fn joint_mask(first: &Panorama, second: &Panorama) -> Result<Vec<bool>> {
    if first.dim() != second.dim() {
        return Err(Error::ImageSize {
            expected: first.dim(),
            actual: second.dim(),
        });
    }
    Ok(first
        .valid_mask()
        .into_iter()
        .zip(second.valid_mask())
        .map(|(a, b)| a && b)
        .collect())
}
