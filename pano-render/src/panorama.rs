use derive_more::{Deref, DerefMut};
use image::{imageops, DynamicImage, ImageBuffer, Rgb, Rgb32FImage};
use log::*;
use ndarray::{Array3, ArrayView3};
use pano_core::{Error, Result};

/// Pixel value of a panorama cell that no point projected onto.
pub const EMPTY: [f32; 3] = [0.0; 3];

/// An equirectangular RGB image with channels in `[0, 1]`.
///
/// Exact black is reserved: it marks pixels that hold no color. Rendering
/// leaves such pixels behind wherever no point lands, and every histogram and
/// loss in this workspace excludes them.
#[derive(Debug, Clone, PartialEq, Deref, DerefMut)]
pub struct Panorama(pub Rgb32FImage);

impl Panorama {
    /// A panorama of `height x width` pixels all set to `rgb`.
    pub fn filled(height: usize, width: usize, rgb: [f32; 3]) -> Self {
        Self(ImageBuffer::from_pixel(width as u32, height as u32, Rgb(rgb)))
    }

    /// A panorama of `height x width` empty pixels.
    pub fn empty(height: usize, width: usize) -> Self {
        Self::filled(height, width, EMPTY)
    }

    /// Converts any image the image crate can load to unit float RGB.
    pub fn from_dynamic(input_image: &DynamicImage) -> Self {
        info!(
            "Loaded a {} x {} panorama",
            input_image.width(),
            input_image.height()
        );
        Self(input_image.to_rgb32f())
    }

    /// Builds a panorama from a `(height, width, 3)` array.
    pub fn from_array3(array: Array3<f32>) -> Result<Self> {
        let (height, width, channels) = array.dim();
        if channels != 3 {
            return Err(Error::InvalidConfig(format!(
                "panorama needs 3 channels, got {}",
                channels
            )));
        }
        let data = if array.is_standard_layout() {
            array.into_raw_vec()
        } else {
            array.iter().copied().collect()
        };
        Ok(Self(
            ImageBuffer::from_raw(width as u32, height as u32, data)
                .expect("raw vector didn't have enough pixels for the image"),
        ))
    }

    /// A `(height, width, 3)` view of the pixel data.
    pub fn ref_array3(&self) -> ArrayView3<f32> {
        ArrayView3::from_shape((self.height(), self.width(), 3), self.0.as_raw())
            .expect("image buffer is always densely packed")
    }

    pub fn width(&self) -> usize {
        self.0.width() as usize
    }

    pub fn height(&self) -> usize {
        self.0.height() as usize
    }

    /// `(height, width)` in pixels.
    pub fn dim(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    pub fn get(&self, row: usize, col: usize) -> [f32; 3] {
        self.0.get_pixel(col as u32, row as u32).0
    }

    pub fn put(&mut self, row: usize, col: usize, rgb: [f32; 3]) {
        self.0.put_pixel(col as u32, row as u32, Rgb(rgb));
    }

    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == EMPTY
    }

    /// Row-major mask of the pixels holding a color.
    pub fn valid_mask(&self) -> Vec<bool> {
        self.0.pixels().map(|pixel| pixel.0 != EMPTY).collect()
    }

    /// Bilinearly resized copy.
    pub fn resized(&self, height: usize, width: usize) -> Self {
        if self.dim() == (height, width) {
            return self.clone();
        }
        debug!(
            "resizing panorama from {:?} to {:?}",
            self.dim(),
            (height, width)
        );
        Self(imageops::resize(
            &self.0,
            width as u32,
            height as u32,
            imageops::FilterType::Triangle,
        ))
    }
}
