use crate::Panorama;
use float_ord::FloatOrd;
use pano_core::nalgebra::Vector3;

/// Recolors `image` so the distribution of every channel over its valid pixels
/// matches the distribution of that channel in `reference`.
///
/// Each value is replaced by the reference value at the same cumulative
/// frequency, interpolating linearly between the reference's distinct values.
/// Empty pixels stay empty.
pub fn color_match(image: &Panorama, reference: &[Vector3<f32>]) -> Panorama {
    let mut matched = image.clone();
    if reference.is_empty() {
        return matched;
    }
    // Taken from the input since a matched pixel may legitimately reach black.
    let valid = image.valid_mask();
    for channel in 0..3 {
        let source: Vec<f32> = image
            .pixels()
            .zip(&valid)
            .filter(|(_, &valid)| valid)
            .map(|(pixel, _)| pixel.0[channel])
            .collect();
        let target: Vec<f32> = reference.iter().map(|color| color[channel]).collect();
        let source = Cdf::new(source);
        let target = Cdf::new(target);
        for (pixel, _) in matched.pixels_mut().zip(&valid).filter(|(_, &valid)| valid) {
            let quantile = source.quantile_of(pixel.0[channel]);
            pixel.0[channel] = target.value_at(quantile);
        }
    }
    matched
}

/// Empirical cumulative distribution over the distinct values of a sample.
struct Cdf {
    values: Vec<f32>,
    quantiles: Vec<f32>,
}

impl Cdf {
    fn new(mut sample: Vec<f32>) -> Self {
        sample.sort_unstable_by_key(|&value| FloatOrd(value));
        let total = sample.len() as f32;
        let mut values = Vec::new();
        let mut quantiles = Vec::new();
        for (index, &value) in sample.iter().enumerate() {
            if values.last() == Some(&value) {
                *quantiles.last_mut().expect("pushed with the value") = (index + 1) as f32 / total;
            } else {
                values.push(value);
                quantiles.push((index + 1) as f32 / total);
            }
        }
        Self { values, quantiles }
    }

    /// Fraction of the sample at or below `value`.
    fn quantile_of(&self, value: f32) -> f32 {
        let rank = self.values.partition_point(|&v| v <= value);
        if rank == 0 {
            0.0
        } else {
            self.quantiles[rank - 1]
        }
    }

    /// Value at cumulative frequency `quantile`, clamped to the sample range.
    fn value_at(&self, quantile: f32) -> f32 {
        let upper = self.quantiles.partition_point(|&q| q < quantile);
        if upper == 0 {
            return self.values[0];
        }
        if upper == self.values.len() {
            return self.values[upper - 1];
        }
        let (q0, q1) = (self.quantiles[upper - 1], self.quantiles[upper]);
        let (v0, v1) = (self.values[upper - 1], self.values[upper]);
        v0 + (quantile - q0) / (q1 - q0) * (v1 - v0)
    }
}
