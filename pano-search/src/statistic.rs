use float_ord::FloatOrd;
#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Reduction of per-patch histogram intersections to one pose score.
///
/// Patches with a zero intersection had nothing to compare and are left out
/// of every statistic. Without any nonzero patch the score is zero.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Statistic {
    #[default]
    Mean,
    /// Average of the values at the low and high cutoff ranks.
    Midhinge,
    /// The lower median.
    Median,
    /// Mean of the values ranked between the low and high cutoffs.
    Interquartile,
    /// Mean after clamping values outside the cutoff ranks to the values at
    /// those ranks.
    Winsorized,
}

impl Statistic {
    /// Cutoffs are fractions of the number of nonzero values; the rank they
    /// select is truncated.
    pub fn aggregate(self, values: &[f32], low_cutoff: f32, high_cutoff: f32) -> f32 {
        let mut nonzero: Vec<f32> = values.iter().copied().filter(|&v| v != 0.0).collect();
        if nonzero.is_empty() {
            return 0.0;
        }
        let count = nonzero.len();
        nonzero.sort_unstable_by_key(|&v| FloatOrd(v));
        let rank = |cutoff: f32| ((count as f32 * cutoff) as usize).min(count - 1);
        let (low, high) = (rank(low_cutoff), rank(high_cutoff));
        match self {
            Statistic::Mean => mean(&nonzero),
            Statistic::Midhinge => (nonzero[low] + nonzero[high]) / 2.0,
            Statistic::Median => nonzero[(count - 1) / 2],
            Statistic::Interquartile => {
                let end = ((count as f32 * high_cutoff) as usize).min(count);
                if low < end {
                    mean(&nonzero[low..end])
                } else {
                    nonzero[low]
                }
            }
            Statistic::Winsorized => {
                let (floor, ceiling) = (nonzero[low], nonzero[high]);
                nonzero[..low].iter_mut().for_each(|v| *v = floor);
                nonzero[high..].iter_mut().for_each(|v| *v = ceiling);
                mean(&nonzero)
            }
        }
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}
