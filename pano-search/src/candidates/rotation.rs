use core::f32::consts::TAU;
use log::debug;
use pano_core::{Error, GridDirection, Result, SamplingGrid, Ypr};
use std::collections::BTreeMap;

/// Decimal places two sampling grids must agree to for their rotations to
/// count as the same candidate.
pub const SIGNATURE_DECIMALS: u32 = 3;

/// `count` angles starting at `min` and stepping by `(max - min) / count`,
/// so `max` itself is never reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
    pub count: usize,
}

impl AngleRange {
    pub fn new(min: f32, max: f32, count: usize) -> Self {
        Self { min, max, count }
    }

    /// `count` angles over a full turn.
    pub fn full_turn(count: usize) -> Self {
        Self::new(0.0, TAU, count)
    }

    /// The single angle `angle`.
    pub fn fixed(angle: f32) -> Self {
        Self::new(angle, angle, 1)
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + Clone + '_ {
        (0..self.count).map(move |k| k as f32 / self.count as f32 * (self.max - self.min) + self.min)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.count == 0 {
            return Err(Error::InvalidConfig(format!("{} needs at least one angle", name)));
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::InvalidConfig(format!("{} range must be finite", name)));
        }
        Ok(())
    }
}

/// How rotation candidates are laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationConfig {
    /// Evenly spaced yaws over a full turn with zero pitch and roll.
    YawOnly { count: usize },
    /// Every combination of the three ranges, with rotations that resample a
    /// `yaw.count x pitch.count` grid identically merged into one.
    Grid {
        yaw: AngleRange,
        pitch: AngleRange,
        roll: AngleRange,
    },
}

impl RotationConfig {
    pub fn yaw_only(count: usize) -> Result<Self> {
        AngleRange::full_turn(count).validate("yaw")?;
        Ok(Self::YawOnly { count })
    }

    pub fn grid(yaw: AngleRange, pitch: AngleRange, roll: AngleRange) -> Result<Self> {
        yaw.validate("yaw")?;
        pitch.validate("pitch")?;
        roll.validate("roll")?;
        Ok(Self::Grid { yaw, pitch, roll })
    }

    /// The rotation candidates, deterministic for a given configuration.
    pub fn candidates(&self) -> Vec<Ypr> {
        match *self {
            RotationConfig::YawOnly { count } => {
                AngleRange::full_turn(count).values().map(Ypr::yaw).collect()
            }
            RotationConfig::Grid { yaw, pitch, roll } => {
                let all: Vec<Ypr> = itertools::iproduct!(yaw.values(), pitch.values(), roll.values())
                    .map(|(y, p, r)| Ypr::new(y, p, r))
                    .collect();
                let unique = dedup_by_grid(&all, yaw.count, pitch.count);
                debug!(
                    "kept {} of {} rotation candidates with distinct sampling grids",
                    unique.len(),
                    all.len()
                );
                unique
            }
        }
    }
}

/// Keeps the first rotation of every distinct sampling grid, ordered by grid
/// signature, with the identity moved to the front when present.
fn dedup_by_grid(rotations: &[Ypr], height: usize, width: usize) -> Vec<Ypr> {
    let mut by_signature: BTreeMap<Vec<i64>, Ypr> = BTreeMap::new();
    for &ypr in rotations {
        let signature = SamplingGrid::new(ypr, height, width, GridDirection::Forward)
            .signature(SIGNATURE_DECIMALS);
        by_signature.entry(signature).or_insert(ypr);
    }
    let mut unique: Vec<Ypr> = by_signature.into_values().collect();
    if let Some(identity) = unique.iter().position(|ypr| ypr.is_identity()) {
        unique.swap(0, identity);
    }
    unique
}
