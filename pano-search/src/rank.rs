use core::cmp::Reverse;
use float_ord::FloatOrd;
use pano_core::{nalgebra::Vector3, Ypr};

/// A camera pose hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vector3<f32>,
    pub rotation: Ypr,
}

/// A pose hypothesis kept by a search, with the positions of its translation
/// and rotation in the candidate lists it was drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedPose {
    pub translation_index: usize,
    pub rotation_index: usize,
    pub pose: Pose,
    /// Histogram similarity (higher is better) or sampling loss (lower is
    /// better), depending on the search that produced it.
    pub score: f32,
}

impl RankedPose {
    /// Every combination of translation and rotation, translation major, with
    /// a zero score.
    pub fn grid(translations: &[Vector3<f32>], rotations: &[Ypr]) -> Vec<Self> {
        translations
            .iter()
            .enumerate()
            .flat_map(|(translation_index, &translation)| {
                rotations
                    .iter()
                    .enumerate()
                    .map(move |(rotation_index, &rotation)| Self {
                        translation_index,
                        rotation_index,
                        pose: Pose {
                            translation,
                            rotation,
                        },
                        score: 0.0,
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    HighestFirst,
    LowestFirst,
}

/// Indices of the `count` best scores, best first. Equal scores keep index
/// order. Asking for more than there are returns all of them.
pub(crate) fn best_indices(scores: &[f32], count: usize, order: Order) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    match order {
        Order::HighestFirst => indices.sort_by_key(|&index| Reverse(FloatOrd(scores[index]))),
        Order::LowestFirst => indices.sort_by_key(|&index| FloatOrd(scores[index])),
    }
    indices.truncate(count);
    indices
}

/// Picks the best entries of a translation major `scores` table.
pub(crate) fn rank_table(
    scores: &[f32],
    translations: &[Vector3<f32>],
    rotations: &[Ypr],
    count: usize,
    order: Order,
) -> Vec<RankedPose> {
    best_indices(scores, count, order)
        .into_iter()
        .map(|index| {
            let (translation_index, rotation_index) = (index / rotations.len(), index % rotations.len());
            RankedPose {
                translation_index,
                rotation_index,
                pose: Pose {
                    translation: translations[translation_index],
                    rotation: rotations[rotation_index],
                },
                score: scores[index],
            }
        })
        .collect()
}
