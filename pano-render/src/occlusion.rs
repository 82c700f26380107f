use float_ord::FloatOrd;
use pano_core::{nalgebra::Point2, sphere};

/// Picks, for every distinct key, the index of the entry with the smallest
/// value.
///
/// Results are ordered by key. Equal values resolve to the lowest index.
pub trait GroupMinimum: Sync {
    fn group_argmin(&self, keys: &[usize], values: &[f32]) -> Vec<usize>;
}

/// Scatters every entry into a dense table indexed by key.
///
/// Linear in the number of entries, but allocates a table as large as the
/// largest key, so it suits keys that are pixel indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScatterMinimum;

impl GroupMinimum for ScatterMinimum {
    fn group_argmin(&self, keys: &[usize], values: &[f32]) -> Vec<usize> {
        assert_eq!(keys.len(), values.len());
        let size = keys.iter().max().map_or(0, |&max| max + 1);
        let mut table: Vec<Option<usize>> = vec![None; size];
        for (index, (&key, &value)) in keys.iter().zip(values).enumerate() {
            let slot = &mut table[key];
            match *slot {
                Some(best) if FloatOrd(values[best]) <= FloatOrd(value) => {}
                _ => *slot = Some(index),
            }
        }
        table.into_iter().flatten().collect()
    }
}

/// Sorts entries by key and value and keeps the head of every key segment.
///
/// Needs no table, so keys may be arbitrarily large.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortSegmentMinimum;

impl GroupMinimum for SortSegmentMinimum {
    fn group_argmin(&self, keys: &[usize], values: &[f32]) -> Vec<usize> {
        assert_eq!(keys.len(), values.len());
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by_key(|&index| (keys[index], FloatOrd(values[index])));
        let mut winners: Vec<usize> = Vec::new();
        for index in order {
            if winners.last().map_or(true, |&last| keys[last] != keys[index]) {
                winners.push(index);
            }
        }
        winners
    }
}

/// Indices of the points that are nearest in their pixel of a
/// `(height, width)` raster, ordered by pixel.
pub fn visible_points<G: GroupMinimum + ?Sized>(
    coords: &[Point2<f32>],
    depths: &[f32],
    (height, width): (usize, usize),
    group_minimum: &G,
) -> Vec<usize> {
    let keys: Vec<usize> = coords
        .iter()
        .map(|coord| {
            let (row, col) = sphere::coord_to_pixel(coord, (height, width));
            row * width + col
        })
        .collect();
    group_minimum.group_argmin(&keys, depths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    #[test]
    fn both_strategies_agree() {
        let mut rng = Pcg64::seed_from_u64(3);
        let keys: Vec<usize> = (0..2000).map(|_| rng.gen_range(0..300)).collect();
        let values: Vec<f32> = (0..2000).map(|_| rng.gen_range(0..50) as f32).collect();
        let scatter = ScatterMinimum.group_argmin(&keys, &values);
        let sorted = SortSegmentMinimum.group_argmin(&keys, &values);
        assert_eq!(scatter, sorted);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let keys = [4, 1, 4, 1, 4];
        let values = [2.0, 5.0, 1.0, 5.0, 1.0];
        assert_eq!(ScatterMinimum.group_argmin(&keys, &values), vec![1, 2]);
        assert_eq!(SortSegmentMinimum.group_argmin(&keys, &values), vec![1, 2]);
    }

    #[test]
    fn hidden_points_are_dropped() {
        let coords = [Point2::new(0.0, 0.0), Point2::new(0.0, 0.0), Point2::new(0.5, 0.0)];
        let depths = [3.0, 1.0, 2.0];
        let visible = visible_points(&coords, &depths, (16, 32), &SortSegmentMinimum);
        assert_eq!(visible, vec![1, 2]);
    }
}
