use crate::{Panorama, EMPTY};
use float_ord::FloatOrd;
use pano_core::{
    nalgebra::{Point2, Vector3},
    sphere, Error, Result,
};

/// Color of pixels no point lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    /// The empty sentinel, so uncovered pixels are excluded from comparisons.
    #[default]
    Black,
    White,
}

impl Background {
    fn rgb(self) -> [f32; 3] {
        match self {
            Background::Black => EMPTY,
            Background::White => [1.0; 3],
        }
    }
}

/// Where each input point landed, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Normalized equirectangular coordinate.
    pub coords: Vec<Point2<f32>>,
    /// Integer `(row, col)` pixel.
    pub pixels: Vec<(usize, usize)>,
}

/// Splat order around a point's pixel as `(row, col)` offsets. The point's own
/// pixel comes last so a neighbour's splat never covers it.
const SPLAT: [(isize, isize); 9] = [
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 0),
];

/// Renders points given relative to the camera into a `(height, width)`
/// panorama.
///
/// Points are painted from the farthest to the nearest so the nearest point
/// decides every pixel it reaches. Each point also covers its 8 neighbours to
/// close the gaps between sparse points, but every neighbour splat happens in
/// an earlier pass than any point's own pixel.
pub fn render(
    points: &[Vector3<f32>],
    colors: &[Vector3<f32>],
    resolution: (usize, usize),
    background: Background,
) -> Result<Panorama> {
    Ok(render_projected(points, colors, resolution, background)?.0)
}

/// [`render`], also reporting where every point landed.
pub fn render_projected(
    points: &[Vector3<f32>],
    colors: &[Vector3<f32>],
    (height, width): (usize, usize),
    background: Background,
) -> Result<(Panorama, Projection)> {
    if points.len() != colors.len() {
        return Err(Error::ColorMismatch {
            positions: points.len(),
            colors: colors.len(),
        });
    }
    let coords: Vec<Point2<f32>> = points.iter().map(sphere::project).collect();
    let pixels: Vec<(usize, usize)> = coords
        .iter()
        .map(|coord| sphere::coord_to_pixel(coord, (height, width)))
        .collect();

    // A stable sort keeps input order among points at equal distance.
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by_key(|&index| core::cmp::Reverse(FloatOrd(points[index].norm())));

    let mut panorama = Panorama::filled(height, width, background.rgb());
    for &(row_offset, col_offset) in SPLAT.iter() {
        for &index in &order {
            let (row, col) = pixels[index];
            let row = offset_clamped(row, row_offset, height);
            let col = offset_clamped(col, col_offset, width);
            let color = colors[index];
            panorama.put(row, col, [color.x, color.y, color.z]);
        }
    }
    Ok((panorama, Projection { coords, pixels }))
}

fn offset_clamped(index: usize, offset: isize, size: usize) -> usize {
    (index as isize + offset).clamp(0, size as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Vector3<f32> {
        Vector3::new(1.0, 0.0, 0.0)
    }

    fn blue() -> Vector3<f32> {
        Vector3::new(0.0, 0.0, 1.0)
    }

    #[test]
    fn nearest_point_wins_regardless_of_order() {
        let near = Vector3::new(1.0, 0.0, 0.0);
        let far = Vector3::new(5.0, 0.0, 0.0);
        let (first, projection) = render_projected(&[near, far], &[red(), blue()], (32, 64), Background::Black).unwrap();
        let (second, _) = render_projected(&[far, near], &[blue(), red()], (32, 64), Background::Black).unwrap();
        let (row, col) = projection.pixels[0];
        assert_eq!(projection.pixels[1], (row, col));
        assert_eq!(first.get(row, col), [1.0, 0.0, 0.0]);
        assert_eq!(second.get(row, col), [1.0, 0.0, 0.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn own_pixel_beats_nearer_neighbour_splat() {
        // Two points on adjacent pixels: the nearer one's neighbourhood splat
        // must not cover the farther one's own pixel.
        let resolution = (32, 64);
        let near = sphere::pixel_to_bearing((16, 20), resolution) * 1.0;
        let far = sphere::pixel_to_bearing((16, 21), resolution) * 3.0;
        let (panorama, projection) = render_projected(&[near, far], &[red(), blue()], resolution, Background::Black).unwrap();
        let (far_row, far_col) = projection.pixels[1];
        let (near_row, near_col) = projection.pixels[0];
        assert_ne!((far_row, far_col), (near_row, near_col));
        assert_eq!(panorama.get(far_row, far_col), [0.0, 0.0, 1.0]);
        assert_eq!(panorama.get(near_row, near_col), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn single_point_covers_its_neighbourhood() {
        let point = sphere::pixel_to_bearing((10, 10), (32, 64));
        let (panorama, projection) = render_projected(&[point], &[red()], (32, 64), Background::Black).unwrap();
        let (row, col) = projection.pixels[0];
        let covered = panorama.valid_mask().iter().filter(|&&valid| valid).count();
        assert_eq!(covered, 9);
        for r in row - 1..=row + 1 {
            for c in col - 1..=col + 1 {
                assert_eq!(panorama.get(r, c), [1.0, 0.0, 0.0]);
            }
        }
    }

    #[test]
    fn white_background_fills_uncovered_pixels() {
        let point = Vector3::new(0.0, 1.0, 0.0);
        let panorama = render(&[point], &[red()], (16, 32), Background::White).unwrap();
        assert_eq!(panorama.get(0, 0), [1.0, 1.0, 1.0]);
        let black = render(&[point], &[red()], (16, 32), Background::Black).unwrap();
        assert_eq!(black.get(0, 0), EMPTY);
    }

    #[test]
    fn mismatched_colors_are_rejected() {
        let points = [Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)];
        assert!(matches!(
            render_projected(&points, &[red()], (16, 32), Background::Black),
            Err(Error::ColorMismatch { positions: 2, colors: 1 })
        ));
        assert!(render(&points, &[red()], (16, 32), Background::Black).is_err());
    }

    #[test]
    fn projection_is_in_input_order() {
        let points = [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
        ];
        let (_, projection) = render_projected(&points, &[red(); 3], (16, 32), Background::Black).unwrap();
        assert_eq!(projection.pixels[0].0, 0);
        assert_eq!(projection.pixels[2].0, 15);
        assert_eq!(projection.coords.len(), 3);
        assert!(projection.coords[1].y.abs() < 1e-5);
    }
}
