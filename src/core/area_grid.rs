use crate::core::pixel_area::area_of_pixel;
use crate::types::{AreaGrid, CarbonResult, GeoTransform};
use ndarray::Array2;

/// Build a grid of per-cell ground areas (hectares) matching a raster
/// subgrid of the given shape.
///
/// Each cell's area is evaluated at its center latitude derived from the
/// transform. On an axis-aligned grid latitude is constant along a row,
/// so one value per row is computed and broadcast across the columns;
/// rotated transforms fall back to the per-cell path. Both paths produce
/// bit-identical values for axis-aligned inputs.
pub fn build_area_grid(
    shape: (usize, usize),
    transform: &GeoTransform,
    pixel_size: f64,
) -> CarbonResult<AreaGrid> {
    let (rows, cols) = shape;
    let mut areas = Array2::<f64>::zeros((rows, cols));

    if transform.is_north_up() {
        for row in 0..rows {
            let (_, lat) = transform.pixel_center(row, 0);
            let area = area_of_pixel(pixel_size, lat)?;
            areas.row_mut(row).fill(area);
        }
    } else {
        for row in 0..rows {
            for col in 0..cols {
                let (_, lat) = transform.pixel_center(row, col);
                areas[[row, col]] = area_of_pixel(pixel_size, lat)?;
            }
        }
    }

    Ok(areas)
}
