use crate::types::{CarbonError, CarbonResult, CountryGeometry, MaskedGrid, RasterGrid};
use ndarray::Array2;

/// Clip a year's raster to one country polygon.
///
/// The result is cropped to the intersection of the polygon's bounding
/// box with the raster extent. Inside that window, cells whose center
/// falls outside the polygon, or that carry the raster's no-data value,
/// are set to NaN. Returns `Ok(None)` when the polygon does not overlap
/// the raster at all, which is a defined empty result rather than an
/// error.
pub fn mask_raster(
    raster: &RasterGrid,
    geometry: &CountryGeometry,
) -> CarbonResult<Option<MaskedGrid>> {
    let gt = &raster.transform;
    if !gt.is_north_up() {
        return Err(CarbonError::Processing(
            "masking requires an axis-aligned raster grid".to_string(),
        ));
    }

    let bbox = match geometry.bbox() {
        Some(bbox) => bbox,
        None => return Ok(None),
    };
    if !bbox.intersects(&raster.extent()) {
        return Ok(None);
    }

    let (rows, cols) = raster.data.dim();

    // Fractional pixel coordinates of the bbox corners; pixel_height is
    // negative for north-up grids, so order the bounds after dividing.
    let c0 = (bbox.min_lon - gt.top_left_x) / gt.pixel_width;
    let c1 = (bbox.max_lon - gt.top_left_x) / gt.pixel_width;
    let r0 = (bbox.min_lat - gt.top_left_y) / gt.pixel_height;
    let r1 = (bbox.max_lat - gt.top_left_y) / gt.pixel_height;

    let col_start = (c0.min(c1).floor() as i64).clamp(0, cols as i64) as usize;
    let col_end = (c0.max(c1).ceil() as i64).clamp(0, cols as i64) as usize;
    let row_start = (r0.min(r1).floor() as i64).clamp(0, rows as i64) as usize;
    let row_end = (r0.max(r1).ceil() as i64).clamp(0, rows as i64) as usize;

    if col_start >= col_end || row_start >= row_end {
        return Ok(None);
    }

    let mut data =
        Array2::<f32>::from_elem((row_end - row_start, col_end - col_start), f32::NAN);

    for row in row_start..row_end {
        for col in col_start..col_end {
            let (lon, lat) = gt.pixel_center(row, col);
            if !geometry.contains_point(lon, lat) {
                continue;
            }
            let value = raster.data[[row, col]];
            if value.is_nan() {
                continue;
            }
            if raster.nodata == Some(value) {
                continue;
            }
            data[[row - row_start, col - col_start]] = value;
        }
    }

    Ok(Some(MaskedGrid {
        data,
        transform: gt.windowed(row_start, col_start),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    fn test_raster(rows: usize, cols: usize, fill: f32) -> RasterGrid {
        // 1-degree cells, top-left corner at (0 E, `rows` N)
        RasterGrid {
            year: 2015,
            data: Array2::from_elem((rows, cols), fill),
            transform: crate::types::GeoTransform {
                top_left_x: 0.0,
                pixel_width: 1.0,
                rotation_x: 0.0,
                top_left_y: rows as f64,
                rotation_y: 0.0,
                pixel_height: -1.0,
            },
            nodata: None,
            pixel_size: 1.0,
        }
    }

    fn square(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> CountryGeometry {
        CountryGeometry::new(vec![vec![
            (min_lon, min_lat),
            (max_lon, min_lat),
            (max_lon, max_lat),
            (min_lon, max_lat),
            (min_lon, min_lat),
        ]])
    }

    #[test]
    fn test_masks_single_pixel() {
        let raster = test_raster(4, 4, 7.0);
        // Covers exactly the cell centered at (1.5, 2.5)
        let geometry = square(1.0, 2.0, 2.0, 3.0);

        let masked = mask_raster(&raster, &geometry).unwrap().unwrap();
        assert_eq!(masked.data.dim(), (1, 1));
        assert_eq!(masked.data[[0, 0]], 7.0);

        // The window transform must place that cell at (1.5, 2.5)
        let (lon, lat) = masked.transform.pixel_center(0, 0);
        assert_abs_diff_eq!(lon, 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(lat, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_cells_outside_polygon_are_nan() {
        let raster = test_raster(4, 4, 1.0);
        // Triangle over the lower-left corner of a 2x2 window
        let geometry = CountryGeometry::new(vec![vec![
            (0.0, 0.0),
            (2.0, 0.0),
            (0.0, 2.0),
            (0.0, 0.0),
        ]]);

        let masked = mask_raster(&raster, &geometry).unwrap().unwrap();
        assert_eq!(masked.data.dim(), (2, 2));
        // (0.5, 0.5) and neighbours along the legs are inside, the
        // opposite corner cell (1.5, 1.5) is outside the hypotenuse
        assert_eq!(masked.data[[1, 0]], 1.0);
        assert!(masked.data[[0, 1]].is_nan());
    }

    #[test]
    fn test_no_overlap_returns_none() {
        let raster = test_raster(4, 4, 1.0);
        let geometry = square(100.0, 50.0, 102.0, 52.0);
        assert!(mask_raster(&raster, &geometry).unwrap().is_none());
    }

    #[test]
    fn test_nodata_becomes_nan() {
        let mut raster = test_raster(4, 4, 3.0);
        raster.nodata = Some(-9999.0);
        raster.data[[2, 1]] = -9999.0;
        // Window covering the whole raster
        let geometry = square(-1.0, -1.0, 5.0, 5.0);

        let masked = mask_raster(&raster, &geometry).unwrap().unwrap();
        assert!(masked.data[[2, 1]].is_nan());
        assert_eq!(masked.data[[0, 0]], 3.0);
    }

    #[test]
    fn test_hole_ring_excluded() {
        let raster = test_raster(6, 6, 1.0);
        let mut geometry = square(0.0, 0.0, 6.0, 6.0);
        // Interior ring punching out the center cell at (2.5, 2.5)
        geometry.rings.push(vec![
            (2.0, 2.0),
            (3.0, 2.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 2.0),
        ]);

        let masked = mask_raster(&raster, &geometry).unwrap().unwrap();
        // Row 3 holds latitude 2.5 with the north-up transform
        assert!(masked.data[[3, 2]].is_nan());
        assert_eq!(masked.data[[0, 0]], 1.0);
    }

    #[test]
    fn test_rotated_grid_rejected() {
        let mut raster = test_raster(4, 4, 1.0);
        raster.transform.rotation_x = 0.1;
        let geometry = square(0.0, 0.0, 2.0, 2.0);
        assert!(mask_raster(&raster, &geometry).is_err());
    }
}
