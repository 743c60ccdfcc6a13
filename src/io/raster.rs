use crate::types::{CarbonError, CarbonResult, GeoTransform, RasterGrid};
use gdal::Dataset;
use ndarray::Array2;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Tolerated relative difference between the x and y pixel sizes
const PIXEL_SIZE_TOLERANCE: f64 = 1e-6;

/// A discovered raster file and the year encoded in its name
#[derive(Debug, Clone)]
pub struct RasterFile {
    pub path: PathBuf,
    pub year: u16,
}

/// Scan a directory for year rasters following the
/// `vcs_<YYYY>_global_300m.tif` naming convention.
///
/// Non-matching .tif files are skipped with a warning. The result is
/// sorted ascending by year.
pub fn discover_rasters<P: AsRef<Path>>(dir: P) -> CarbonResult<Vec<RasterFile>> {
    let dir = dir.as_ref();
    log::info!("Scanning {} for year rasters", dir.display());

    let pattern = Regex::new(r"^vcs_(\d{4})_global_300m\.tif$")
        .expect("raster filename pattern is valid");

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(captures) = pattern.captures(&name) {
            // The year group is four digits, parse cannot fail
            let year: u16 = captures[1].parse().expect("year group is numeric");
            files.push(RasterFile {
                path: entry.path(),
                year,
            });
        } else if name.ends_with(".tif") {
            log::warn!("Ignoring {}: does not follow the vcs_YYYY_global_300m.tif convention", name);
        }
    }

    files.sort_by_key(|f| f.year);
    log::info!("Found {} year raster(s)", files.len());
    Ok(files)
}

/// Read a single-band carbon density raster into memory.
///
/// The dataset must carry a geographic (degree) coordinate system and
/// square pixels; violations are reported as `RasterRead` and make the
/// year unusable without affecting other years. The GDAL handle is
/// released when this function returns.
pub fn read_raster<P: AsRef<Path>>(path: P, year: u16) -> CarbonResult<RasterGrid> {
    let path = path.as_ref();
    log::info!("Reading raster for year {}: {}", year, path.display());

    let dataset = Dataset::open(path)
        .map_err(|e| CarbonError::RasterRead(format!("{}: {}", path.display(), e)))?;

    let spatial_ref = dataset
        .spatial_ref()
        .map_err(|e| CarbonError::RasterRead(format!("{}: no spatial reference ({})", path.display(), e)))?;
    if !spatial_ref.is_geographic() {
        return Err(CarbonError::RasterRead(format!(
            "{}: expected a geographic (degree) CRS",
            path.display()
        )));
    }

    let geo_transform = dataset.geo_transform()?;
    let transform = GeoTransform::from_gdal(geo_transform);

    let pixel_width = transform.pixel_width.abs();
    let pixel_height = transform.pixel_height.abs();
    if (pixel_width - pixel_height).abs() > PIXEL_SIZE_TOLERANCE * pixel_width {
        return Err(CarbonError::RasterRead(format!(
            "{}: non-square pixels ({} x {} degrees)",
            path.display(),
            pixel_width,
            pixel_height
        )));
    }

    let (width, height) = dataset.raster_size();
    log::debug!("Raster size: {}x{}", width, height);
    log::debug!("Geotransform: {:?}", geo_transform);

    let rasterband = dataset.rasterband(1)?;
    let nodata = rasterband.no_data_value().map(|v| v as f32);
    let band_data = rasterband.read_as::<f32>((0, 0), (width, height), (width, height), None)?;

    let data = Array2::from_shape_vec((height, width), band_data.data)
        .map_err(|e| CarbonError::RasterRead(format!("failed to reshape raster data: {}", e)))?;

    Ok(RasterGrid {
        year,
        data,
        transform,
        nodata,
        pixel_size: pixel_width,
    })
}
