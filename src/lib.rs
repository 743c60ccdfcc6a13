//! carbonstock: country-level aggregation of vegetation carbon stocks
//!
//! This library turns a time series of global carbon density rasters
//! (tonnes/hectare) into per-country total stocks (tonnes). Each year's
//! raster is masked to every country polygon, cell densities are weighted
//! by ellipsoidal ground area (cells shrink toward the poles), and the
//! per-country sums are accumulated into a country-by-year table that can
//! be exported as CSV.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    AreaGrid, BoundingBox, CarbonError, CarbonResult, CountryGeometry, CountryPolygon,
    DensityGrid, GeoTransform, MaskedGrid, RasterGrid,
};

pub use core::{
    aggregate_year, area_of_pixel, build_area_grid, mask_raster, run_batch, run_batch_parallel,
    CountryFailure, CountryInfo, RunSummary, StockTable, YearAggregate, YearFailure,
};

pub use io::{discover_rasters, read_country_polygons, read_raster, write_csv, RasterFile};
