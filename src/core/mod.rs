//! Core aggregation modules

pub mod pixel_area;
pub mod area_grid;
pub mod mask;
pub mod aggregate;
pub mod table;
pub mod batch;

// Re-export main types
pub use pixel_area::area_of_pixel;
pub use area_grid::build_area_grid;
pub use mask::mask_raster;
pub use aggregate::{aggregate_year, CountryFailure, YearAggregate};
pub use table::{CountryInfo, StockTable};
pub use batch::{run_batch, run_batch_parallel, RunSummary, YearFailure};
