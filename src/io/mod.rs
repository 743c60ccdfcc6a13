//! Input/output collaborators: raster and boundary loading, CSV export

pub mod raster;
pub mod vector;
pub mod export;

pub use raster::{discover_rasters, read_raster, RasterFile};
pub use vector::{read_country_polygons, read_country_polygons_with_fields};
pub use export::write_csv;
