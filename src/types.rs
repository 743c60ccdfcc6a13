use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Carbon stock density values as stored per raster cell (tonnes/hectare)
pub type DensityGrid = Array2<f32>;

/// Per-cell ground areas in hectares
pub type AreaGrid = Array2<f64>;

/// Geospatial bounding box (degrees)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Check whether two boxes share any extent
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }
}

/// Geospatial transformation parameters (GDAL affine convention)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build from the 6-element array returned by GDAL
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    /// Geographic coordinates of a cell center.
    ///
    /// Row maps to y/latitude, column to x/longitude.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let col = col as f64 + 0.5;
        let row = row as f64 + 0.5;
        let x = self.top_left_x + col * self.pixel_width + row * self.rotation_x;
        let y = self.top_left_y + col * self.rotation_y + row * self.pixel_height;
        (x, y)
    }

    /// Transform for a sub-window starting at (row_off, col_off).
    ///
    /// Cropping shifts the origin; pixel sizes and rotations are unchanged.
    pub fn windowed(&self, row_off: usize, col_off: usize) -> Self {
        let col = col_off as f64;
        let row = row_off as f64;
        Self {
            top_left_x: self.top_left_x + col * self.pixel_width + row * self.rotation_x,
            pixel_width: self.pixel_width,
            rotation_x: self.rotation_x,
            top_left_y: self.top_left_y + col * self.rotation_y + row * self.pixel_height,
            rotation_y: self.rotation_y,
            pixel_height: self.pixel_height,
        }
    }

    /// True when the grid is axis-aligned (no rotation terms)
    pub fn is_north_up(&self) -> bool {
        self.rotation_x == 0.0 && self.rotation_y == 0.0
    }
}

/// One year's carbon stock raster held in memory
#[derive(Debug, Clone)]
pub struct RasterGrid {
    /// Year the raster describes (from the filename convention)
    pub year: u16,
    /// Density values, (rows, cols)
    pub data: DensityGrid,
    /// Maps grid indices to geographic coordinates
    pub transform: GeoTransform,
    /// No-data sentinel declared by the file, if any
    pub nodata: Option<f32>,
    /// Angular edge length of a square cell in degrees
    pub pixel_size: f64,
}

impl RasterGrid {
    /// Geographic extent covered by the grid
    pub fn extent(&self) -> BoundingBox {
        let (rows, cols) = self.data.dim();
        let x_end = self.transform.top_left_x + cols as f64 * self.transform.pixel_width;
        let y_end = self.transform.top_left_y + rows as f64 * self.transform.pixel_height;
        BoundingBox {
            min_lon: self.transform.top_left_x.min(x_end),
            max_lon: self.transform.top_left_x.max(x_end),
            min_lat: self.transform.top_left_y.min(y_end),
            max_lat: self.transform.top_left_y.max(y_end),
        }
    }
}

/// Country boundary as rings of (lon, lat) vertices.
///
/// All rings participate in even-odd containment, so interior rings
/// (holes) are excluded without being tracked separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryGeometry {
    pub rings: Vec<Vec<(f64, f64)>>,
}

impl CountryGeometry {
    pub fn new(rings: Vec<Vec<(f64, f64)>>) -> Self {
        Self { rings }
    }

    /// Bounding box over all rings, or None for an empty geometry
    pub fn bbox(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for (lon, lat) in self.rings.iter().flatten() {
            match bbox.as_mut() {
                Some(b) => {
                    b.min_lon = b.min_lon.min(*lon);
                    b.max_lon = b.max_lon.max(*lon);
                    b.min_lat = b.min_lat.min(*lat);
                    b.max_lat = b.max_lat.max(*lat);
                }
                None => {
                    bbox = Some(BoundingBox {
                        min_lon: *lon,
                        max_lon: *lon,
                        min_lat: *lat,
                        max_lat: *lat,
                    });
                }
            }
        }
        bbox
    }

    /// Structural validity check.
    ///
    /// Catches empty geometries, degenerate rings and non-finite
    /// coordinates. Topological validity (self-intersection) is GDAL's
    /// responsibility at load time.
    pub fn validate(&self) -> CarbonResult<()> {
        if self.rings.is_empty() {
            return Err(CarbonError::Geometry("empty geometry".to_string()));
        }
        for ring in &self.rings {
            // A closed ring repeats its first vertex; either form must
            // still describe at least a triangle.
            let closed = ring.len() > 1 && ring.first() == ring.last();
            let vertices = if closed { ring.len() - 1 } else { ring.len() };
            if vertices < 3 {
                return Err(CarbonError::Geometry(format!(
                    "degenerate ring with {} vertices",
                    vertices
                )));
            }
            for (lon, lat) in ring {
                if !lon.is_finite() || !lat.is_finite() {
                    return Err(CarbonError::Geometry(
                        "non-finite coordinate in ring".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Even-odd ray-cast containment over all rings
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let (xi, yi) = ring[i];
                let (xj, yj) = ring[j];
                if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

/// One record of the country polygon set.
///
/// The set's order is fixed at load time and defines the row order of
/// every table built from it.
#[derive(Debug, Clone)]
pub struct CountryPolygon {
    /// Stable integer identifier from the boundary dataset
    pub id: i64,
    /// Display name
    pub name: String,
    pub geometry: CountryGeometry,
}

/// Raster subgrid clipped to one country polygon.
///
/// Cells outside the polygon (or flagged no-data) hold NaN. Carries its
/// own transform because cropping shifts the origin.
#[derive(Debug, Clone)]
pub struct MaskedGrid {
    pub data: DensityGrid,
    pub transform: GeoTransform,
}

/// Error types for carbon stock aggregation
#[derive(Debug, thiserror::Error)]
pub enum CarbonError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid latitude: |{center_lat}| + {pixel_size}/2 exceeds 90 degrees")]
    InvalidLatitude { center_lat: f64, pixel_size: f64 },

    #[error("invalid pixel size: {0} degrees")]
    InvalidPixelSize(f64),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("raster read error: {0}")]
    RasterRead(String),

    #[error("row count mismatch for year {year}: {got} totals for {expected} countries")]
    RowCountMismatch {
        year: u16,
        expected: usize,
        got: usize,
    },

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("processing error: {0}")]
    Processing(String),
}

/// Result type for aggregation operations
pub type CarbonResult<T> = Result<T, CarbonError>;
