use crate::core::area_grid::build_area_grid;
use crate::core::mask::mask_raster;
use crate::types::{CarbonResult, CountryPolygon, RasterGrid};

/// A country that could not be aggregated for one year
#[derive(Debug, Clone)]
pub struct CountryFailure {
    /// Position in the country polygon set
    pub index: usize,
    pub id: i64,
    pub name: String,
    pub error: String,
}

/// Aggregation output for a single year.
///
/// `totals` is aligned index-for-index with the country polygon set the
/// aggregation ran over; `None` marks a recorded per-country failure.
#[derive(Debug, Clone)]
pub struct YearAggregate {
    pub year: u16,
    pub totals: Vec<Option<f64>>,
    pub failures: Vec<CountryFailure>,
}

/// Total carbon stock per country for one year's raster.
///
/// Countries are processed in polygon-set order. A failing country
/// (invalid geometry) is recorded and skipped; it never aborts the rest
/// of the year. A country with no raster overlap contributes a total of
/// zero.
pub fn aggregate_year(raster: &RasterGrid, countries: &[CountryPolygon]) -> YearAggregate {
    log::info!(
        "Aggregating year {} over {} countries",
        raster.year,
        countries.len()
    );

    let mut totals = Vec::with_capacity(countries.len());
    let mut failures = Vec::new();

    for (index, country) in countries.iter().enumerate() {
        match country_total(raster, country) {
            Ok(total) => {
                log::debug!(
                    "{} ({}): {:.1} t for {}",
                    country.name,
                    country.id,
                    total,
                    raster.year
                );
                totals.push(Some(total));
            }
            Err(e) => {
                log::warn!(
                    "Skipping {} ({}) for year {}: {}",
                    country.name,
                    country.id,
                    raster.year,
                    e
                );
                failures.push(CountryFailure {
                    index,
                    id: country.id,
                    name: country.name.clone(),
                    error: e.to_string(),
                });
                totals.push(None);
            }
        }
    }

    log::info!(
        "Year {} finished: {} countries, {} failures",
        raster.year,
        countries.len(),
        failures.len()
    );

    YearAggregate {
        year: raster.year,
        totals,
        failures,
    }
}

/// Total carbon stock in tonnes for one country.
///
/// Masks the raster to the polygon, weights each remaining cell's
/// density (t/ha) by its ground area (ha), and sums. No-data cells
/// contribute zero; the NaN sentinel never reaches the total.
fn country_total(raster: &RasterGrid, country: &CountryPolygon) -> CarbonResult<f64> {
    country.geometry.validate()?;

    let masked = match mask_raster(raster, &country.geometry)? {
        Some(masked) => masked,
        None => return Ok(0.0),
    };

    let areas = build_area_grid(masked.data.dim(), &masked.transform, raster.pixel_size)?;

    let mut total = 0.0_f64;
    for (density, area) in masked.data.iter().zip(areas.iter()) {
        if !density.is_nan() {
            total += *density as f64 * *area;
        }
    }
    Ok(total)
}
