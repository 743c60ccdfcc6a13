use crate::types::{CarbonError, CarbonResult, CountryGeometry, CountryPolygon};
use gdal::vector::{FieldValue, Geometry, LayerAccess};
use gdal::Dataset;
use std::path::Path;

/// Default identifier field in the boundary dataset
const DEFAULT_ID_FIELD: &str = "ADM0_CODE";
/// Default display name field in the boundary dataset
const DEFAULT_NAME_FIELD: &str = "ADM0_NAME";

/// Read the country boundary file with the default GAUL field names.
pub fn read_country_polygons<P: AsRef<Path>>(path: P) -> CarbonResult<Vec<CountryPolygon>> {
    read_country_polygons_with_fields(path, DEFAULT_ID_FIELD, DEFAULT_NAME_FIELD)
}

/// Read one `CountryPolygon` per feature of the boundary file.
///
/// Feature order is preserved exactly: it defines the row order of every
/// table built from the result. A feature with missing or unparseable
/// geometry is kept in place with an empty geometry, so the aggregator
/// can record it as a per-country failure without shifting rows.
pub fn read_country_polygons_with_fields<P: AsRef<Path>>(
    path: P,
    id_field: &str,
    name_field: &str,
) -> CarbonResult<Vec<CountryPolygon>> {
    let path = path.as_ref();
    log::info!("Loading country polygons from {}", path.display());

    let dataset = Dataset::open(path)?;
    let mut layer = dataset.layer(0)?;

    let mut countries = Vec::new();
    for feature in layer.features() {
        let id = integer_field(feature.field(id_field)?, id_field)?;
        let name = string_field(feature.field(name_field)?, name_field)?;

        let geometry = match feature.geometry() {
            Some(geometry) => {
                if !geometry.is_valid() {
                    log::warn!("Geometry of {} ({}) reported invalid by GDAL", name, id);
                }
                CountryGeometry::new(collect_rings(geometry)?)
            }
            None => {
                log::warn!("Feature {} ({}) has no geometry", name, id);
                CountryGeometry::new(Vec::new())
            }
        };

        countries.push(CountryPolygon { id, name, geometry });
    }

    log::info!("Loaded {} country polygon(s)", countries.len());
    Ok(countries)
}

/// Flatten Polygon/MultiPolygon structure into a list of vertex rings.
fn collect_rings(geometry: &Geometry) -> CarbonResult<Vec<Vec<(f64, f64)>>> {
    let mut rings = Vec::new();
    append_rings(geometry, &mut rings)?;
    Ok(rings)
}

fn append_rings(geometry: &Geometry, rings: &mut Vec<Vec<(f64, f64)>>) -> CarbonResult<()> {
    match geometry.geometry_name().to_uppercase().as_str() {
        "LINEARRING" => {
            let ring: Vec<(f64, f64)> = geometry
                .get_point_vec()
                .into_iter()
                .map(|(x, y, _)| (x, y))
                .collect();
            if !ring.is_empty() {
                rings.push(ring);
            }
            Ok(())
        }
        "POLYGON" | "MULTIPOLYGON" | "GEOMETRYCOLLECTION" => {
            for i in 0..geometry.geometry_count() {
                let inner = geometry.get_geometry(i);
                append_rings(&inner, rings)?;
            }
            Ok(())
        }
        other => Err(CarbonError::Geometry(format!(
            "unsupported geometry type {}",
            other
        ))),
    }
}

fn integer_field(value: Option<FieldValue>, field: &str) -> CarbonResult<i64> {
    match value {
        Some(FieldValue::IntegerValue(v)) => Ok(v as i64),
        Some(FieldValue::Integer64Value(v)) => Ok(v),
        Some(FieldValue::RealValue(v)) => Ok(v as i64),
        Some(other) => Err(CarbonError::Processing(format!(
            "field {} is not an integer: {:?}",
            field, other
        ))),
        None => Err(CarbonError::Processing(format!(
            "feature is missing the {} field",
            field
        ))),
    }
}

fn string_field(value: Option<FieldValue>, field: &str) -> CarbonResult<String> {
    match value {
        Some(FieldValue::StringValue(v)) => Ok(v),
        Some(other) => Err(CarbonError::Processing(format!(
            "field {} is not a string: {:?}",
            field, other
        ))),
        None => Err(CarbonError::Processing(format!(
            "feature is missing the {} field",
            field
        ))),
    }
}
