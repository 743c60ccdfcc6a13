use crate::types::{CarbonError, CarbonResult, CountryPolygon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifying columns of a table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    pub id: i64,
    pub name: String,
}

/// Country-by-year table of total carbon stocks in tonnes.
///
/// Rows are the countries in polygon-set order, fixed when the table is
/// created; columns are years, kept sorted ascending. Cells are
/// `Option<f64>` so failed aggregations stay visible as explicit missing
/// values instead of silently becoming zero.
#[derive(Debug, Clone)]
pub struct StockTable {
    countries: Vec<CountryInfo>,
    columns: BTreeMap<u16, Vec<Option<f64>>>,
}

impl StockTable {
    /// Seed the accumulator from the country polygon set.
    ///
    /// Every column merged later is validated against this row count and
    /// order; the country list is never re-derived per year.
    pub fn new(countries: &[CountryPolygon]) -> Self {
        Self {
            countries: countries
                .iter()
                .map(|c| CountryInfo {
                    id: c.id,
                    name: c.name.clone(),
                })
                .collect(),
            columns: BTreeMap::new(),
        }
    }

    /// Merge one year's totals as a new column.
    ///
    /// The merge is positional: `totals[i]` belongs to row `i`. A length
    /// that differs from the country set fails with `RowCountMismatch`
    /// rather than truncating or misaligning rows.
    pub fn insert_year(&mut self, year: u16, totals: Vec<Option<f64>>) -> CarbonResult<()> {
        if totals.len() != self.countries.len() {
            return Err(CarbonError::RowCountMismatch {
                year,
                expected: self.countries.len(),
                got: totals.len(),
            });
        }
        if self.columns.contains_key(&year) {
            return Err(CarbonError::Processing(format!(
                "duplicate column for year {}",
                year
            )));
        }
        self.columns.insert(year, totals);
        Ok(())
    }

    pub fn countries(&self) -> &[CountryInfo] {
        &self.countries
    }

    pub fn num_rows(&self) -> usize {
        self.countries.len()
    }

    /// Year labels in ascending order
    pub fn years(&self) -> Vec<u16> {
        self.columns.keys().copied().collect()
    }

    pub fn column(&self, year: u16) -> Option<&[Option<f64>]> {
        self.columns.get(&year).map(|c| c.as_slice())
    }

    pub fn cell(&self, row: usize, year: u16) -> Option<f64> {
        self.columns.get(&year).and_then(|c| c.get(row)).copied().flatten()
    }

    /// Iterate rows in country order, cells in ascending year order
    pub fn rows(&self) -> impl Iterator<Item = (&CountryInfo, Vec<Option<f64>>)> {
        self.countries.iter().enumerate().map(move |(row, info)| {
            let cells = self.columns.values().map(|col| col[row]).collect();
            (info, cells)
        })
    }
}
