use crate::core::aggregate::{aggregate_year, CountryFailure, YearAggregate};
use crate::core::table::StockTable;
use crate::io::raster::{read_raster, RasterFile};
use crate::types::{CarbonResult, CountryPolygon};
use rayon::prelude::*;

/// A year whose raster could not be processed at all
#[derive(Debug, Clone)]
pub struct YearFailure {
    pub year: u16,
    pub error: String,
}

/// Everything that went wrong during a batch run.
///
/// Failures are isolated as they happen; this report is the user-visible
/// account of them at the end of the run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Years dropped entirely (unreadable raster, failed column merge)
    pub year_failures: Vec<YearFailure>,
    /// Countries skipped within otherwise successful years
    pub country_failures: Vec<(u16, CountryFailure)>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.year_failures.is_empty() && self.country_failures.is_empty()
    }

    /// Enumerate every failure encountered, at warn level
    pub fn log_summary(&self) {
        if self.is_clean() {
            log::info!("Batch finished with no failures");
            return;
        }
        for failure in &self.year_failures {
            log::warn!("Year {} failed: {}", failure.year, failure.error);
        }
        for (year, failure) in &self.country_failures {
            log::warn!(
                "Country {} ({}) missing for {}: {}",
                failure.name,
                failure.id,
                year,
                failure.error
            );
        }
        log::warn!(
            "Batch finished with {} year failure(s) and {} country failure(s)",
            self.year_failures.len(),
            self.country_failures.len()
        );
    }
}

/// Aggregate a set of year rasters into one country-by-year table.
///
/// Years are processed sequentially in the given order. A year whose
/// raster cannot be read is recorded in the summary and skipped; the
/// remaining years continue. The raster file handle is scoped to each
/// year's read and released before aggregation of the next year starts.
pub fn run_batch(
    files: &[RasterFile],
    countries: &[CountryPolygon],
) -> (StockTable, RunSummary) {
    let mut table = StockTable::new(countries);
    let mut summary = RunSummary::default();

    for file in files {
        let result = process_year(file, countries);
        merge_year(file.year, result, &mut table, &mut summary);
    }

    summary.log_summary();
    (table, summary)
}

/// Parallel variant of [`run_batch`].
///
/// Years are independent, so each worker owns its year's raster grid for
/// the duration of that year; columns are merged sequentially in year
/// order afterwards. Totals are identical to the sequential path.
pub fn run_batch_parallel(
    files: &[RasterFile],
    countries: &[CountryPolygon],
) -> (StockTable, RunSummary) {
    let mut results: Vec<(u16, CarbonResult<YearAggregate>)> = files
        .par_iter()
        .map(|file| (file.year, process_year(file, countries)))
        .collect();
    results.sort_by_key(|(year, _)| *year);

    let mut table = StockTable::new(countries);
    let mut summary = RunSummary::default();
    for (year, result) in results {
        merge_year(year, result, &mut table, &mut summary);
    }

    summary.log_summary();
    (table, summary)
}

fn process_year(file: &RasterFile, countries: &[CountryPolygon]) -> CarbonResult<YearAggregate> {
    let raster = read_raster(&file.path, file.year)?;
    Ok(aggregate_year(&raster, countries))
}

fn merge_year(
    year: u16,
    result: CarbonResult<YearAggregate>,
    table: &mut StockTable,
    summary: &mut RunSummary,
) {
    match result {
        Ok(aggregate) => {
            for failure in aggregate.failures {
                summary.country_failures.push((year, failure));
            }
            if let Err(e) = table.insert_year(year, aggregate.totals) {
                log::warn!("Dropping column for year {}: {}", year, e);
                summary.year_failures.push(YearFailure {
                    year,
                    error: e.to_string(),
                });
            }
        }
        Err(e) => {
            log::warn!("Skipping year {}: {}", year, e);
            summary.year_failures.push(YearFailure {
                year,
                error: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CountryGeometry, CountryPolygon};
    use std::path::PathBuf;

    fn one_country() -> Vec<CountryPolygon> {
        vec![CountryPolygon {
            id: 1,
            name: "A".to_string(),
            geometry: CountryGeometry::new(vec![vec![
                (0.0, 0.0),
                (1.0, 0.0),
                (1.0, 1.0),
                (0.0, 0.0),
            ]]),
        }]
    }

    #[test]
    fn test_unreadable_year_is_isolated() {
        let files = vec![RasterFile {
            path: PathBuf::from("/nonexistent/vcs_2001_global_300m.tif"),
            year: 2001,
        }];
        let (table, summary) = run_batch(&files, &one_country());

        assert!(table.years().is_empty());
        assert_eq!(summary.year_failures.len(), 1);
        assert_eq!(summary.year_failures[0].year, 2001);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_empty_batch_is_clean() {
        let (table, summary) = run_batch(&[], &one_country());
        assert!(table.years().is_empty());
        assert_eq!(table.num_rows(), 1);
        assert!(summary.is_clean());
    }
}
