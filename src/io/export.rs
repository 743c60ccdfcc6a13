use crate::core::table::StockTable;
use crate::types::CarbonResult;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export the aggregated table as delimited text.
///
/// Columns: country id, name, then one column per year labeled with the
/// 4-digit year, ascending. Missing cells (failed aggregations) are
/// written as empty fields, never as zero.
pub fn write_csv<P: AsRef<Path>>(table: &StockTable, path: P) -> CarbonResult<()> {
    let path = path.as_ref();
    log::info!(
        "Writing {} rows x {} year column(s) to {}",
        table.num_rows(),
        table.years().len(),
        path.display()
    );

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    write!(out, "id,name")?;
    for year in table.years() {
        write!(out, ",{:04}", year)?;
    }
    writeln!(out)?;

    for (info, cells) in table.rows() {
        write!(out, "{},{}", info.id, escape_field(&info.name))?;
        for cell in cells {
            match cell {
                Some(value) => write!(out, ",{}", value)?,
                None => write!(out, ",")?,
            }
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
