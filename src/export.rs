// CSV export of the merged derived table
use crate::analyzer::AnalysisReport;
use crate::model::ExportError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes every row of the report: header row, no index column, absent values as
/// empty cells. Output depends only on the report, so it is reproducible.
pub fn write_csv<W: Write>(report: &AnalysisReport, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(report.columns.headers())?;

    for row in report.rows() {
        let bar = &row.bar;
        let mut record = vec![
            bar.ticker.clone(),
            bar.date.format("%Y-%m-%d").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            cell(bar.adjusted_close),
            bar.volume.to_string(),
            cell(row.pct_change),
        ];
        record.extend(row.derived_values().into_iter().map(cell));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_file(report: &AnalysisReport, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv(report, file)?;
    info!("💾 Exported {} rows to {}", report.rows().count(), path.display());
    Ok(())
}

/// Base columns of an exported row. Derived columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportedBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: Option<f64>,
    pub volume: u64,
    pub pct_change: Option<f64>,
}

pub fn read_export<R: Read>(reader: R) -> Result<Vec<ExportedBar>, ExportError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows = rdr.deserialize().collect::<Result<Vec<ExportedBar>, _>>()?;
    Ok(rows)
}
