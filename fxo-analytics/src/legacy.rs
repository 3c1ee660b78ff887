//! File mode: the same transformations and statistics over flat CSV files.
//!
//! A file has a `date` column, an identifier column (`process_id`, or
//! `product_id` in older exports) and any number of metric columns. A column
//! is a metric when every non-blank value in it parses as a number.

use crate::{
    analysis::{Aggregate, Period, Trend, period_series},
    encoding,
    stats::{self, TTest, Variance},
};
use fxo_core::{
    failure::InsufficientData,
    models::{Date, Map, format_date, parse_date},
};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::io::{Read, Write};

const ID_COLUMNS: [&str; 2] = ["process_id", "product_id"];
const DERIVED_COLUMNS: [&str; 2] = ["month", "year"];

/// Why a file could not be processed.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The reader or writer failed
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// The file lacks a required column
    #[error("missing column {0:?}")]
    MissingColumn(String),
    /// A column needed as numeric holds text
    #[error("column {0:?} is not numeric")]
    NotNumeric(String),
    /// A date cell failed to parse
    #[error("row {row}: invalid date {value:?}")]
    InvalidDate {
        /// One-based data row
        row: usize,
        /// The offending text
        value: String,
    },
}

/// A CSV file held in memory, with its dates parsed.
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    dates: Vec<Date>,
}

impl Table {
    fn read(input: impl Read) -> Result<Self, FileError> {
        let mut reader = csv::Reader::from_reader(input);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

        let rows = reader
            .records()
            .map(|record| Ok(record?.iter().map(str::to_owned).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        let date = position(&headers, "date")?;
        if !headers.iter().any(|h| ID_COLUMNS.contains(&h.as_str())) {
            return Err(FileError::MissingColumn(ID_COLUMNS[0].to_owned()));
        }

        let dates = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let value = row.get(date).map(String::as_str).unwrap_or_default();
                parse_date(value).map_err(|_| FileError::InvalidDate {
                    row: i + 1,
                    value: value.to_owned(),
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            headers,
            rows,
            dates,
        })
    }

    /// The column's cells as numbers, or None if any non-blank cell is not a number
    fn numeric(&self, column: usize) -> Option<Vec<Option<f64>>> {
        self.rows
            .iter()
            .map(|row| match row.get(column).map(|cell| cell.trim()) {
                None | Some("") => Some(None),
                Some(cell) => cell.parse().ok().map(Some),
            })
            .collect()
    }

    /// Every metric column, in file order
    fn metrics(&self) -> Map<String, Vec<Option<f64>>> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                name.as_str() != "date"
                    && !ID_COLUMNS.contains(&name.as_str())
                    && !DERIVED_COLUMNS.contains(&name.as_str())
            })
            .filter_map(|(i, name)| {
                let values = self.numeric(i)?;
                if values.iter().any(Option::is_some) {
                    Some((name.clone(), values))
                } else {
                    None
                }
            })
            .collect()
    }

    fn metric(&self, name: &str) -> Result<Vec<Option<f64>>, FileError> {
        let column = position(&self.headers, name)?;
        self.numeric(column)
            .ok_or_else(|| FileError::NotNumeric(name.to_owned()))
    }
}

fn position(headers: &[String], name: &str) -> Result<usize, FileError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| FileError::MissingColumn(name.to_owned()))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Row counts of a file ETL run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileEtlSummary {
    /// Data rows read
    pub rows_read: usize,
    /// Data rows written
    pub rows_written: usize,
    /// Exact duplicates dropped after transformation
    pub duplicates_dropped: usize,
}

/// Normalize a CSV file.
///
/// Dates are rewritten as `YYYY-MM-DD` and `month` and `year` columns are
/// appended (replacing any already present). Metric values are rounded to two
/// decimals. Rows that are identical after this are written once.
pub fn file_etl(input: impl Read, output: impl Write) -> Result<FileEtlSummary, FileError> {
    let table = Table::read(input)?;
    let date = position(&table.headers, "date")?;
    let metrics: FxHashSet<usize> = {
        let names = table.metrics();
        table
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| names.contains_key(*h))
            .map(|(i, _)| i)
            .collect()
    };
    let kept: Vec<usize> = (0..table.headers.len())
        .filter(|&i| !DERIVED_COLUMNS.contains(&table.headers[i].as_str()))
        .collect();

    let mut writer = csv::Writer::from_writer(output);
    let mut header: Vec<&str> = kept.iter().map(|&i| table.headers[i].as_str()).collect();
    header.extend(DERIVED_COLUMNS);
    writer.write_record(&header)?;

    let mut seen = FxHashSet::default();
    let mut rows_written = 0;
    for (row, day) in table.rows.iter().zip(&table.dates) {
        let mut record: Vec<String> = kept
            .iter()
            .map(|&i| {
                let cell = row.get(i).map(String::as_str).unwrap_or_default();
                if i == date {
                    format_date(*day)
                } else if metrics.contains(&i) {
                    match cell.trim().parse::<f64>() {
                        Ok(value) => round2(value).to_string(),
                        Err(_) => String::new(),
                    }
                } else {
                    cell.to_owned()
                }
            })
            .collect();
        record.push(u8::from(day.month()).to_string());
        record.push(day.year().to_string());

        if seen.insert(record.clone()) {
            writer.write_record(&record)?;
            rows_written += 1;
        }
    }
    writer.flush().map_err(csv::Error::from)?;

    let summary = FileEtlSummary {
        rows_read: table.rows.len(),
        rows_written,
        duplicates_dropped: table.rows.len() - rows_written,
    };
    tracing::info!(?summary, "file transformed");
    Ok(summary)
}

/// Which columns the file analysis reads.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAnalysisOptions {
    /// The metric whose daily total and monthly trend are reported
    pub metric: String,
    /// First scenario column to compare
    pub scenario_a: String,
    /// Second scenario column to compare
    pub scenario_b: String,
    /// The comparison's variance assumption
    pub variance: Variance,
    /// Columns summed row by row into a total cost; none skips the cost figures
    pub cost_columns: Vec<String>,
}

/// The file analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAnalysis {
    /// `mean_<column>` for every metric, then `mean_daily_<metric>`
    pub kpis: Map<String>,
    /// Pearson correlation between every pair of metric columns
    pub correlations: Map<String, Map<String>>,
    /// Scenario A against scenario B
    #[serde(serialize_with = "encoding::section::serialize")]
    pub comparison: Result<TTest, InsufficientData>,
    /// Monthly mean of the chosen metric
    #[serde(serialize_with = "encoding::section::serialize")]
    pub trend: Result<Trend, InsufficientData>,
    /// Monthly sum of the total cost, when cost columns were named
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "encoding::section::serialize_optional"
    )]
    pub cost_trend: Option<Result<Trend, InsufficientData>>,
}

/// Analyze a CSV file.
pub fn file_analyze(
    input: impl Read,
    options: &FileAnalysisOptions,
) -> Result<FileAnalysis, FileError> {
    let table = Table::read(input)?;
    let metrics = table.metrics();

    let metric = table.metric(&options.metric)?;
    let present = |column: Vec<Option<f64>>| -> Vec<f64> { column.into_iter().flatten().collect() };
    let scenario_a = present(table.metric(&options.scenario_a)?);
    let scenario_b = present(table.metric(&options.scenario_b)?);

    let mut kpis: Map<String> = metrics
        .iter()
        .map(|(name, values)| {
            let values: Vec<f64> = values.iter().flatten().copied().collect();
            (format!("mean_{name}"), stats::mean(&values))
        })
        .collect();

    let dated: Vec<(Date, f64)> = table
        .dates
        .iter()
        .zip(&metric)
        .filter_map(|(date, value)| Some((*date, (*value)?)))
        .collect();
    kpis.insert(
        format!("mean_daily_{}", options.metric),
        stats::mean_of_totals(dated.iter().copied()),
    );

    let series = period_series(dated, Period::Month, Aggregate::Mean);

    let costs = options
        .cost_columns
        .iter()
        .map(|name| table.metric(name))
        .collect::<Result<Vec<_>, _>>()?;
    let cost_trend = (!costs.is_empty()).then(|| {
        // blank cells add nothing to a row's total
        let totals: Vec<(Date, f64)> = table
            .dates
            .iter()
            .enumerate()
            .map(|(row, date)| {
                let total = costs.iter().map(|column| column[row].unwrap_or(0.0)).sum();
                (*date, total)
            })
            .collect();
        let values: Vec<f64> = totals.iter().map(|(_, total)| *total).collect();
        kpis.insert("mean_total_cost".to_owned(), stats::mean(&values));

        let series = period_series(totals, Period::Month, Aggregate::Sum);
        Trend::fit(&series, "cost per month".to_owned())
    });

    Ok(FileAnalysis {
        kpis,
        correlations: stats::correlation_matrix(&metrics),
        comparison: stats::t_test(&scenario_a, &scenario_b, options.variance),
        trend: Trend::fit(&series, format!("{} per month", options.metric)),
        cost_trend,
    })
}
