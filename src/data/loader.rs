//! CSV ingest for daily closing prices.
//!
//! Turns a `Date`/`Close` CSV (any column order, extra columns ignored) into a
//! gap-free business-day [`PriceSeries`]:
//!
//! 1. parse dates and closes (empty or `NA`-style closes are missing values)
//! 2. sort ascending and reject duplicate dates
//! 3. reindex to every business day between the first and last date
//! 4. forward-fill missing closes
//!
//! Weekend rows fall outside the business-day index and are dropped. Leading
//! business days with nothing to forward-fill from are dropped as well.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::{calendar, PriceSeries};
use crate::error::PipelineError;

const DATE_COLUMN: &str = "date";
const CLOSE_COLUMN: &str = "close";

/// Tokens read as a missing close.
const MISSING_TOKENS: [&str; 5] = ["na", "nan", "n/a", "null", "none"];

/// Load and normalize a price CSV from disk.
pub fn load_price_series(path: &Path) -> Result<PriceSeries, PipelineError> {
    let file = File::open(path).map_err(|e| {
        PipelineError::DataLoad(format!("failed to open '{}': {e}", path.display()))
    })?;
    let series = read_price_series(file)?;
    debug!(
        path = %path.display(),
        rows = series.len(),
        first = %series.first_date(),
        last = %series.last_date(),
        "loaded price series"
    );
    Ok(series)
}

/// Parse and normalize price CSV content from any reader.
pub fn read_price_series<R: Read>(input: R) -> Result<PriceSeries, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::DataLoad(format!("failed to read CSV header: {e}")))?
        .clone();

    if headers.iter().all(|h| normalize_header_name(h).is_empty()) {
        return Err(PipelineError::EmptyData("source has no header row".to_string()));
    }

    let header_map = build_header_map(&headers);
    let date_idx = *header_map
        .get(DATE_COLUMN)
        .ok_or_else(|| PipelineError::DataLoad("missing required column: `Date`".to_string()))?;
    let close_idx = *header_map
        .get(CLOSE_COLUMN)
        .ok_or_else(|| PipelineError::DataLoad("missing required column: `Close`".to_string()))?;

    let mut rows: Vec<(NaiveDate, Option<f64>)> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result
            .map_err(|e| PipelineError::DataLoad(format!("line {line}: CSV parse error: {e}")))?;
        rows.push(parse_row(&record, date_idx, close_idx).map_err(|e| {
            PipelineError::DataLoad(format!("line {line}: {e}"))
        })?);
    }

    if rows.is_empty() {
        return Err(PipelineError::EmptyData(
            "source has a header but no rows".to_string(),
        ));
    }

    rows.sort_by_key(|(date, _)| *date);
    if let Some(pair) = rows.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(PipelineError::DataLoad(format!("duplicate date {}", pair[0].0)));
    }

    reindex_business_days(&rows)
}

/// Reindex sorted, unique rows onto the business-day calendar with forward fill.
fn reindex_business_days(rows: &[(NaiveDate, Option<f64>)]) -> Result<PriceSeries, PipelineError> {
    let first = rows[0].0;
    let last = rows[rows.len() - 1].0;
    let observed: HashMap<NaiveDate, Option<f64>> = rows.iter().copied().collect();

    let mut dates = Vec::new();
    let mut closes = Vec::new();
    let mut carried: Option<f64> = None;
    let mut filled = 0usize;
    let mut leading = 0usize;

    for day in calendar::business_days(first, last) {
        match observed.get(&day).copied().flatten() {
            Some(v) => carried = Some(v),
            None if carried.is_some() => filled += 1,
            None => leading += 1,
        }
        if let Some(v) = carried {
            dates.push(day);
            closes.push(v);
        }
    }

    debug!(
        rows = rows.len(),
        business_days = dates.len(),
        filled,
        dropped_leading = leading,
        "reindexed to business-day frequency"
    );

    if dates.is_empty() {
        return Err(PipelineError::EmptyData(
            "no business-day closing prices in source".to_string(),
        ));
    }

    PriceSeries::new(dates, closes)
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    close_idx: usize,
) -> Result<(NaiveDate, Option<f64>), String> {
    let raw_date = record
        .get(date_idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing `Date` value".to_string())?;
    let date = parse_date(raw_date)?;
    let close = parse_close(record.get(close_idx).unwrap_or(""))?;
    Ok((date, close))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins if a header is repeated.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    // Offset timestamps keep their local calendar date.
    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.date_naive());
        }
    }
    Err(format!(
        "invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, DD-MM-YYYY, or an ISO datetime."
    ))
}

fn parse_close(s: &str) -> Result<Option<f64>, String> {
    let s = s.trim();
    if s.is_empty() || MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("non-numeric `Close` value '{s}'"))?;
    if !v.is_finite() {
        return Err(format!("non-finite `Close` value '{s}'"));
    }
    Ok(Some(v))
}
