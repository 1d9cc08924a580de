//! CSV series loading and saving.
//!
//! Input format: header `timestamp,open,high,low,close,volume`, RFC 3339
//! timestamps. Malformed rows are skipped with a collected warning rather
//! than failing the whole load; a file that yields zero valid candles is a
//! hard `DataError::Format`.

use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Candle;

/// Errors from the series provider.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data format error: {0}")]
    Format(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// A loaded candle series plus the row-level warnings produced on the way.
///
/// Warnings are carried on the result instead of being logged inline; the
/// CLI decides whether and where to print them.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub candles: Vec<Candle>,
    pub warnings: Vec<String>,
}

const EXPECTED_HEADER: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

/// Load a candle series from a CSV file.
///
/// Rows that fail to parse, or whose timestamp does not advance past the
/// previous accepted row, are skipped with a warning. The returned series
/// is guaranteed non-empty with strictly increasing timestamps.
pub fn load_csv(path: &Path) -> Result<LoadedSeries, DataError> {
    let mut reader = csv::Reader::from_path(path)?;

    let header = reader.headers()?.clone();
    let actual: Vec<&str> = header.iter().map(str::trim).collect();
    if actual != EXPECTED_HEADER {
        return Err(DataError::Format(format!(
            "unexpected header '{}', expected '{}'",
            actual.join(","),
            EXPECTED_HEADER.join(",")
        )));
    }

    let mut candles: Vec<Candle> = Vec::new();
    let mut warnings = Vec::new();

    for (row_idx, record) in reader.records().enumerate() {
        // 1-based data row number, for humans reading the warning
        let row = row_idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warnings.push(format!("row {row}: unreadable record, skipped ({e})"));
                continue;
            }
        };

        match parse_row(&record) {
            Ok(candle) => {
                if let Some(last) = candles.last() {
                    if candle.timestamp <= last.timestamp {
                        warnings.push(format!(
                            "row {row}: timestamp {} does not advance past {}, skipped",
                            candle.timestamp, last.timestamp
                        ));
                        continue;
                    }
                }
                candles.push(candle);
            }
            Err(reason) => {
                warnings.push(format!("row {row}: {reason}, skipped"));
            }
        }
    }

    if candles.is_empty() {
        return Err(DataError::Format(format!(
            "{}: no valid candle rows",
            path.display()
        )));
    }

    Ok(LoadedSeries { candles, warnings })
}

fn parse_row(record: &csv::StringRecord) -> Result<Candle, String> {
    if record.len() != EXPECTED_HEADER.len() {
        return Err(format!("expected 6 fields, found {}", record.len()));
    }

    let timestamp: DateTime<Utc> = record[0]
        .trim()
        .parse()
        .map_err(|_| format!("bad timestamp '{}'", &record[0]))?;

    let mut fields = [0.0_f64; 5];
    for (i, field) in fields.iter_mut().enumerate() {
        let raw = record[i + 1].trim();
        *field = raw
            .parse()
            .map_err(|_| format!("bad {} value '{raw}'", EXPECTED_HEADER[i + 1]))?;
    }

    let candle = Candle {
        timestamp,
        open: fields[0],
        high: fields[1],
        low: fields[2],
        close: fields[3],
        volume: fields[4],
    };

    if !candle.is_sane() {
        return Err("inconsistent OHLC values".to_string());
    }
    Ok(candle)
}

/// Save a candle series to a CSV file in the load format.
pub fn save_csv(candles: &[Candle], path: &Path) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(EXPECTED_HEADER)?;
    for c in candles {
        wtr.write_record([
            c.timestamp.to_rfc3339(),
            format!("{:.8}", c.open),
            format!("{:.8}", c.high),
            format!("{:.8}", c.low),
            format!("{:.8}", c.close),
            format!("{:.8}", c.volume),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{generate, Trend};
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_well_formed_file() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n\
             2024-01-02T00:00:00Z,100.0,101.0,99.0,100.5,1000\n\
             2024-01-02T00:01:00Z,100.5,102.0,100.0,101.5,1200\n",
        );
        let series = load_csv(file.path()).unwrap();
        assert_eq!(series.candles.len(), 2);
        assert!(series.warnings.is_empty());
        assert!((series.candles[1].close - 101.5).abs() < 1e-10);
    }

    #[test]
    fn malformed_rows_skipped_with_warning() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n\
             2024-01-02T00:00:00Z,100.0,101.0,99.0,100.5,1000\n\
             not-a-timestamp,100.5,102.0,100.0,101.5,1200\n\
             2024-01-02T00:02:00Z,abc,102.0,100.0,101.5,1200\n\
             2024-01-02T00:03:00Z,101.0,103.0,100.5,102.0,900\n",
        );
        let series = load_csv(file.path()).unwrap();
        assert_eq!(series.candles.len(), 2);
        assert_eq!(series.warnings.len(), 2);
        assert!(series.warnings[0].contains("bad timestamp"));
        assert!(series.warnings[1].contains("bad open"));
    }

    #[test]
    fn out_of_order_timestamp_skipped() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n\
             2024-01-02T00:05:00Z,100.0,101.0,99.0,100.5,1000\n\
             2024-01-02T00:01:00Z,100.5,102.0,100.0,101.5,1200\n\
             2024-01-02T00:06:00Z,101.0,103.0,100.5,102.0,900\n",
        );
        let series = load_csv(file.path()).unwrap();
        assert_eq!(series.candles.len(), 2);
        assert_eq!(series.warnings.len(), 1);
        assert!(series.warnings[0].contains("does not advance"));
    }

    #[test]
    fn wrong_header_is_format_error() {
        let file = write_temp("time,o,h,l,c,v\n2024-01-02T00:00:00Z,1,1,1,1,1\n");
        let err = load_csv(file.path()).unwrap_err();
        assert!(matches!(err, DataError::Format(_)));
    }

    #[test]
    fn all_rows_bad_is_format_error() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n\
             nope,1,1,1,1,1\n",
        );
        let err = load_csv(file.path()).unwrap_err();
        assert!(matches!(err, DataError::Format(_)));
    }

    #[test]
    fn insane_ohlc_skipped() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n\
             2024-01-02T00:00:00Z,100.0,99.0,101.0,100.5,1000\n\
             2024-01-02T00:01:00Z,100.5,102.0,100.0,101.5,1200\n",
        );
        let series = load_csv(file.path()).unwrap();
        assert_eq!(series.candles.len(), 1);
        assert!(series.warnings[0].contains("inconsistent OHLC"));
    }

    #[test]
    fn save_load_roundtrip() {
        let candles = generate(50, 100.0, Trend::Sideways, 7);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");

        save_csv(&candles, &path).unwrap();
        let loaded = load_csv(&path).unwrap();

        assert_eq!(loaded.candles.len(), candles.len());
        assert!(loaded.warnings.is_empty());
        for (a, b) in candles.iter().zip(&loaded.candles) {
            assert_eq!(a.timestamp, b.timestamp);
            assert!((a.close - b.close).abs() < 1e-6);
        }
    }
}
