use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use stochrsi_core::{Bar, DataError};

/// Load OHLCV bars from a CSV file. The instrument is taken from the file stem.
///
/// Expected columns (case-insensitive, flexible ordering):
/// `timestamp` (or `date`, `datetime`, `time`), `open`, `high`, `low`, `close`,
/// and optionally `volume`. A missing volume column loads as zero volume.
pub fn load_bars_from_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let instrument = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let file = std::fs::File::open(path)?;
    let bars = load_bars_from_reader(file, &instrument)?;
    tracing::debug!(path = %path.display(), bars = bars.len(), "Loaded bars from CSV");
    Ok(bars)
}

/// Load OHLCV bars from any CSV source, sorted by timestamp.
pub fn load_bars_from_reader<R: Read>(source: R, instrument: &str) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(format!("Failed to read headers: {}", e)))?
        .clone();

    let col_map = resolve_bar_columns(&headers)?;

    let mut bars = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::ParseError(format!("CSV record error: {}", e)))?;
        let field = |idx: usize| {
            record.get(idx).ok_or_else(|| {
                DataError::ParseError(format!("Row {} is missing column {}", line + 1, idx + 1))
            })
        };

        let timestamp = parse_timestamp(field(col_map.timestamp)?)?;
        let open = parse_decimal(field(col_map.open)?, "open")?;
        let high = parse_decimal(field(col_map.high)?, "high")?;
        let low = parse_decimal(field(col_map.low)?, "low")?;
        let close = parse_decimal(field(col_map.close)?, "close")?;
        let volume = match col_map.volume {
            Some(idx) => parse_decimal(field(idx)?, "volume")?,
            None => Decimal::ZERO,
        };

        bars.push(Bar {
            instrument: instrument.to_string(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct BarColumnMap {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

fn resolve_bar_columns(headers: &csv::StringRecord) -> Result<BarColumnMap, DataError> {
    Ok(BarColumnMap {
        timestamp: required_column(headers, &["timestamp", "date", "datetime", "time"], "timestamp")?,
        open: required_column(headers, &["open", "o"], "open")?,
        high: required_column(headers, &["high", "h"], "high")?,
        low: required_column(headers, &["low", "l"], "low")?,
        close: required_column(headers, &["close", "c"], "close")?,
        volume: find_column(headers, &["volume", "vol", "v"]),
    })
}

fn required_column(
    headers: &csv::StringRecord,
    names: &[&str],
    label: &str,
) -> Result<usize, DataError> {
    find_column(headers, names)
        .ok_or_else(|| DataError::ParseError(format!("No {} column found", label)))
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| names.contains(&header.trim().to_lowercase().as_str()))
}

fn parse_decimal(s: &str, field: &str) -> Result<Decimal, DataError> {
    Decimal::from_str(s.trim())
        .or_else(|_| Decimal::from_scientific(s.trim()))
        .map_err(|e| DataError::ParseError(format!("Failed to parse {} '{}': {}", field, s, e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DataError> {
    let s = s.trim();

    // RFC 3339 / ISO 8601 with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Common formats without timezone, assumed UTC
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%Y%m%d %H:%M:%S",
    ];

    for fmt in &formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
    }

    // Unix timestamp (seconds)
    if let Ok(ts) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(ts, 0) {
            return Ok(dt);
        }
    }

    Err(DataError::ParseError(format!(
        "Unable to parse timestamp: '{}'",
        s
    )))
}
