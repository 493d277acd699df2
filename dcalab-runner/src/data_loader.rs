//! Price series loading for the runner.
//!
//! Resolves a data source from `LoadOptions`:
//! 1. If a CSV path is given → import it (a directory holds `{SYMBOL}.csv` files)
//! 2. If `synthetic` is set → generate a deterministic synthetic series (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Market data download is out of scope; CSV exports from any vendor with
//! Date/Open/High/Low/Close/Volume columns work.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use dcalab_core::data::{DataError, DataSource, DateRange, PriceDataProvider};
use dcalab_core::domain::{PriceBar, PriceSeries};
use dcalab_core::fingerprint::SeriesFingerprint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data source for '{symbol}' (pass a CSV file or use --synthetic)")]
    NoSource { symbol: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Options controlling how a series is loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub range: DateRange,
    /// CSV file, or directory of `{SYMBOL}.csv` files.
    pub csv: Option<PathBuf>,
    /// Generate synthetic bars when no CSV is given.
    pub synthetic: bool,
}

/// A validated series plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: PriceSeries,
    pub source: DataSource,
    pub fingerprint: SeriesFingerprint,
}

impl LoadedSeries {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Load at least 30 rows for `symbol` from the source selected by `opts`.
pub fn load_series(symbol: &str, opts: &LoadOptions) -> Result<LoadedSeries, LoadError> {
    let provider: Box<dyn PriceDataProvider> = match (&opts.csv, opts.synthetic) {
        (Some(path), _) => Box::new(CsvProvider::new(path)),
        (None, true) => {
            warn!(symbol, "generating synthetic data; results are tagged as synthetic");
            Box::new(SyntheticProvider::default())
        }
        (None, false) => {
            return Err(LoadError::NoSource {
                symbol: symbol.to_string(),
            })
        }
    };
    load_from(provider.as_ref(), symbol, opts.range)
}

/// Load through an explicit provider.
pub fn load_from(
    provider: &dyn PriceDataProvider,
    symbol: &str,
    range: DateRange,
) -> Result<LoadedSeries, LoadError> {
    let series = provider.fetch_for_analysis(symbol, range)?;
    let fingerprint = SeriesFingerprint::of(&series);
    debug!(
        symbol,
        provider = provider.name(),
        rows = series.len(),
        fingerprint = fingerprint.short(),
        "series loaded"
    );
    Ok(LoadedSeries {
        series,
        source: provider.source(),
        fingerprint,
    })
}

// ─── CSV import ─────────────────────────────────────────────────────

/// One CSV row. Vendor exports use `null` or blanks for missing values.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "date", alias = "DATE", alias = "Datetime")]
    #[serde(rename = "Date")]
    date: String,
    #[serde(alias = "open", rename = "Open", default, deserialize_with = "lenient_f64")]
    open: Option<f64>,
    #[serde(alias = "high", rename = "High", default, deserialize_with = "lenient_f64")]
    high: Option<f64>,
    #[serde(alias = "low", rename = "Low", default, deserialize_with = "lenient_f64")]
    low: Option<f64>,
    #[serde(alias = "close", rename = "Close", default, deserialize_with = "lenient_f64")]
    close: Option<f64>,
    #[serde(alias = "volume", rename = "Volume", default, deserialize_with = "lenient_f64")]
    volume: Option<f64>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<f64>().ok()))
}

/// Parses `YYYY-MM-DD`, tolerating a trailing time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Reads daily bars from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn file_for(&self, symbol: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.csv", symbol.to_uppercase()))
        } else {
            self.path.clone()
        }
    }
}

impl PriceDataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch(&self, symbol: &str, range: DateRange) -> Result<PriceSeries, DataError> {
        let path = self.file_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| DataError::Io(format!("{}: {e}", path.display())))?;

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| DataError::Parse {
                row: i + 1,
                message: e.to_string(),
            })?;
            let date = parse_date(&row.date).ok_or_else(|| DataError::Parse {
                row: i + 1,
                message: format!("unrecognized date '{}'", row.date),
            })?;
            if !range.contains(date) {
                continue;
            }
            match (row.open, row.high, row.low, row.close) {
                (Some(open), Some(high), Some(low), Some(close)) => bars.push(PriceBar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume: row.volume.unwrap_or(0.0).max(0.0) as u64,
                }),
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(symbol, skipped, "dropped CSV rows with missing prices");
        }

        bars.sort_by_key(|b| b.date);
        Ok(PriceSeries::new(symbol.to_uppercase(), bars)?)
    }
}

// ─── Synthetic ──────────────────────────────────────────────────────

pub const SYNTHETIC_START: (i32, u32, u32) = (2020, 1, 2);
pub const SYNTHETIC_END: (i32, u32, u32) = (2024, 12, 31);

/// Deterministic synthetic bars: an uptrend with a slow oscillation and noise.
///
/// Seeded from the BLAKE3 hash of the symbol, so the same symbol always
/// produces the same series. Weekends are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticProvider;

impl PriceDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, symbol: &str, range: DateRange) -> Result<PriceSeries, DataError> {
        let (y, m, d) = SYNTHETIC_START;
        let default_start = NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| DataError::Other("invalid synthetic start date".into()))?;
        let (y, m, d) = SYNTHETIC_END;
        let default_end = NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| DataError::Other("invalid synthetic end date".into()))?;

        let start = range.start.unwrap_or(default_start);
        let end = range.end.unwrap_or(default_end);
        Ok(PriceSeries::new(symbol, generate_synthetic_bars(symbol, start, end))?)
    }
}

fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let base = rng.gen_range(20.0..300.0_f64);
    let drift = rng.gen_range(0.0002..0.0008_f64);
    let amplitude = rng.gen_range(0.05..0.15_f64);
    let period = rng.gen_range(40.0..120.0_f64);

    let mut bars = Vec::new();
    let mut prev_close = base;
    let mut current = start;
    let mut t = 0.0_f64;

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let trend = base * (1.0 + drift * t);
        let cycle = 1.0 + amplitude * (2.0 * PI * t / period).sin();
        let noise = 1.0 + rng.gen_range(-0.01..0.01);
        let close = (trend * cycle * noise).max(1.0);
        let open = prev_close;
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(PriceBar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        prev_close = close;
        t += 1.0;
        current += chrono::Duration::days(1);
    }

    bars
}
