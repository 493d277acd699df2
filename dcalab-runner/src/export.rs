//! Artifact export: JSON report plus CSV ledgers.
//!
//! - **JSON**: the full `AnalysisReport`, with schema versioning
//! - **CSV**: position ledger, daily portfolio snapshots, optimizer table
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use dcalab_core::domain::{PortfolioSnapshot, Position};

use crate::optimizer::OptimizationResult;
use crate::runner::{AnalysisReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Export the position ledger. Open lots leave the sell columns empty.
///
/// Columns: buy_date, buy_type, buy_level, buy_price, shares, amount_invested,
/// sell_date, sell_price, sell_level, realized_pl, roi_pct, hold_days
pub fn export_positions_csv(positions: &[Position]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "buy_date",
        "buy_type",
        "buy_level",
        "buy_price",
        "shares",
        "amount_invested",
        "sell_date",
        "sell_price",
        "sell_level",
        "realized_pl",
        "roi_pct",
        "hold_days",
    ])?;

    for p in positions {
        let buy_type = match p.buy_type {
            dcalab_core::domain::BuyType::Daily => "daily",
            dcalab_core::domain::BuyType::ZoneMultiplier => "zone_5x",
        };
        wtr.write_record([
            p.buy_date.to_string(),
            buy_type.to_string(),
            p.buy_level.to_string(),
            format!("{:.4}", p.buy_price),
            format!("{:.6}", p.shares),
            format!("{:.2}", p.amount_invested),
            opt(p.sell_date),
            opt(p.sell_price.map(|v| format!("{v:.4}"))),
            opt(p.sell_level),
            opt(p.realized_pl.map(|v| format!("{v:.2}"))),
            opt(p.roi.map(|v| format!("{:.2}", v * 100.0))),
            opt(p.hold_days),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export daily portfolio snapshots.
pub fn export_portfolio_csv(snapshots: &[PortfolioSnapshot]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "close",
        "cumulative_invested",
        "portfolio_value",
        "shares_held",
        "realized_cash",
    ])?;
    for s in snapshots {
        wtr.write_record([
            s.date.to_string(),
            format!("{:.4}", s.close),
            format!("{:.2}", s.cumulative_invested),
            format!("{:.2}", s.portfolio_value),
            format!("{:.6}", s.shares_held),
            format!("{:.2}", s.realized_cash),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the optimizer's per-degree table, successful candidates only.
pub fn export_optimization_csv(result: &OptimizationResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "degree",
        "effective_degree",
        "roi_pct",
        "total_return",
        "total_invested",
        "daily_buys",
        "zone_buys",
        "sells",
        "optimal",
    ])?;
    for r in &result.all_results {
        wtr.write_record([
            r.degree.to_string(),
            r.effective_degree.to_string(),
            format!("{:.4}", r.roi_percentage),
            format!("{:.2}", r.total_return),
            format!("{:.2}", r.total_invested),
            r.daily_buy_count.to_string(),
            r.zone_buy_count.to_string(),
            r.sell_count.to_string(),
            (r.degree == result.optimal_degree && !result.is_exhausted()).to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one analysis.
///
/// Creates `{symbol}_{timestamp}/` under `output_dir` containing:
/// - `report.json`: the full `AnalysisReport`
/// - `positions.csv`: simulated lots
/// - `portfolio.csv`: daily portfolio snapshots
/// - `optimization.csv`: per-degree results, when the optimizer ran
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.symbol,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(
        run_dir.join("positions.csv"),
        export_positions_csv(&report.simulation.positions)?,
    )?;
    std::fs::write(
        run_dir.join("portfolio.csv"),
        export_portfolio_csv(&report.simulation.snapshots)?,
    )?;
    if let Some(optimization) = &report.optimization {
        std::fs::write(
            run_dir.join("optimization.csv"),
            export_optimization_csv(optimization)?,
        )?;
    }

    Ok(run_dir)
}
