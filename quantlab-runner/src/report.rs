//! Reporting and export — JSON, CSV, and plain-text artifact generation.
//!
//! Three export surfaces for backtest results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: the trade tape for external analysis tools
//! - **Text**: a human-readable comparison report across strategies
//!
//! All persisted JSON carries a `schema_version` field. Unknown versions
//! are rejected on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use quantlab_core::domain::TradeResult;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade ledger as CSV.
///
/// Columns: entry_time, exit_time, entry_price, exit_price, quantity,
/// pnl_usd, pnl_percent, exit_reason, duration_minutes
pub fn export_trades_csv(trades: &[TradeResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "entry_time",
        "exit_time",
        "entry_price",
        "exit_price",
        "quantity",
        "pnl_usd",
        "pnl_percent",
        "exit_reason",
        "duration_minutes",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.entry_time.to_rfc3339(),
            &t.exit_time.to_rfc3339(),
            &format!("{:.6}", t.entry_price),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.quantity),
            &format!("{:.2}", t.pnl_usd),
            &format!("{:.4}", t.pnl_percent),
            &t.exit_reason.as_str().to_string(),
            &t.duration_minutes.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Text report ────────────────────────────────────────────────────

/// Render a plain-text comparison report over a batch of results.
///
/// One block per strategy, in name order: run summary, then risk
/// metrics, then trade analysis. Warnings are appended when present.
pub fn format_report(results: &BTreeMap<String, BacktestResult>) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str(&format!("{}\n", "=".repeat(64)));
    out.push_str("BACKTEST REPORT\n");
    out.push_str(&format!("{}\n", "=".repeat(64)));

    for (name, result) in results {
        let m = &result.metrics;

        out.push('\n');
        out.push_str(&format!("Strategy: {name}\n"));
        out.push_str(&format!("{}\n", "-".repeat(64)));
        out.push_str(&format!(
            "  Regime: {}  Timeframe: {}\n",
            result.regime, result.timeframe
        ));
        if let (Some(start), Some(end)) = (result.start_date, result.end_date) {
            out.push_str(&format!(
                "  Period: {} to {}\n",
                start.to_rfc3339(),
                end.to_rfc3339()
            ));
        }

        out.push('\n');
        out.push_str("  Summary\n");
        out.push_str(&format!(
            "    Initial capital:   ${:>12.2}\n",
            result.initial_capital
        ));
        out.push_str(&format!(
            "    Final value:       ${:>12.2}\n",
            result.final_portfolio_value
        ));
        out.push_str(&format!("    Total P&L:         ${:>12.2}\n", m.total_pnl_usd));
        out.push_str(&format!(
            "    Total return:      {:>12.2}%\n",
            m.total_pnl_percent
        ));

        out.push('\n');
        out.push_str("  Risk\n");
        out.push_str(&format!("    Sharpe ratio:      {:>12.3}\n", m.sharpe_ratio));
        out.push_str(&format!(
            "    Max drawdown:      ${:>12.2}\n",
            m.max_drawdown_usd
        ));
        out.push_str(&format!(
            "    Max drawdown:      {:>12.2}%\n",
            m.max_drawdown_percent
        ));
        out.push_str(&format!("    Profit factor:     {:>12.2}\n", m.profit_factor));

        out.push('\n');
        out.push_str("  Trades\n");
        out.push_str(&format!("    Total:             {:>12}\n", m.total_trades));
        out.push_str(&format!(
            "    Winners / losers:  {:>5} / {:<5}\n",
            m.winning_trades, m.losing_trades
        ));
        out.push_str(&format!("    Win rate:          {:>12.1}%\n", m.win_rate));
        out.push_str(&format!("    Avg P&L:           ${:>12.2}\n", m.avg_pnl_usd));
        out.push_str(&format!("    Best trade:        ${:>12.2}\n", m.best_trade_usd));
        out.push_str(&format!(
            "    Worst trade:       ${:>12.2}\n",
            m.worst_trade_usd
        ));
        out.push_str(&format!(
            "    Avg duration:      {:>10.1} min\n",
            m.avg_duration_minutes
        ));

        if !result.warnings.is_empty() {
            out.push('\n');
            out.push_str("  Warnings\n");
            for warning in &result.warnings {
                out.push_str(&format!("    - {warning}\n"));
            }
        }
    }

    out
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a batch of backtest runs.
///
/// Creates `output_dir` if needed and writes:
/// - `{strategy}.json` — one full `BacktestResult` per strategy
/// - `{strategy}_trades.csv` — that strategy's trade tape
/// - `report.txt` — the combined text report
///
/// Returns the paths of every file written.
pub fn save_artifacts(
    results: &BTreeMap<String, BacktestResult>,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create artifact dir: {}", output_dir.display()))?;

    let mut written = Vec::new();

    for (name, result) in results {
        let json_path = output_dir.join(format!("{name}.json"));
        std::fs::write(&json_path, export_json(result)?)?;
        written.push(json_path);

        let csv_path = output_dir.join(format!("{name}_trades.csv"));
        std::fs::write(&csv_path, export_trades_csv(&result.trades)?)?;
        written.push(csv_path);
    }

    let report_path = output_dir.join("report.txt");
    std::fs::write(&report_path, format_report(results))?;
    written.push(report_path);

    Ok(written)
}

/// Load a `BacktestResult` back from a saved JSON artifact.
///
/// Rejects unknown schema versions.
pub fn load_artifact(path: &Path) -> Result<BacktestResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
