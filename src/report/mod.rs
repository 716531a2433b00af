//! Reporting utilities: formatted terminal output for every stage.
//!
//! We keep formatting code in one place so:
//! - the assembly/analysis code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use std::path::Path;

use crate::analysis::scatter::{ResidualKind, ScatterStats};
use crate::analysis::verify::VerifyReport;
use crate::assemble::btfr::BtfrOutput;
use crate::assemble::rar::RarOutput;
use crate::domain::{Regime, RelationConfig, StageSummary};

const RULE: &str = "------------------------------------------------------------";

/// Format the BTFR assembly summary (completeness vs the full fleet).
pub fn format_btfr_summary(output: &BtfrOutput, out_path: &Path) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("BTFR table written to {}\n", out_path.display()));
    out.push_str(&format!(
        "Galaxies successfully processed: {} / {}\n",
        output.summary.processed, output.summary.total
    ));
    out.push_str(&format_skips(&output.summary));
    out.push_str(RULE);
    out
}

/// Format the mass-attach summary (joined rows vs BTFR input rows).
pub fn format_mass_summary(joined: usize, input_rows: usize, out_path: &Path) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "BTFR table with baryonic mass written to {}\n",
        out_path.display()
    ));
    out.push_str(&format!("Galaxies included: {joined} / {input_rows}\n"));
    out.push_str(RULE);
    out
}

/// Format the RAR assembly summary.
pub fn format_rar_summary(output: &RarOutput, out_path: &Path) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str("RAR assembly complete (with radial fraction)\n");
    out.push_str(&format!("Output file: {}\n", out_path.display()));
    out.push_str(&format!("Total points: {}\n", output.points.len()));
    out.push_str(&format!(
        "Artifacts processed: {} / {}\n",
        output.summary.processed, output.summary.total
    ));
    out.push_str(&format_skips(&output.summary));
    out.push_str(RULE);
    out
}

/// Format the overall scatter diagnostic.
pub fn format_scatter(kind: ResidualKind, stats: Option<&ScatterStats>) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    let title = match kind {
        ResidualKind::Empirical => "RAR Scatter Diagnostic (vs empirical curve)",
        ResidualKind::Raw => "RAR Scatter Diagnostic (vs g_bar)",
    };
    out.push_str(title);
    out.push('\n');
    match stats {
        Some(stats) => {
            out.push_str(&format!("Total points analysed : {}\n", stats.n));
            out.push_str(&format!("RMS scatter (dex)     : {:.3}\n", stats.rms));
            out.push_str(&format!("Median |d| (dex)      : {:.3}\n", stats.median_abs));
        }
        None => out.push_str("No positive-acceleration points to analyse.\n"),
    }
    out.push_str(RULE);
    out
}

/// Format the per-regime scatter table. Empty regimes never reach this
/// function; the analysis already omits them.
pub fn format_regimes(
    entries: &[(Regime, ScatterStats)],
    config: &RelationConfig,
) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str("RAR Scatter by Radial Regime\n");
    out.push_str(RULE);
    out.push('\n');
    for (regime, stats) in entries {
        out.push_str(&format!(
            "{:<18} | N = {:>5} | RMS = {:.3} dex | Median = {:.3} dex\n",
            regime.label(config),
            stats.n,
            stats.rms,
            stats.median_abs
        ));
    }
    out.push_str(RULE);
    out
}

/// Format the single-galaxy verification report.
pub fn format_verify(report: &VerifyReport, rows: usize) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("RAR Single-Galaxy Verification: {}\n", report.galaxy));
    out.push_str(RULE);
    out.push('\n');

    out.push_str("\nFirst rows from the assembled RAR table:\n");
    for p in report.assembled.iter().take(rows) {
        out.push_str(&format!(
            "g_bar={:>14.6} | g_obs={:>14.6} | r_frac={:.4}\n",
            p.g_bar, p.g_obs, p.r_frac
        ));
    }

    out.push_str("\nRecomputed from the rotation-curve artifact:\n");
    for r in report.recomputed.iter().take(rows) {
        out.push_str(&format!(
            "R={:>7.3} kpc | g_bar={:>14.6} | g_obs={:>14.6}\n",
            r.radius_kpc, r.g_bar, r.g_obs
        ));
    }

    out.push_str("\nConsistency check (absolute differences):\n");
    out.push_str(&format!("rows compared  = {}\n", report.compared));
    out.push_str(&format!("max |d g_bar|  = {:.6e}\n", report.max_delta_g_bar));
    out.push_str(&format!("max |d g_obs|  = {:.6e}\n", report.max_delta_g_obs));

    if report.passed {
        out.push_str(&format!(
            "\nSTATUS: PASS (agreement within {:.0e})\n",
            report.tolerance
        ));
    } else {
        out.push_str("\nSTATUS: FAIL (differences detected, inspect values)\n");
    }
    out.push_str(RULE);
    out
}

fn format_skips(summary: &StageSummary) -> String {
    let mut out = String::new();
    for (name, reason) in &summary.skipped {
        out.push_str(&format!("  (skipped {name}) {reason}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SkipReason;

    #[test]
    fn btfr_summary_reports_fleet_denominator() {
        let output = BtfrOutput {
            records: vec![],
            summary: StageSummary {
                processed: 3,
                total: 5,
                skipped: vec![
                    ("G4".to_string(), SkipReason::MissingCurve),
                    ("G5".to_string(), SkipReason::TooFewSamples(2)),
                ],
            },
        };
        let text = format_btfr_summary(&output, Path::new("btfr_table.csv"));
        assert!(text.contains("3 / 5"));
        assert!(text.contains("(skipped G4) no rotation-curve artifact"));
        assert!(text.contains("(skipped G5) only 2 samples"));
    }

    #[test]
    fn scatter_report_handles_empty_input() {
        let text = format_scatter(ResidualKind::Empirical, None);
        assert!(text.contains("No positive-acceleration points"));
    }
}
