//! `itcmatch reconcile | detect | validate`.

use std::path::{Path, PathBuf};

use itcmatch_recon::{
    detect_mismatches_with, load_records, reconcile_with, FinancialRecord, ReconConfig,
    ReconStatus, ReportCard,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::exit_codes::{EXIT_DISCREPANCIES, EXIT_ERROR, EXIT_INPUT};
use crate::CliError;

/// Shared arguments of the two matching commands. `left` is the books side
/// for `reconcile` and the extracted side for `detect`.
pub struct RunArgs {
    pub left: PathBuf,
    pub reference: PathBuf,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub strict: bool,
}

pub fn cmd_reconcile(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let books = load_side("books", &args.left)?;
    let reference = load_side("reference", &args.reference)?;

    let report = reconcile_with(&config, &books, &reference);
    emit(&report, args.json, args.output.as_deref())?;

    let s = &report.summary;
    eprintln!(
        "reconcile: {} books vs {} reference, {} matched, {} value mismatches, \
         {} tax structure mismatches, {} missing in GSTR-2B, {} missing in books, \
         {} invalid ({:.1}% reconciled, {})",
        s.total_books,
        s.total_reference,
        s.matched,
        s.value_mismatches,
        s.tax_structure_mismatches,
        s.missing_in_reference,
        s.missing_in_books,
        s.invalid_data,
        s.reconciliation_rate,
        s.compliance,
    );
    for status in ReconStatus::ALL {
        let n = s.status_counts.get(&status.to_string()).copied().unwrap_or(0);
        info!("{}: {n}", status.label());
    }

    let clean = report
        .rows()
        .all(|row| row.status == ReconStatus::Matched);
    if args.strict && !clean {
        return Err(CliError::new(EXIT_DISCREPANCIES, "discrepancies found")
            .with_hint("rerun with --json to see per-record actions"));
    }
    Ok(())
}

pub fn cmd_detect(args: RunArgs, report_card: bool) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let extracted = load_side("extracted", &args.left)?;
    let reference = load_side("reference", &args.reference)?;

    let report = detect_mismatches_with(&config, &extracted, &reference);
    if report_card {
        emit(&ReportCard::from_report(&report), args.json, args.output.as_deref())?;
    } else {
        emit(&report, args.json, args.output.as_deref())?;
    }

    let s = &report.summary;
    eprintln!(
        "detect: {} extracted vs {} reference, {} matched ({} with notes), \
         {} unmatched extracted, {} unmatched reference ({:.1}% matched, {})",
        s.total_extracted,
        s.total_reference,
        s.matched,
        s.mismatch_count,
        s.unmatched_extracted,
        s.unmatched_reference,
        s.match_rate,
        s.compliance,
    );

    let clean = s.mismatch_count == 0 && s.unmatched_extracted == 0 && s.unmatched_reference == 0;
    if args.strict && !clean {
        return Err(CliError::new(EXIT_DISCREPANCIES, "discrepancies found")
            .with_hint("rerun with --report-card --json to list them"));
    }
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(config_path.as_path()))?;
    let w = &config.approximate.weights;
    eprintln!(
        "{}: valid (tolerance {}%/{}%, date window {} days, accept >= {}, weights {}/{}/{}/{})",
        config_path.display(),
        config.tolerance.value_pct,
        config.tolerance.tax_pct,
        config.tolerance.date_window_days,
        config.approximate.accept_threshold,
        w.invoice_number,
        w.date,
        w.supplier_id,
        w.amount,
    );
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        debug!("no config given, using defaults");
        return Ok(ReconConfig::default());
    };
    let input = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_INPUT, format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = ReconConfig::from_toml(&input)
        .map_err(|e| CliError::from(e).with_hint(format!("check {}", path.display())))?;
    info!("loaded config {}", path.display());
    Ok(config)
}

fn load_side(side: &str, path: &Path) -> Result<Vec<FinancialRecord>, CliError> {
    let records = load_records(path).map_err(|e| {
        CliError::from(e).with_hint(format!(
            "{side} input must be a JSON array, {{\"invoices\": [...]}}, \
             {{\"data\": {{\"invoices\": [...]}}}}, or a headered CSV"
        ))
    })?;
    info!("loaded {} {side} records from {}", records.len(), path.display());
    Ok(records)
}

/// Serialize once; print and/or write as requested.
fn emit<T: Serialize>(value: &T, json: bool, output: Option<&Path>) -> Result<(), CliError> {
    if !json && output.is_none() {
        return Ok(());
    }
    let json_str = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(path) = output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if json {
        println!("{json_str}");
    }
    Ok(())
}
