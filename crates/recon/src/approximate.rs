//! Score-weighted greedy matching for soft mismatch reporting.
//!
//! Each extracted record, in input order, claims the highest-scoring
//! unclaimed reference record if that score clears the acceptance threshold.
//! Earlier records win contested candidates; the assignment is not globally
//! optimal.

use log::{debug, info};
use rayon::prelude::*;

use crate::config::{ApproximateConfig, DateEquality, ReconConfig};
use crate::model::{
    FinancialRecord, MismatchDetail, MismatchNote, MismatchReport, ReportMeta, ScoreBreakdown,
    ScoredField, ScoredPair, UnmatchedExtracted, UnmatchedReason, UnmatchedReference,
};
use crate::normalize::{normalize_string, parse_date};
use crate::similarity::similarity_ratio;
use crate::summary::compute_mismatch_summary;
use crate::tolerance::amount_score;

/// Reference lists at least this long are scored in parallel.
pub const PARALLEL_SCAN_MIN: usize = 256;

/// Detect mismatches with the default scoring config.
pub fn detect_mismatches(
    extracted: &[FinancialRecord],
    reference: &[FinancialRecord],
) -> MismatchReport {
    detect_mismatches_with(&ReconConfig::default(), extracted, reference)
}

pub fn detect_mismatches_with(
    config: &ReconConfig,
    extracted: &[FinancialRecord],
    reference: &[FinancialRecord],
) -> MismatchReport {
    let approx = &config.approximate;
    let mut claimed = vec![false; reference.len()];
    let mut matched_pairs = Vec::new();
    let mut unmatched_extracted = Vec::new();
    let mut mismatches = Vec::new();

    for (ei, record) in extracted.iter().enumerate() {
        if record.is_extraction_error() {
            debug!("extracted[{ei}] skipped: extraction failed");
            unmatched_extracted.push(UnmatchedExtracted {
                index: ei,
                record: record.clone(),
                reason: UnmatchedReason::ExtractionFailed,
            });
            continue;
        }

        let best = best_candidate(record, reference, &claimed, approx)
            .filter(|(_, score)| score.total >= approx.accept_threshold);

        let Some((ri, score)) = best else {
            debug!("extracted[{ei}] {} has no candidate above threshold", record.invoice_number);
            unmatched_extracted.push(UnmatchedExtracted {
                index: ei,
                record: record.clone(),
                reason: UnmatchedReason::NoReferenceMatch,
            });
            continue;
        };

        claimed[ri] = true;
        let counterpart = &reference[ri];
        let notes = score_notes(record, counterpart, &score, approx);
        debug!(
            "extracted[{ei}] {} ↔ reference[{ri}] score {:.3} ({} notes)",
            record.invoice_number,
            score.total,
            notes.len()
        );

        if !notes.is_empty() {
            mismatches.push(MismatchDetail {
                invoice_number: if record.invoice_number.trim().is_empty() {
                    "UNKNOWN".to_string()
                } else {
                    record.invoice_number.clone()
                },
                match_score: score.total,
                issues: notes.clone(),
            });
        }

        matched_pairs.push(ScoredPair {
            extracted_index: ei,
            reference_index: ri,
            extracted: record.clone(),
            reference: counterpart.clone(),
            score,
            notes,
        });
    }

    let unmatched_reference: Vec<UnmatchedReference> = reference
        .iter()
        .enumerate()
        .filter(|(ri, _)| !claimed[*ri])
        .map(|(ri, r)| UnmatchedReference {
            index: ri,
            record: r.clone(),
        })
        .collect();

    let summary = compute_mismatch_summary(
        extracted.len(),
        reference.len(),
        &matched_pairs,
        &unmatched_extracted,
        &unmatched_reference,
        &mismatches,
        &config.compliance,
    );
    info!(
        "scored {} extracted vs {} reference: {} matched ({} with notes), \
         {} unmatched extracted, {} unmatched reference",
        summary.total_extracted,
        summary.total_reference,
        summary.matched,
        summary.mismatch_count,
        summary.unmatched_extracted,
        summary.unmatched_reference,
    );

    MismatchReport {
        meta: ReportMeta::now(config.name.as_deref()),
        summary,
        matched_pairs,
        unmatched_extracted,
        unmatched_reference,
        mismatches,
    }
}

/// Weighted similarity of one extracted record against one reference record.
pub fn score_pair(
    extracted: &FinancialRecord,
    reference: &FinancialRecord,
    approx: &ApproximateConfig,
) -> ScoreBreakdown {
    let invoice_number = similarity_ratio(&extracted.invoice_number, &reference.invoice_number);
    let date = indicator(dates_equal(
        extracted.invoice_date.as_deref(),
        reference.invoice_date.as_deref(),
        approx.date_equality,
    ));
    let supplier_id = indicator(
        normalize_string(extracted.supplier_id.as_deref())
            == normalize_string(reference.supplier_id.as_deref()),
    );
    let amount = amount_score(
        extracted.total_amount.unwrap_or(0.0),
        reference.total_amount.unwrap_or(0.0),
        approx.zero_reference_amount_matches_zero,
    );

    let w = &approx.weights;
    ScoreBreakdown {
        invoice_number,
        date,
        supplier_id,
        amount,
        total: w.invoice_number * invoice_number
            + w.date * date
            + w.supplier_id * supplier_id
            + w.amount * amount,
    }
}

/// Highest-scoring unclaimed candidate with a positive score. Equal scores
/// keep the lowest reference index.
fn best_candidate(
    record: &FinancialRecord,
    reference: &[FinancialRecord],
    claimed: &[bool],
    approx: &ApproximateConfig,
) -> Option<(usize, ScoreBreakdown)> {
    if reference.len() >= PARALLEL_SCAN_MIN {
        return reference
            .par_iter()
            .enumerate()
            .filter(|(ri, _)| !claimed[*ri])
            .map(|(ri, candidate)| (ri, score_pair(record, candidate, approx)))
            .filter(|(_, score)| score.total > 0.0)
            .reduce_with(|a, b| {
                if b.1.total > a.1.total || (b.1.total == a.1.total && b.0 < a.0) {
                    b
                } else {
                    a
                }
            });
    }

    let mut best: Option<(usize, ScoreBreakdown)> = None;
    for (ri, candidate) in reference.iter().enumerate() {
        if claimed[ri] {
            continue;
        }
        let score = score_pair(record, candidate, approx);
        let best_total = best.map_or(0.0, |(_, s)| s.total);
        if score.total > best_total {
            best = Some((ri, score));
        }
    }
    best
}

fn dates_equal(a: Option<&str>, b: Option<&str>, mode: DateEquality) -> bool {
    if mode == DateEquality::Calendar {
        if let (Some(da), Some(db)) = (a.and_then(parse_date), b.and_then(parse_date)) {
            return da == db;
        }
    }
    normalize_string(a) == normalize_string(b)
}

fn indicator(equal: bool) -> f64 {
    if equal {
        1.0
    } else {
        0.0
    }
}

/// Notes for each component below its own bar. Informational only.
fn score_notes(
    extracted: &FinancialRecord,
    reference: &FinancialRecord,
    score: &ScoreBreakdown,
    approx: &ApproximateConfig,
) -> Vec<MismatchNote> {
    let text = |v: Option<&str>| v.unwrap_or("missing").to_string();
    let mut notes = Vec::new();

    if score.invoice_number < approx.invoice_similarity_bar {
        notes.push(note(
            ScoredField::InvoiceNumber,
            "Invoice number",
            extracted.invoice_number.clone(),
            reference.invoice_number.clone(),
        ));
    }
    if score.date < 1.0 {
        notes.push(note(
            ScoredField::Date,
            "Date",
            text(extracted.invoice_date.as_deref()),
            text(reference.invoice_date.as_deref()),
        ));
    }
    if score.supplier_id < 1.0 {
        notes.push(note(
            ScoredField::SupplierId,
            "GSTIN",
            text(extracted.supplier_id.as_deref()),
            text(reference.supplier_id.as_deref()),
        ));
    }
    if score.amount < approx.amount_score_bar {
        notes.push(note(
            ScoredField::Amount,
            "Amount",
            format!("{:.2}", extracted.total_amount.unwrap_or(0.0)),
            format!("{:.2}", reference.total_amount.unwrap_or(0.0)),
        ));
    }

    notes
}

fn note(field: ScoredField, label: &str, extracted: String, reference: String) -> MismatchNote {
    MismatchNote {
        field,
        message: format!("{label} mismatch: {extracted} vs {reference}"),
        extracted,
        reference,
    }
}
