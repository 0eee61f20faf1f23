use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::ComplianceBands;
use crate::model::{
    ComplianceStatus, MismatchDetail, MismatchReport, MismatchSummary, ReconRow, ReconStatus,
    ReconSummary, ScoredPair, UnmatchedExtracted, UnmatchedReference,
};

/// `numerator / denominator` as a percentage, 0 for an empty denominator.
pub fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64 * 100.0
}

/// Coarse label from match rate and the share of matched pairs with issues.
pub fn compliance_status(
    total: usize,
    matched: usize,
    mismatches: usize,
    bands: &ComplianceBands,
) -> ComplianceStatus {
    if total == 0 {
        return ComplianceStatus::NoData;
    }
    let match_rate = rate(matched, total);
    let mismatch_rate = rate(mismatches, matched);

    if match_rate == 100.0 && mismatch_rate == 0.0 {
        ComplianceStatus::Compliant
    } else if match_rate >= bands.minor_match_rate {
        ComplianceStatus::MinorDiscrepancies
    } else if match_rate >= bands.major_match_rate {
        ComplianceStatus::MajorDiscrepancies
    } else {
        ComplianceStatus::NonCompliant
    }
}

/// Reduce classified deterministic rows to headline counts.
pub fn compute_recon_summary(
    books_results: &[ReconRow],
    unmatched_reference: &[ReconRow],
    total_reference: usize,
    bands: &ComplianceBands,
) -> ReconSummary {
    let mut counts: BTreeMap<ReconStatus, usize> =
        ReconStatus::ALL.iter().map(|s| (*s, 0)).collect();
    let mut date_notes = 0;

    for row in books_results.iter().chain(unmatched_reference) {
        *counts.entry(row.status).or_insert(0) += 1;
        if row.differences.date.is_some() {
            date_notes += 1;
        }
    }

    let count = |status: ReconStatus| counts.get(&status).copied().unwrap_or(0);
    let total_books = books_results.len();
    let matched = count(ReconStatus::Matched);
    let value_mismatches = count(ReconStatus::ValueMismatch);
    let tax_structure_mismatches = count(ReconStatus::TaxStructureMismatch);

    ReconSummary {
        total_books,
        total_reference,
        matched,
        value_mismatches,
        tax_structure_mismatches,
        missing_in_reference: count(ReconStatus::MissingInReference),
        missing_in_books: count(ReconStatus::MissingInBooks),
        invalid_data: count(ReconStatus::InvalidData),
        date_notes,
        reconciliation_rate: rate(matched, total_books),
        status_counts: counts.iter().map(|(s, n)| (s.to_string(), *n)).collect(),
        compliance: compliance_status(
            total_books,
            matched,
            value_mismatches + tax_structure_mismatches,
            bands,
        ),
    }
}

pub fn compute_mismatch_summary(
    total_extracted: usize,
    total_reference: usize,
    matched_pairs: &[ScoredPair],
    unmatched_extracted: &[UnmatchedExtracted],
    unmatched_reference: &[UnmatchedReference],
    mismatches: &[MismatchDetail],
    bands: &ComplianceBands,
) -> MismatchSummary {
    let matched = matched_pairs.len();
    MismatchSummary {
        total_extracted,
        total_reference,
        matched,
        unmatched_extracted: unmatched_extracted.len(),
        unmatched_reference: unmatched_reference.len(),
        mismatch_count: mismatches.len(),
        match_rate: rate(matched, total_extracted),
        compliance: compliance_status(total_extracted, matched, mismatches.len(), bands),
    }
}

// ---------------------------------------------------------------------------
// Report card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReportCardSummary {
    pub total_invoices_extracted: usize,
    pub total_invoices_reference: usize,
    pub successfully_matched: usize,
    pub discrepancies_found: usize,
    pub missing_from_reference: usize,
    pub extra_in_reference: usize,
    pub compliance_status: ComplianceStatus,
}

/// Reviewer-facing digest of a [`MismatchReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ReportCard {
    pub title: String,
    pub generated_at: String,
    pub summary: ReportCardSummary,
    pub mismatches: Vec<MismatchDetail>,
    pub unmatched_extracted: Vec<UnmatchedExtracted>,
    pub unmatched_reference: Vec<UnmatchedReference>,
}

impl ReportCard {
    pub const TITLE: &'static str = "GST Document Mismatch Report";

    pub fn from_report(report: &MismatchReport) -> Self {
        let s = &report.summary;
        Self {
            title: Self::TITLE.to_string(),
            generated_at: report.meta.generated_at.clone(),
            summary: ReportCardSummary {
                total_invoices_extracted: s.total_extracted,
                total_invoices_reference: s.total_reference,
                successfully_matched: s.matched,
                discrepancies_found: s.mismatch_count,
                missing_from_reference: s.unmatched_extracted,
                extra_in_reference: s.unmatched_reference,
                compliance_status: s.compliance,
            },
            mismatches: report.mismatches.clone(),
            unmatched_extracted: report.unmatched_extracted.clone(),
            unmatched_reference: report.unmatched_reference.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDifferences;

    fn row(status: ReconStatus) -> ReconRow {
        ReconRow {
            status,
            probable_reason: status.probable_reason(),
            action_required: status.action_required(),
            books_index: None,
            reference_index: None,
            books_invoice_number: None,
            reference_invoice_number: None,
            supplier_id: None,
            differences: FieldDifferences::default(),
            books: None,
            reference: None,
        }
    }

    #[test]
    fn summary_counts() {
        let books = vec![
            row(ReconStatus::Matched),
            row(ReconStatus::Matched),
            row(ReconStatus::ValueMismatch),
            row(ReconStatus::TaxStructureMismatch),
            row(ReconStatus::MissingInReference),
            row(ReconStatus::InvalidData),
        ];
        let unmatched = vec![row(ReconStatus::MissingInBooks)];
        let summary = compute_recon_summary(&books, &unmatched, 5, &ComplianceBands::default());
        assert_eq!(summary.total_books, 6);
        assert_eq!(summary.total_reference, 5);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.value_mismatches, 1);
        assert_eq!(summary.tax_structure_mismatches, 1);
        assert_eq!(summary.missing_in_reference, 1);
        assert_eq!(summary.missing_in_books, 1);
        assert_eq!(summary.invalid_data, 1);
        assert!((summary.reconciliation_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.status_counts["matched"], 2);
        assert_eq!(summary.status_counts["missing_in_books"], 1);
        assert_eq!(summary.status_counts.len(), ReconStatus::ALL.len());
        assert_eq!(summary.compliance, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn empty_books_rate_is_zero() {
        let unmatched = vec![row(ReconStatus::MissingInBooks)];
        let summary = compute_recon_summary(&[], &unmatched, 1, &ComplianceBands::default());
        assert_eq!(summary.reconciliation_rate, 0.0);
        assert_eq!(summary.compliance, ComplianceStatus::NoData);
        assert_eq!(summary.status_counts["matched"], 0);
    }

    #[test]
    fn compliance_bands() {
        let bands = ComplianceBands::default();
        assert_eq!(compliance_status(0, 0, 0, &bands), ComplianceStatus::NoData);
        assert_eq!(compliance_status(10, 10, 0, &bands), ComplianceStatus::Compliant);
        assert_eq!(compliance_status(10, 10, 1, &bands), ComplianceStatus::MinorDiscrepancies);
        assert_eq!(compliance_status(20, 19, 0, &bands), ComplianceStatus::MinorDiscrepancies);
        assert_eq!(compliance_status(10, 9, 0, &bands), ComplianceStatus::MajorDiscrepancies);
        assert_eq!(compliance_status(10, 8, 0, &bands), ComplianceStatus::MajorDiscrepancies);
        assert_eq!(compliance_status(10, 7, 0, &bands), ComplianceStatus::NonCompliant);
        assert_eq!(compliance_status(10, 0, 0, &bands), ComplianceStatus::NonCompliant);
    }

    #[test]
    fn custom_bands() {
        let bands = ComplianceBands {
            minor_match_rate: 90.0,
            major_match_rate: 50.0,
        };
        assert_eq!(compliance_status(10, 9, 0, &bands), ComplianceStatus::MinorDiscrepancies);
        assert_eq!(compliance_status(10, 5, 0, &bands), ComplianceStatus::MajorDiscrepancies);
    }
}
