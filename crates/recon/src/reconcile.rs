//! Deterministic reconciliation by exact (GSTIN, invoice number, document type).

use log::{debug, info};

use crate::classify::{analyze_pair, classify, field_differences};
use crate::config::ReconConfig;
use crate::model::{
    FieldDifferences, FinancialRecord, MatchKey, ReconRow, ReconStatus, ReconciliationReport,
    ReportMeta,
};
use crate::normalize::match_key;
use crate::summary::compute_recon_summary;

/// Reconcile with the default tolerances.
pub fn reconcile(books: &[FinancialRecord], reference: &[FinancialRecord]) -> ReconciliationReport {
    reconcile_with(&ReconConfig::default(), books, reference)
}

/// Reconcile books against the reference ledger.
///
/// Books are processed in input order; each claims the first unclaimed
/// reference record with an equal [`MatchKey`]. Reference records never
/// claimed are reported as missing in books, in reference order.
pub fn reconcile_with(
    config: &ReconConfig,
    books: &[FinancialRecord],
    reference: &[FinancialRecord],
) -> ReconciliationReport {
    let reference_keys: Vec<MatchKey> = reference.iter().map(match_key).collect();
    let mut claimed = vec![false; reference.len()];
    let mut books_results = Vec::with_capacity(books.len());

    for (bi, book) in books.iter().enumerate() {
        if book.is_extraction_error() || book.invoice_number.trim().is_empty() {
            debug!("books[{bi}] invalid: extraction error or blank invoice number");
            books_results.push(unpaired_row(ReconStatus::InvalidData, Some((bi, book)), None));
            continue;
        }

        let key = match_key(book);
        let found = reference_keys
            .iter()
            .enumerate()
            .find(|(ri, rk)| !claimed[*ri] && **rk == key)
            .map(|(ri, _)| ri);

        let Some(ri) = found else {
            debug!("books[{bi}] {} has no reference entry", book.invoice_number);
            books_results.push(unpaired_row(
                ReconStatus::MissingInReference,
                Some((bi, book)),
                None,
            ));
            continue;
        };

        claimed[ri] = true;
        let counterpart = &reference[ri];
        let analysis = analyze_pair(book, counterpart, &config.tolerance);
        let status = classify(&analysis);
        debug!("books[{bi}] {} ↔ reference[{ri}]: {status}", book.invoice_number);

        books_results.push(ReconRow {
            status,
            probable_reason: status.probable_reason(),
            action_required: status.action_required(),
            books_index: Some(bi),
            reference_index: Some(ri),
            books_invoice_number: Some(book.invoice_number.clone()),
            reference_invoice_number: Some(counterpart.invoice_number.clone()),
            supplier_id: book.supplier_id.clone().or_else(|| counterpart.supplier_id.clone()),
            differences: field_differences(&analysis, book, counterpart),
            books: Some(book.clone()),
            reference: Some(counterpart.clone()),
        });
    }

    let unmatched_reference: Vec<ReconRow> = reference
        .iter()
        .enumerate()
        .filter(|(ri, _)| !claimed[*ri])
        .map(|(ri, r)| unpaired_row(ReconStatus::MissingInBooks, None, Some((ri, r))))
        .collect();

    let summary = compute_recon_summary(
        &books_results,
        &unmatched_reference,
        reference.len(),
        &config.compliance,
    );
    info!(
        "reconciled {} books vs {} reference: {} matched, {} value, {} tax structure, \
         {} missing in reference, {} missing in books, {} invalid",
        summary.total_books,
        summary.total_reference,
        summary.matched,
        summary.value_mismatches,
        summary.tax_structure_mismatches,
        summary.missing_in_reference,
        summary.missing_in_books,
        summary.invalid_data,
    );

    ReconciliationReport {
        meta: ReportMeta::now(config.name.as_deref()),
        summary,
        books_results,
        unmatched_reference,
    }
}

/// Row for a record that has no counterpart.
fn unpaired_row(
    status: ReconStatus,
    books: Option<(usize, &FinancialRecord)>,
    reference: Option<(usize, &FinancialRecord)>,
) -> ReconRow {
    let supplier_id = books
        .and_then(|(_, r)| r.supplier_id.clone())
        .or_else(|| reference.and_then(|(_, r)| r.supplier_id.clone()));
    ReconRow {
        status,
        probable_reason: status.probable_reason(),
        action_required: status.action_required(),
        books_index: books.map(|(i, _)| i),
        reference_index: reference.map(|(i, _)| i),
        books_invoice_number: books.map(|(_, r)| r.invoice_number.clone()),
        reference_invoice_number: reference.map(|(_, r)| r.invoice_number.clone()),
        supplier_id,
        differences: FieldDifferences::default(),
        books: books.map(|(_, r)| r.clone()),
        reference: reference.map(|(_, r)| r.clone()),
    }
}
