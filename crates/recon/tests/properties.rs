// Property-based tests for both matchers.
// CI: 128 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use itcmatch_recon::model::{ExtractionStatus, UnmatchedReason};
use itcmatch_recon::{detect_mismatches, reconcile, FinancialRecord, ReconStatus};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_128() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small alphabets so keys collide often and duplicates appear.
fn arb_record() -> impl Strategy<Value = FinancialRecord> {
    (
        prop_oneof![Just("INV001"), Just("INV002"), Just("inv001"), Just("INV-001"), Just("")],
        prop_oneof![
            Just(Some("27AAAPL1234C1Z5")),
            Just(Some("29ABCDE1234F1Z5")),
            Just(None)
        ],
        prop_oneof![Just("Invoice"), Just("Credit Note")],
        prop_oneof![Just(Some("2024-04-01")), Just(Some("15/04/2024")), Just(None)],
        prop::option::of(0.0..5000.0f64),
        prop::option::of(0.0..500.0f64),
        prop::option::of(0.0..500.0f64),
        prop::option::weighted(0.8, 0.0..5000.0f64),
        prop::bool::weighted(0.1),
    )
        .prop_map(
            |(number, gstin, doc_type, date, taxable, split, igst, total, errored)| {
                FinancialRecord {
                    invoice_number: number.to_string(),
                    invoice_date: date.map(str::to_string),
                    supplier_id: gstin.map(str::to_string),
                    document_type: doc_type.to_string(),
                    taxable_value: taxable,
                    cgst: split,
                    sgst: split,
                    igst,
                    total_amount: total,
                    extraction_status: if errored {
                        ExtractionStatus::Error
                    } else {
                        ExtractionStatus::Ok
                    },
                    ..Default::default()
                }
            },
        )
}

fn arb_records(max: usize) -> impl Strategy<Value = Vec<FinancialRecord>> {
    proptest::collection::vec(arb_record(), 0..=max)
}

// ---------------------------------------------------------------------------
// Deterministic reconciliation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_128())]

    #[test]
    fn reconcile_accounts_for_every_record(books in arb_records(12), reference in arb_records(12)) {
        let report = reconcile(&books, &reference);

        // one row per books record, in order
        prop_assert_eq!(report.books_results.len(), books.len());
        for (i, row) in report.books_results.iter().enumerate() {
            prop_assert_eq!(row.books_index, Some(i));
        }

        // each reference record is claimed at most once or reported missing
        let mut seen = HashSet::new();
        for row in &report.books_results {
            if let Some(ri) = row.reference_index {
                prop_assert!(seen.insert(ri), "reference {} claimed twice", ri);
            }
        }
        for row in &report.unmatched_reference {
            prop_assert_eq!(row.status, ReconStatus::MissingInBooks);
            let ri = row.reference_index.unwrap();
            prop_assert!(seen.insert(ri), "reference {} both claimed and missing", ri);
        }
        prop_assert_eq!(seen.len(), reference.len());

        let s = &report.summary;
        prop_assert_eq!(
            s.matched + s.value_mismatches + s.tax_structure_mismatches
                + s.missing_in_reference + s.invalid_data,
            s.total_books
        );
        prop_assert_eq!(s.missing_in_books, report.unmatched_reference.len());
        prop_assert!((0.0..=100.0).contains(&s.reconciliation_rate));
    }

    #[test]
    fn reconcile_invalid_records_never_pair(
        books in arb_records(12),
        reference in arb_records(12),
    ) {
        let report = reconcile(&books, &reference);
        for (book, row) in books.iter().zip(&report.books_results) {
            let invalid = book.is_extraction_error() || book.invoice_number.trim().is_empty();
            prop_assert_eq!(invalid, row.status == ReconStatus::InvalidData);
            if invalid {
                prop_assert_eq!(row.reference_index, None);
            }
        }
    }

    #[test]
    fn reconcile_is_deterministic(books in arb_records(12), reference in arb_records(12)) {
        let a = reconcile(&books, &reference);
        let b = reconcile(&books, &reference);
        prop_assert_eq!(
            serde_json::to_value(&a.books_results).unwrap(),
            serde_json::to_value(&b.books_results).unwrap()
        );
        prop_assert_eq!(
            serde_json::to_value(&a.unmatched_reference).unwrap(),
            serde_json::to_value(&b.unmatched_reference).unwrap()
        );
    }
}

// ---------------------------------------------------------------------------
// Approximate matching
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_128())]

    #[test]
    fn detect_partitions_both_sides(extracted in arb_records(12), reference in arb_records(12)) {
        let report = detect_mismatches(&extracted, &reference);

        let mut extracted_seen = HashSet::new();
        let mut reference_seen = HashSet::new();
        for pair in &report.matched_pairs {
            prop_assert!(extracted_seen.insert(pair.extracted_index));
            prop_assert!(reference_seen.insert(pair.reference_index));
            prop_assert!(pair.score.total >= 0.85);
            prop_assert!(pair.score.total <= 1.0 + 1e-9);
            prop_assert!(!extracted[pair.extracted_index].is_extraction_error());
        }
        for u in &report.unmatched_extracted {
            prop_assert!(extracted_seen.insert(u.index));
            if u.reason == UnmatchedReason::ExtractionFailed {
                prop_assert!(extracted[u.index].is_extraction_error());
            }
        }
        for u in &report.unmatched_reference {
            prop_assert!(reference_seen.insert(u.index));
        }
        prop_assert_eq!(extracted_seen.len(), extracted.len());
        prop_assert_eq!(reference_seen.len(), reference.len());

        let with_notes = report.matched_pairs.iter().filter(|p| !p.notes.is_empty()).count();
        prop_assert_eq!(report.mismatches.len(), with_notes);
        prop_assert_eq!(report.summary.mismatch_count, with_notes);
    }

    #[test]
    fn detect_is_deterministic(extracted in arb_records(12), reference in arb_records(12)) {
        let a = detect_mismatches(&extracted, &reference);
        let b = detect_mismatches(&extracted, &reference);
        prop_assert_eq!(
            serde_json::to_value(&a.matched_pairs).unwrap(),
            serde_json::to_value(&b.matched_pairs).unwrap()
        );
        prop_assert_eq!(
            serde_json::to_value(&a.unmatched_extracted).unwrap(),
            serde_json::to_value(&b.unmatched_extracted).unwrap()
        );
    }
}
