use crate::config::ToleranceConfig;
use crate::model::{
    AmountField, DateDifference, FieldDifferences, FinancialRecord, ReconStatus, TaxStructure,
    TaxStructureDifference, ValueDifference,
};
use crate::normalize::parse_date;
use crate::tolerance::{days_apart, percent_difference, within_tolerance};

const DATE_NOTE: &str = "Non-critical mismatch - common due to filing delays";

/// Field-level findings for one claimed (books, reference) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MismatchAnalysis {
    /// Amount fields outside tolerance, in [`AmountField::ALL`] order.
    pub values: Vec<ValueDifference>,
    pub books_structure: TaxStructure,
    pub reference_structure: TaxStructure,
    /// Absolute day distance when both dates parse.
    pub date_difference_days: Option<i64>,
    pub date_mismatch: bool,
}

impl MismatchAnalysis {
    pub fn value_mismatch(&self) -> bool {
        !self.values.is_empty()
    }

    /// Only the IGST-vs-split question matters, not the exact structure.
    pub fn tax_structure_mismatch(&self) -> bool {
        (self.books_structure == TaxStructure::Igst)
            != (self.reference_structure == TaxStructure::Igst)
    }
}

/// IGST when any IGST is charged, else CGST+SGST when either half is.
pub fn tax_structure(record: &FinancialRecord) -> TaxStructure {
    let positive = |v: Option<f64>| v.is_some_and(|x| x > 0.0);
    if positive(record.igst) {
        TaxStructure::Igst
    } else if positive(record.cgst) || positive(record.sgst) {
        TaxStructure::CgstSgst
    } else {
        TaxStructure::None
    }
}

/// Compare taxable value and each tax component. Fields unknown on either
/// side are skipped.
fn value_differences(
    books: &FinancialRecord,
    reference: &FinancialRecord,
    tolerance: &ToleranceConfig,
) -> Vec<ValueDifference> {
    AmountField::ALL
        .iter()
        .filter_map(|&field| {
            let b = books.amount(field)?;
            let r = reference.amount(field)?;
            let pct = match field {
                AmountField::TaxableValue => tolerance.value_pct,
                _ => tolerance.tax_pct,
            };
            if within_tolerance(b, r, pct) {
                return None;
            }
            Some(ValueDifference {
                field,
                books: b,
                reference: r,
                difference: b - r,
                difference_percent: percent_difference(b, r),
            })
        })
        .collect()
}

/// Run value, tax-structure, and date checks on a claimed pair.
pub fn analyze_pair(
    books: &FinancialRecord,
    reference: &FinancialRecord,
    tolerance: &ToleranceConfig,
) -> MismatchAnalysis {
    let date_difference_days = match (
        books.invoice_date.as_deref().and_then(parse_date),
        reference.invoice_date.as_deref().and_then(parse_date),
    ) {
        (Some(b), Some(r)) => Some(days_apart(b, r)),
        _ => None,
    };

    MismatchAnalysis {
        values: value_differences(books, reference, tolerance),
        books_structure: tax_structure(books),
        reference_structure: tax_structure(reference),
        date_difference_days,
        date_mismatch: date_difference_days
            .is_some_and(|d| d > i64::from(tolerance.date_window_days)),
    }
}

/// Precedence: tax structure, then value, then matched. Dates never decide.
pub fn classify(analysis: &MismatchAnalysis) -> ReconStatus {
    if analysis.tax_structure_mismatch() {
        ReconStatus::TaxStructureMismatch
    } else if analysis.value_mismatch() {
        ReconStatus::ValueMismatch
    } else {
        ReconStatus::Matched
    }
}

/// Differences block attached to a classified pair.
pub fn field_differences(
    analysis: &MismatchAnalysis,
    books: &FinancialRecord,
    reference: &FinancialRecord,
) -> FieldDifferences {
    FieldDifferences {
        values: analysis.values.clone(),
        tax_structure: analysis.tax_structure_mismatch().then(|| TaxStructureDifference {
            books: analysis.books_structure,
            reference: analysis.reference_structure,
        }),
        date: match (analysis.date_mismatch, analysis.date_difference_days) {
            (true, Some(days)) => Some(DateDifference {
                books_date: books.invoice_date.clone(),
                reference_date: reference.invoice_date.clone(),
                difference_days: days,
                note: DATE_NOTE,
            }),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(taxable: f64, cgst: f64, sgst: f64, igst: f64) -> FinancialRecord {
        FinancialRecord {
            invoice_number: "INV001".into(),
            supplier_id: Some("27AAAPL1234C1Z5".into()),
            taxable_value: Some(taxable),
            cgst: Some(cgst),
            sgst: Some(sgst),
            igst: Some(igst),
            ..Default::default()
        }
    }

    fn tol() -> ToleranceConfig {
        ToleranceConfig::default()
    }

    #[test]
    fn identical_pair_matches() {
        let a = rec(1000.0, 90.0, 90.0, 0.0);
        let analysis = analyze_pair(&a, &a.clone(), &tol());
        assert!(!analysis.value_mismatch());
        assert!(!analysis.tax_structure_mismatch());
        assert_eq!(classify(&analysis), ReconStatus::Matched);
    }

    #[test]
    fn taxable_value_boundary() {
        let reference = rec(1000.0, 90.0, 90.0, 0.0);
        let inside = analyze_pair(&rec(1010.0, 90.0, 90.0, 0.0), &reference, &tol());
        assert_eq!(classify(&inside), ReconStatus::Matched);

        let outside = analyze_pair(&rec(1011.0, 90.0, 90.0, 0.0), &reference, &tol());
        assert_eq!(classify(&outside), ReconStatus::ValueMismatch);
        let diff = &outside.values[0];
        assert_eq!(diff.field, AmountField::TaxableValue);
        assert_eq!(diff.difference, 11.0);
        assert!((diff.difference_percent - 1.1).abs() < 1e-9);
    }

    #[test]
    fn unknown_amounts_are_skipped() {
        let mut books = rec(5000.0, 90.0, 90.0, 0.0);
        books.taxable_value = None;
        let reference = rec(1000.0, 90.0, 90.0, 0.0);
        let analysis = analyze_pair(&books, &reference, &tol());
        assert!(!analysis.value_mismatch());
    }

    #[test]
    fn tax_structure_takes_precedence() {
        let books = rec(1200.0, 0.0, 0.0, 180.0);
        let reference = rec(1000.0, 90.0, 90.0, 0.0);
        let analysis = analyze_pair(&books, &reference, &tol());
        assert!(analysis.value_mismatch());
        assert!(analysis.tax_structure_mismatch());
        assert_eq!(analysis.books_structure, TaxStructure::Igst);
        assert_eq!(analysis.reference_structure, TaxStructure::CgstSgst);
        assert_eq!(classify(&analysis), ReconStatus::TaxStructureMismatch);
    }

    #[test]
    fn split_versus_none_is_not_a_structure_mismatch() {
        let books = rec(1000.0, 0.0, 0.0, 0.0);
        let reference = rec(1000.0, 0.0, 0.0, 0.0);
        let analysis = analyze_pair(&books, &reference, &tol());
        assert_eq!(analysis.books_structure, TaxStructure::None);
        assert!(!analysis.tax_structure_mismatch());

        let mut half = rec(1000.0, 90.0, 0.0, 0.0);
        half.sgst = None;
        assert_eq!(tax_structure(&half), TaxStructure::CgstSgst);
    }

    #[test]
    fn date_drift_is_informational() {
        let mut books = rec(1000.0, 90.0, 90.0, 0.0);
        let mut reference = books.clone();
        books.invoice_date = Some("2024-04-01".into());
        reference.invoice_date = Some("10/04/2024".into());
        let analysis = analyze_pair(&books, &reference, &tol());
        assert_eq!(analysis.date_difference_days, Some(9));
        assert!(analysis.date_mismatch);
        assert_eq!(classify(&analysis), ReconStatus::Matched);

        let diffs = field_differences(&analysis, &books, &reference);
        assert_eq!(diffs.date.as_ref().unwrap().difference_days, 9);
        assert!(diffs.values.is_empty());
        assert!(diffs.tax_structure.is_none());
    }

    #[test]
    fn date_within_window_and_unparsable_dates() {
        let mut books = rec(1000.0, 90.0, 90.0, 0.0);
        let mut reference = books.clone();
        books.invoice_date = Some("2024-04-01".into());
        reference.invoice_date = Some("2024-04-08".into());
        let analysis = analyze_pair(&books, &reference, &tol());
        assert!(!analysis.date_mismatch);

        reference.invoice_date = Some("sometime in April".into());
        let analysis = analyze_pair(&books, &reference, &tol());
        assert_eq!(analysis.date_difference_days, None);
        assert!(!analysis.date_mismatch);
    }

    #[test]
    fn zero_reference_tax_needs_zero_books_tax() {
        let books = rec(1000.0, 0.0, 0.0, 0.5);
        let reference = rec(1000.0, 0.0, 0.0, 0.0);
        let analysis = analyze_pair(&books, &reference, &tol());
        assert_eq!(analysis.values.len(), 1);
        assert_eq!(analysis.values[0].field, AmountField::Igst);
        assert_eq!(analysis.values[0].difference_percent, 0.0);
        // IGST on one side only
        assert_eq!(classify(&analysis), ReconStatus::TaxStructureMismatch);
    }
}
