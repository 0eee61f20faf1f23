use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Upstream extraction outcome. `Error` records never take part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    #[default]
    Ok,
    Error,
}

/// One purchase record, from either the books side or the reference side.
///
/// Monetary fields are `None` when absent or unparsable, which is distinct
/// from an explicit zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialRecord {
    pub invoice_number: String,
    pub invoice_date: Option<String>,
    pub supplier_id: Option<String>,
    pub document_type: String,
    pub taxable_value: Option<f64>,
    pub cgst: Option<f64>,
    pub sgst: Option<f64>,
    pub igst: Option<f64>,
    pub total_amount: Option<f64>,
    pub extraction_status: ExtractionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itc_eligible: Option<bool>,
}

pub const DEFAULT_DOCUMENT_TYPE: &str = "Invoice";
pub const DEFAULT_SECTION: &str = "B2B";

impl Default for FinancialRecord {
    fn default() -> Self {
        Self {
            invoice_number: String::new(),
            invoice_date: None,
            supplier_id: None,
            document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
            taxable_value: None,
            cgst: None,
            sgst: None,
            igst: None,
            total_amount: None,
            extraction_status: ExtractionStatus::Ok,
            section: None,
            itc_eligible: None,
        }
    }
}

impl FinancialRecord {
    pub fn is_extraction_error(&self) -> bool {
        self.extraction_status == ExtractionStatus::Error
    }

    /// GSTR-2B section, `B2B` when the ledger did not say.
    pub fn section(&self) -> &str {
        self.section.as_deref().unwrap_or(DEFAULT_SECTION)
    }

    /// ITC eligibility flag, eligible when the ledger did not say.
    pub fn itc_eligible(&self) -> bool {
        self.itc_eligible.unwrap_or(true)
    }

    pub fn amount(&self, field: AmountField) -> Option<f64> {
        match field {
            AmountField::TaxableValue => self.taxable_value,
            AmountField::Cgst => self.cgst,
            AmountField::Sgst => self.sgst,
            AmountField::Igst => self.igst,
        }
    }
}

/// Identity for deterministic matching: normalized (GSTIN, invoice number,
/// document type). Not unique within a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey {
    pub supplier_id: String,
    pub invoice_number: String,
    pub document_type: String,
}

// ---------------------------------------------------------------------------
// Deterministic reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconStatus {
    Matched,
    ValueMismatch,
    TaxStructureMismatch,
    MissingInReference,
    MissingInBooks,
    InvalidData,
}

impl ReconStatus {
    pub const ALL: [ReconStatus; 6] = [
        Self::Matched,
        Self::ValueMismatch,
        Self::TaxStructureMismatch,
        Self::MissingInReference,
        Self::MissingInBooks,
        Self::InvalidData,
    ];

    /// Human label as used in review sheets.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Matched => "Matched",
            Self::ValueMismatch => "Value Mismatch",
            Self::TaxStructureMismatch => "Tax Structure Mismatch",
            Self::MissingInReference => "Missing in GSTR-2B",
            Self::MissingInBooks => "Missing in Books",
            Self::InvalidData => "Invalid Data",
        }
    }

    pub fn probable_reason(&self) -> &'static str {
        match self {
            Self::Matched => "Invoice details match GSTR-2B",
            Self::ValueMismatch => "Supplier amendment or data entry error",
            Self::TaxStructureMismatch => "Wrong tax type charged (place of supply issue)",
            Self::MissingInReference => "Supplier may not have filed or filed after cutoff date",
            Self::MissingInBooks => "Invoice not recorded by client or accounting delay",
            Self::InvalidData => "Extraction failed or missing invoice number",
        }
    }

    pub fn action_required(&self) -> &'static str {
        match self {
            Self::Matched => "None - verified",
            Self::ValueMismatch => "Verify invoice copy",
            Self::TaxStructureMismatch => "Legal review / supplier correction required",
            Self::MissingInReference => "Client/Supplier follow-up required",
            Self::MissingInBooks => "Verify purchase register",
            Self::InvalidData => "Verify source document",
        }
    }
}

impl std::fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matched => write!(f, "matched"),
            Self::ValueMismatch => write!(f, "value_mismatch"),
            Self::TaxStructureMismatch => write!(f, "tax_structure_mismatch"),
            Self::MissingInReference => write!(f, "missing_in_reference"),
            Self::MissingInBooks => write!(f, "missing_in_books"),
            Self::InvalidData => write!(f, "invalid_data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountField {
    TaxableValue,
    Cgst,
    Sgst,
    Igst,
}

impl AmountField {
    pub const ALL: [AmountField; 4] = [Self::TaxableValue, Self::Cgst, Self::Sgst, Self::Igst];
}

impl std::fmt::Display for AmountField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaxableValue => write!(f, "taxable_value"),
            Self::Cgst => write!(f, "cgst"),
            Self::Sgst => write!(f, "sgst"),
            Self::Igst => write!(f, "igst"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueDifference {
    pub field: AmountField,
    pub books: f64,
    pub reference: f64,
    /// books - reference
    pub difference: f64,
    /// Signed percent of the reference value; 0 when the reference is 0.
    pub difference_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaxStructure {
    #[serde(rename = "IGST")]
    Igst,
    #[serde(rename = "CGST+SGST")]
    CgstSgst,
    #[serde(rename = "None")]
    None,
}

impl std::fmt::Display for TaxStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Igst => write!(f, "IGST"),
            Self::CgstSgst => write!(f, "CGST+SGST"),
            Self::None => write!(f, "None"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxStructureDifference {
    pub books: TaxStructure,
    pub reference: TaxStructure,
}

/// Non-critical: never changes the status of a pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateDifference {
    pub books_date: Option<String>,
    pub reference_date: Option<String>,
    pub difference_days: i64,
    pub note: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldDifferences {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueDifference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_structure: Option<TaxStructureDifference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateDifference>,
}

impl FieldDifferences {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.tax_structure.is_none() && self.date.is_none()
    }
}

/// One classified line of a reconciliation: a books record, a reference
/// record, or a claimed pair of both.
#[derive(Debug, Clone, Serialize)]
pub struct ReconRow {
    pub status: ReconStatus,
    pub probable_reason: &'static str,
    pub action_required: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_index: Option<usize>,
    pub books_invoice_number: Option<String>,
    pub reference_invoice_number: Option<String>,
    pub supplier_id: Option<String>,
    #[serde(skip_serializing_if = "FieldDifferences::is_empty")]
    pub differences: FieldDifferences,
    pub books: Option<FinancialRecord>,
    pub reference: Option<FinancialRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_books: usize,
    pub total_reference: usize,
    pub matched: usize,
    pub value_mismatches: usize,
    pub tax_structure_mismatches: usize,
    pub missing_in_reference: usize,
    pub missing_in_books: usize,
    pub invalid_data: usize,
    /// Claimed pairs carrying a non-critical date note.
    pub date_notes: usize,
    /// matched / total_books, as a percentage.
    pub reconciliation_rate: f64,
    pub status_counts: BTreeMap<String, usize>,
    pub compliance: ComplianceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub meta: ReportMeta,
    pub summary: ReconSummary,
    /// One row per books record, in books order.
    pub books_results: Vec<ReconRow>,
    /// One row per never-claimed reference record, in reference order.
    pub unmatched_reference: Vec<ReconRow>,
}

impl ReconciliationReport {
    /// Every row, books rows first.
    pub fn rows(&self) -> impl Iterator<Item = &ReconRow> {
        self.books_results.iter().chain(self.unmatched_reference.iter())
    }
}

// ---------------------------------------------------------------------------
// Approximate matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoredField {
    InvoiceNumber,
    Date,
    SupplierId,
    Amount,
}

/// Per-component scores in `[0, 1]` and their weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub invoice_number: f64,
    pub date: f64,
    pub supplier_id: f64,
    pub amount: f64,
    pub total: f64,
}

/// Informational note for a component that scored below its own bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MismatchNote {
    pub field: ScoredField,
    pub extracted: String,
    pub reference: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredPair {
    pub extracted_index: usize,
    pub reference_index: usize,
    pub extracted: FinancialRecord,
    pub reference: FinancialRecord,
    pub score: ScoreBreakdown,
    pub notes: Vec<MismatchNote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    ExtractionFailed,
    NoReferenceMatch,
}

impl std::fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExtractionFailed => write!(f, "extraction failed"),
            Self::NoReferenceMatch => write!(f, "no matching record in reference"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedExtracted {
    pub index: usize,
    pub record: FinancialRecord,
    pub reason: UnmatchedReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedReference {
    pub index: usize,
    pub record: FinancialRecord,
}

/// A matched pair that carried at least one note.
#[derive(Debug, Clone, Serialize)]
pub struct MismatchDetail {
    pub invoice_number: String,
    pub match_score: f64,
    pub issues: Vec<MismatchNote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MismatchSummary {
    pub total_extracted: usize,
    pub total_reference: usize,
    pub matched: usize,
    pub unmatched_extracted: usize,
    pub unmatched_reference: usize,
    pub mismatch_count: usize,
    /// matched / total_extracted, as a percentage.
    pub match_rate: f64,
    pub compliance: ComplianceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct MismatchReport {
    pub meta: ReportMeta,
    pub summary: MismatchSummary,
    pub matched_pairs: Vec<ScoredPair>,
    pub unmatched_extracted: Vec<UnmatchedExtracted>,
    pub unmatched_reference: Vec<UnmatchedReference>,
    pub mismatches: Vec<MismatchDetail>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    NoData,
    Compliant,
    MinorDiscrepancies,
    MajorDiscrepancies,
    NonCompliant,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData => write!(f, "NO_DATA"),
            Self::Compliant => write!(f, "COMPLIANT"),
            Self::MinorDiscrepancies => write!(f, "MINOR_DISCREPANCIES"),
            Self::MajorDiscrepancies => write!(f, "MAJOR_DISCREPANCIES"),
            Self::NonCompliant => write!(f, "NON_COMPLIANT"),
        }
    }
}

/// Output metadata only; nothing here feeds matching.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
    pub engine_version: String,
    pub generated_at: String,
}

impl ReportMeta {
    pub fn now(config_name: Option<&str>) -> Self {
        Self {
            config_name: config_name.map(str::to_string),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
