//! `itcmatch-recon`: purchase-register reconciliation engine.
//!
//! Pure engine crate: receives already-structured records for the books side
//! and the GSTR-2B reference side, returns classified results and summaries.
//! Two independent strategies share the normalizer and tolerance helpers:
//!
//! - [`reconcile`] pairs records by exact (GSTIN, invoice number, document type)
//!   and classifies each pair for compliance review.
//! - [`detect_mismatches`] pairs records by a weighted similarity score and
//!   attaches informational notes for soft reporting.
//!
//! No CLI or filesystem dependencies beyond [`load::load_records`].

pub mod approximate;
pub mod classify;
pub mod config;
pub mod error;
pub mod load;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod similarity;
pub mod summary;
pub mod tolerance;

pub use approximate::{detect_mismatches, detect_mismatches_with};
pub use config::ReconConfig;
pub use error::{ReconError, Result};
pub use load::{load_records, parse_records_csv, parse_records_json};
pub use model::{
    ComplianceStatus, ExtractionStatus, FinancialRecord, MismatchReport, ReconStatus,
    ReconciliationReport,
};
pub use reconcile::{reconcile, reconcile_with};
pub use summary::ReportCard;
