use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Tunables for both matchers. `Default` reproduces the standard GSTR-2B
/// reconciliation constants; every TOML section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub approximate: ApproximateConfig,
    #[serde(default)]
    pub compliance: ComplianceBands,
}

// ---------------------------------------------------------------------------
// Deterministic path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceConfig {
    /// Allowed taxable value drift, percent of the reference value.
    pub value_pct: f64,
    /// Allowed CGST/SGST/IGST drift, percent of the reference value.
    pub tax_pct: f64,
    /// Dates further apart than this get a non-critical note.
    pub date_window_days: u32,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            value_pct: 1.0,
            tax_pct: 1.0,
            date_window_days: 7,
        }
    }
}

// ---------------------------------------------------------------------------
// Approximate path
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApproximateConfig {
    /// Minimum weighted score for a pair to be accepted.
    pub accept_threshold: f64,
    /// Invoice-number similarity below this attaches a note.
    pub invoice_similarity_bar: f64,
    /// Amount score below this attaches a note.
    pub amount_score_bar: f64,
    /// Score a zero reference total against a zero extracted total as 1.0.
    pub zero_reference_amount_matches_zero: bool,
    /// How the date component decides equality.
    pub date_equality: DateEquality,
    pub weights: ScoreWeights,
}

impl Default for ApproximateConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.85,
            invoice_similarity_bar: 0.9,
            amount_score_bar: 0.95,
            zero_reference_amount_matches_zero: true,
            date_equality: DateEquality::Text,
            weights: ScoreWeights::default(),
        }
    }
}

/// `text` compares trimmed, upper-cased date strings, so `2024-04-01` and
/// `01-04-2024` differ. `calendar` treats two dates that both parse to the
/// same day as equal and falls back to text otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateEquality {
    #[default]
    Text,
    Calendar,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    pub invoice_number: f64,
    pub date: f64,
    pub supplier_id: f64,
    pub amount: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            invoice_number: 0.4,
            date: 0.2,
            supplier_id: 0.2,
            amount: 0.2,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.invoice_number + self.date + self.supplier_id + self.amount
    }
}

// ---------------------------------------------------------------------------
// Compliance
// ---------------------------------------------------------------------------

/// Match-rate bands (percent) for the compliance label.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComplianceBands {
    pub minor_match_rate: f64,
    pub major_match_rate: f64,
}

impl Default for ComplianceBands {
    fn default() -> Self {
        Self {
            minor_match_rate: 95.0,
            major_match_rate: 80.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

const WEIGHT_SUM_EPSILON: f64 = 1e-9;

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let tol = &self.tolerance;
        for (key, value) in [
            ("tolerance.value_pct", tol.value_pct),
            ("tolerance.tax_pct", tol.tax_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "{key} must be a non-negative number, got {value}"
                )));
            }
        }

        let approx = &self.approximate;
        for (key, value) in [
            ("approximate.accept_threshold", approx.accept_threshold),
            ("approximate.invoice_similarity_bar", approx.invoice_similarity_bar),
            ("approximate.amount_score_bar", approx.amount_score_bar),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ReconError::ConfigValidation(format!(
                    "{key} must be within [0, 1], got {value}"
                )));
            }
        }

        let w = &approx.weights;
        for (key, value) in [
            ("approximate.weights.invoice_number", w.invoice_number),
            ("approximate.weights.date", w.date),
            ("approximate.weights.supplier_id", w.supplier_id),
            ("approximate.weights.amount", w.amount),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "{key} must be a non-negative number, got {value}"
                )));
            }
        }
        if (w.sum() - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ReconError::ConfigValidation(format!(
                "approximate.weights must sum to 1.0, got {}",
                w.sum()
            )));
        }

        let bands = &self.compliance;
        if !(0.0 <= bands.major_match_rate
            && bands.major_match_rate <= bands.minor_match_rate
            && bands.minor_match_rate <= 100.0)
        {
            return Err(ReconError::ConfigValidation(format!(
                "compliance bands must satisfy \
                 0 <= major_match_rate ({}) <= minor_match_rate ({}) <= 100",
                bands.major_match_rate, bands.minor_match_rate
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
