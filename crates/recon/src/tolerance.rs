//! Numeric and temporal closeness predicates.

use chrono::NaiveDate;

/// `a` is within `pct` percent of `b`.
///
/// A zero reference `b` only accepts an exact zero `a`.
pub fn within_tolerance(a: f64, b: f64, pct: f64) -> bool {
    if b == 0.0 {
        return a == 0.0;
    }
    (a - b).abs() / b.abs() * 100.0 <= pct
}

/// Signed percent difference of `a` relative to `b`; 0 when `b` is 0.
pub fn percent_difference(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        return 0.0;
    }
    (a - b) / b * 100.0
}

/// Absolute distance in whole days.
pub fn days_apart(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

/// Amount closeness in `[0, 1]`: `max(0, 1 - |pct diff| / 100)`.
///
/// A zero reference amount scores 1.0 against a zero extracted amount when
/// `zero_matches_zero` is set, and 0.0 otherwise.
pub fn amount_score(extracted: f64, reference: f64, zero_matches_zero: bool) -> f64 {
    if reference == 0.0 {
        return if zero_matches_zero && extracted == 0.0 { 1.0 } else { 0.0 };
    }
    let pct = (extracted - reference).abs() / reference.abs() * 100.0;
    (1.0 - pct / 100.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_reference_requires_zero() {
        assert!(within_tolerance(0.0, 0.0, 1.0));
        assert!(!within_tolerance(5.0, 0.0, 1.0));
        assert!(!within_tolerance(-0.01, 0.0, 1.0));
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(within_tolerance(1010.0, 1000.0, 1.0));
        assert!(within_tolerance(990.0, 1000.0, 1.0));
        assert!(!within_tolerance(1011.0, 1000.0, 1.0));
        assert!(!within_tolerance(989.0, 1000.0, 1.0));
    }

    #[test]
    fn negative_values_are_ordinary_numbers() {
        assert!(within_tolerance(-1005.0, -1000.0, 1.0));
        assert!(!within_tolerance(1000.0, -1000.0, 1.0));
    }

    #[test]
    fn signed_percent() {
        assert_eq!(percent_difference(1100.0, 1000.0), 10.0);
        assert_eq!(percent_difference(900.0, 1000.0), -10.0);
        assert_eq!(percent_difference(5.0, 0.0), 0.0);
    }

    #[test]
    fn day_distance() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(days_apart(a, b), 8);
        assert_eq!(days_apart(b, a), 8);
    }

    #[test]
    fn amount_scores() {
        assert_eq!(amount_score(1180.0, 1180.0, true), 1.0);
        assert!((amount_score(1000.0, 1250.0, true) - 0.8).abs() < 1e-12);
        assert_eq!(amount_score(5000.0, 1000.0, true), 0.0);
        assert_eq!(amount_score(0.0, 0.0, true), 1.0);
        assert_eq!(amount_score(0.0, 0.0, false), 0.0);
        assert_eq!(amount_score(10.0, 0.0, true), 0.0);
    }
}
