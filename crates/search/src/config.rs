//! Search compilation settings.

use chrono::TimeDelta;
use helios_fhir_values::Decimal;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

/// How the `ap` prefix widens a numeric value into a range.
///
/// The range is `value ± |value| * tolerance`. When `scale` is set, the lower
/// bound is rounded down and the upper bound up to that many decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproximationPolicy {
    /// Relative tolerance, e.g. `0.1` for ±10%.
    pub tolerance: Decimal,
    /// Decimal places the bounds are rounded to.
    pub scale: Option<u32>,
}

impl Default for ApproximationPolicy {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(1, 1),
            scale: None,
        }
    }
}

impl ApproximationPolicy {
    /// Returns the inclusive `(low, high)` range for `value`.
    ///
    /// Bounds saturate at `Decimal::MIN` and `Decimal::MAX`.
    pub fn bounds(&self, value: Decimal) -> (Decimal, Decimal) {
        let margin = value.abs().saturating_mul(self.tolerance);
        let low = value.saturating_sub(margin);
        let high = value.saturating_add(margin);
        match self.scale {
            Some(dp) => (
                low.round_dp_with_strategy(dp, RoundingStrategy::ToNegativeInfinity),
                high.round_dp_with_strategy(dp, RoundingStrategy::ToPositiveInfinity),
            ),
            None => (low, high),
        }
    }
}

/// Settings used when compiling criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Tolerance for `ap` on number and quantity parameters.
    pub approximation: ApproximationPolicy,
    /// Seconds added to each side of a date range for `ap`.
    pub date_approximation_secs: i64,
    /// Upper limit for a search's result count.
    pub max_count: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            approximation: ApproximationPolicy::default(),
            date_approximation_secs: 86_400, // one day
            max_count: 1000,
        }
    }
}

impl SearchConfig {
    /// Width added to each side of a date range for `ap`.
    pub fn date_approximation(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.date_approximation_secs).unwrap_or(TimeDelta::MAX)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.approximation.tolerance.is_sign_negative() {
            errors.push("Approximation tolerance cannot be negative".to_string());
        }

        if self.approximation.tolerance > Decimal::ONE {
            errors.push("Approximation tolerance cannot exceed 1".to_string());
        }

        if let Some(scale) = self.approximation.scale {
            if scale > 28 {
                errors.push("Approximation scale cannot exceed 28".to_string());
            }
        }

        if self.date_approximation_secs < 0 {
            errors.push("Date approximation cannot be negative".to_string());
        }

        if self.max_count == 0 {
            errors.push("Max count cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
