//! Bump configuration.

use curvewatch_core::Tenor;
use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};

/// One basis point.
pub const BASIS_POINT: f64 = 0.0001;

/// Finite-difference scheme for DV01 and KRD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BumpMethod {
    /// `(NPV_down - NPV_up) / 2`
    #[default]
    Central,
    /// `NPV_base - NPV_up`
    OneSided,
}

/// Size, scheme and key tenors of the bump-and-reprice run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumpConfig {
    /// Rate shift applied to quotes, in decimal.
    pub size: f64,
    /// Difference scheme.
    pub method: BumpMethod,
    /// Tenors reported as key rate durations.
    pub key_tenors: Vec<Tenor>,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            size: BASIS_POINT,
            method: BumpMethod::Central,
            key_tenors: default_key_tenors(),
        }
    }
}

/// 2Y, 5Y, 10Y and 30Y.
#[must_use]
pub fn default_key_tenors() -> Vec<Tenor> {
    [2, 5, 10, 30]
        .into_iter()
        .filter_map(|y| Tenor::years(y).ok())
        .collect()
}

impl BumpConfig {
    /// Sets the bump size.
    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Sets the difference scheme.
    #[must_use]
    pub fn with_method(mut self, method: BumpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the key tenors.
    #[must_use]
    pub fn with_key_tenors(mut self, key_tenors: Vec<Tenor>) -> Self {
        self.key_tenors = key_tenors;
        self
    }

    /// Multiplier that expresses a difference per basis point.
    #[must_use]
    pub fn scale(&self) -> f64 {
        BASIS_POINT / self.size
    }

    /// Rejects a bump size that is not finite and strictly positive.
    ///
    /// # Errors
    ///
    /// `InvalidBumpSize`.
    pub fn validate(&self) -> RiskResult<()> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(RiskError::InvalidBumpSize { size: self.size });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BumpConfig::default();
        assert_eq!(config.size, 0.0001);
        assert_eq!(config.method, BumpMethod::Central);
        let labels: Vec<String> = config.key_tenors.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["2Y", "5Y", "10Y", "30Y"]);
        assert_eq!(config.scale(), 1.0);
    }

    #[test]
    fn test_validate_rejects_bad_sizes() {
        for size in [0.0, -0.0001, f64::NAN, f64::INFINITY] {
            let config = BumpConfig::default().with_size(size);
            assert!(matches!(config.validate(), Err(RiskError::InvalidBumpSize { .. })));
        }
        assert!(BumpConfig::default().with_size(0.0025).validate().is_ok());
    }

    #[test]
    fn test_deserialize() {
        let config: BumpConfig =
            serde_json::from_str(r#"{"size": 0.0005, "method": "one_sided", "key_tenors": ["5Y"]}"#).unwrap();
        assert_eq!(config.method, BumpMethod::OneSided);
        assert_eq!(config.key_tenors.len(), 1);
        assert!((config.scale() - 0.2).abs() < 1e-15);
    }
}
