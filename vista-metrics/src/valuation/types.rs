//! Peer-Multiple Valuation Types.
//!
//! Inputs (peer multiples, target fundamentals) and derived results
//! (average multiples, per-method valuations) of the valuation engine.

use serde::{Deserialize, Serialize};

// ============================================================================
// Zero-Default Policy
// ============================================================================

/// Resolve an optional financial figure to a number.
///
/// Absent and non-finite values become `0.0`. Every place that turns
/// provider data into engine input goes through this one rule, so a missing
/// figure contributes zero instead of aborting the computation.
pub fn resolve_field(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

// ============================================================================
// Input Types
// ============================================================================

/// One peer instrument's valuation ratios for the active forecast period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerMultiple {
    /// Peer ticker
    pub ticker: String,
    /// Price / earnings
    pub pe: f64,
    /// Price / book
    pub pb: f64,
    /// Enterprise value / EBITDA
    pub ev_ebitda: f64,
}

impl PeerMultiple {
    pub fn new(ticker: impl Into<String>, pe: f64, pb: f64, ev_ebitda: f64) -> Self {
        Self {
            ticker: ticker.into(),
            pe,
            pb,
            ev_ebitda,
        }
    }
}

/// Target company's fundamental inputs.
///
/// `ebitda_forecast` is expressed in millions; `debt` and `cash` are
/// absolute. Every field is `0.0` when the provider had nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancials {
    /// Forecast earnings per share
    #[serde(rename = "eps2025F", alias = "epsForecast", default)]
    pub eps_forecast: f64,
    /// Book value per share, as computed upstream
    #[serde(rename = "bookValue", default)]
    pub book_value: f64,
    /// Forecast EBITDA in millions
    #[serde(rename = "ebitda2025F", alias = "ebitdaForecast", default)]
    pub ebitda_forecast: f64,
    /// Total debt
    #[serde(default)]
    pub debt: f64,
    /// Cash and equivalents
    #[serde(default)]
    pub cash: f64,
    /// Shares outstanding
    #[serde(rename = "sharesOutstanding", default)]
    pub shares_outstanding: f64,
}

// ============================================================================
// Derived Types
// ============================================================================

/// Arithmetic mean of each multiple across the selected peers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageMultiples {
    pub pe: f64,
    pub pb: f64,
    pub ev_ebitda: f64,
}

/// Fair value per share by each method plus their unweighted mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub pe: f64,
    pub pb: f64,
    pub ev_ebitda: f64,
    pub average: f64,
}

impl Valuation {
    /// Whether every method produced zero (no usable inputs).
    pub fn is_zero(&self) -> bool {
        self.pe == 0.0 && self.pb == 0.0 && self.ev_ebitda == 0.0
    }
}

/// Full computation trail for one recompute, for display next to the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationBreakdown {
    /// Averages the valuation was derived from
    pub averages: AverageMultiples,
    /// Implied enterprise value (absolute units)
    pub enterprise_value: f64,
    /// Implied equity value: enterprise value minus debt plus cash
    pub market_cap: f64,
    /// Per-share results
    pub valuation: Valuation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_field() {
        assert_eq!(resolve_field(Some(12.5)), 12.5);
        assert_eq!(resolve_field(Some(-3.0)), -3.0);
        assert_eq!(resolve_field(None), 0.0);
        assert_eq!(resolve_field(Some(f64::NAN)), 0.0);
        assert_eq!(resolve_field(Some(f64::INFINITY)), 0.0);
    }

    #[test]
    fn test_financials_wire_names() {
        let json = r#"{
            "eps2025F": 5000,
            "bookValue": 40000,
            "ebitda2025F": 200,
            "debt": 1000000000,
            "cash": 500000000,
            "sharesOutstanding": 100000
        }"#;
        let financials: CompanyFinancials = serde_json::from_str(json).unwrap();
        assert_eq!(financials.eps_forecast, 5000.0);
        assert_eq!(financials.ebitda_forecast, 200.0);
        assert_eq!(financials.shares_outstanding, 100_000.0);
    }

    #[test]
    fn test_financials_missing_fields_default_to_zero() {
        let financials: CompanyFinancials = serde_json::from_str(r#"{ "debt": 10 }"#).unwrap();
        assert_eq!(financials.debt, 10.0);
        assert_eq!(financials.eps_forecast, 0.0);
        assert_eq!(financials.shares_outstanding, 0.0);
    }

    #[test]
    fn test_valuation_serializes_camel_case() {
        let v = Valuation {
            pe: 1.0,
            pb: 2.0,
            ev_ebitda: 3.0,
            average: 2.0,
        };
        let json = serde_json::to_value(v).unwrap();
        assert_eq!(json["evEbitda"], 3.0);
        assert!(!v.is_zero());
        assert!(Valuation::default().is_zero());
    }
}
