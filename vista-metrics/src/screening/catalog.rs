//! Screening filter catalog.
//!
//! Static description of every filter control: its id, the API field it maps
//! to, and its defaults. The catalog is injected into the compiler so alternate
//! tables can be used in tests or loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use vista_common::validation::{Validate, ValidationError, ValidationResult};
use vista_common::{Result, ResultExt};

use super::compiler::EXCHANGE_FIELD;
use super::types::{FilterControlState, MultiPeriodValue, RangeValue};

// ============================================================================
// Control Configurations
// ============================================================================

/// Simple numeric-range control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeConfig {
    pub id: String,
    /// API field name
    pub name: String,
    pub label: String,
    pub default_from: f64,
    pub default_to: f64,
}

/// One selectable lookback of a multi-period control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodOption {
    /// Value held in the control state (e.g. "30")
    pub value: String,
    pub label: String,
    /// Suffix sent as `extraName` and appended to the column name
    pub extra_name: String,
}

/// Numeric-range control with a period dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiPeriodConfig {
    pub id: String,
    pub name: String,
    pub label: String,
    pub default_from: f64,
    pub default_to: f64,
    pub periods: Vec<PeriodOption>,
}

impl MultiPeriodConfig {
    /// Resolve a period value to its `extraName`.
    pub fn extra_name_for(&self, period: &str) -> Option<&str> {
        self.periods
            .iter()
            .find(|p| p.value == period)
            .map(|p| p.extra_name.as_str())
    }
}

/// Boolean membership control; several may share one `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscreteConfig {
    pub id: String,
    pub name: String,
    pub label: String,
    /// Value emitted when the control is on
    pub value: String,
    /// UI grouping label
    pub group: String,
}

// ============================================================================
// Catalog
// ============================================================================

/// Full set of filter controls known to a compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCatalog {
    #[serde(default)]
    pub ranges: Vec<RangeConfig>,
    #[serde(default)]
    pub multi_periods: Vec<MultiPeriodConfig>,
    #[serde(default)]
    pub discretes: Vec<DiscreteConfig>,
}

impl FilterCatalog {
    /// Parse and validate a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json).context("parsing filter catalog")?;
        catalog.validate().context("validating filter catalog")?;
        Ok(catalog)
    }

    /// The built-in control table.
    pub fn standard() -> Self {
        Self {
            ranges: vec![
                range("marketCap", "marketCap", "Market cap (bn VND)", 0.0, 2_000_000.0),
                range("pe", "pe", "P/E", 0.0, 100.0),
                range("pb", "pb", "P/B", 0.0, 20.0),
                range("roe", "roe", "ROE (%)", -50.0, 100.0),
                range("evEbitda", "evEbitda", "EV/EBITDA", 0.0, 50.0),
                range("dividendYield", "dividendYield", "Dividend yield (%)", 0.0, 30.0),
            ],
            multi_periods: vec![
                MultiPeriodConfig {
                    id: "adtv".into(),
                    name: "adtv".into(),
                    label: "Average daily trading value (bn VND)".into(),
                    default_from: 0.0,
                    default_to: 2_000.0,
                    periods: vec![
                        period("10", "10 days", "10Days"),
                        period("20", "20 days", "20Days"),
                        period("30", "30 days", "30Days"),
                    ],
                },
                MultiPeriodConfig {
                    id: "priceChange".into(),
                    name: "priceChange".into(),
                    label: "Price change (%)".into(),
                    default_from: -100.0,
                    default_to: 500.0,
                    periods: vec![
                        period("7", "1 week", "1Week"),
                        period("30", "1 month", "1Month"),
                        period("90", "3 months", "3Months"),
                    ],
                },
            ],
            discretes: vec![
                discrete("trendStrongUp", "stockTrend", "Strong uptrend", "STRONG_UPTREND", "trend"),
                discrete("trendWeakUp", "stockTrend", "Weak uptrend", "WEAK_UPTREND", "trend"),
                discrete("trendStrongDown", "stockTrend", "Strong downtrend", "STRONG_DOWNTREND", "trend"),
                discrete("trendWeakDown", "stockTrend", "Weak downtrend", "WEAK_DOWNTREND", "trend"),
                discrete("macdBuy", "macdSignal", "MACD buy", "BUY", "signal"),
                discrete("macdSell", "macdSignal", "MACD sell", "SELL", "signal"),
            ],
        }
    }

    pub fn range(&self, id: &str) -> Option<&RangeConfig> {
        self.ranges.iter().find(|c| c.id == id)
    }

    pub fn multi_period(&self, id: &str) -> Option<&MultiPeriodConfig> {
        self.multi_periods.iter().find(|c| c.id == id)
    }

    pub fn discrete(&self, id: &str) -> Option<&DiscreteConfig> {
        self.discretes.iter().find(|c| c.id == id)
    }

    /// Initial control state: everything off, values at their defaults,
    /// each multi-period control on its first period.
    pub fn initial_state(&self) -> FilterControlState {
        FilterControlState::from_catalog(self)
    }
}

impl FilterControlState {
    /// Build the initial control state for `catalog`.
    pub fn from_catalog(catalog: &FilterCatalog) -> Self {
        let mut state = Self::default();

        for c in &catalog.ranges {
            state.enabled_ranges.insert(c.id.clone(), false);
            state.range_values.insert(
                c.id.clone(),
                RangeValue {
                    from: c.default_from,
                    to: c.default_to,
                },
            );
        }

        for c in &catalog.multi_periods {
            state.enabled_multi_period.insert(c.id.clone(), false);
            if let Some(first) = c.periods.first() {
                state.multi_period_values.insert(
                    c.id.clone(),
                    MultiPeriodValue {
                        from: c.default_from,
                        to: c.default_to,
                        period: first.value.clone(),
                    },
                );
            }
        }

        for c in &catalog.discretes {
            state.enabled_discrete.insert(c.id.clone(), false);
        }

        state
    }
}

impl Validate for FilterCatalog {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();
        let mut ids = HashSet::new();

        let all_controls = self
            .ranges
            .iter()
            .map(|c| (&c.id, &c.name))
            .chain(self.multi_periods.iter().map(|c| (&c.id, &c.name)))
            .chain(self.discretes.iter().map(|c| (&c.id, &c.name)));

        for (id, name) in all_controls {
            if id.is_empty() {
                errors.push(ValidationError::MissingField {
                    field: "control.id".into(),
                });
            } else if !ids.insert(id.as_str()) {
                errors.push(ValidationError::Duplicate {
                    field: "control id".into(),
                    value: id.clone(),
                });
            }
            if name.is_empty() {
                errors.push(ValidationError::MissingField {
                    field: format!("{}.name", id),
                });
            } else if name == EXCHANGE_FIELD {
                errors.push(ValidationError::InvalidValue {
                    field: format!("{}.name", id),
                    reason: format!("'{}' is reserved for the fixed exchange filter", EXCHANGE_FIELD),
                });
            }
        }

        for c in &self.multi_periods {
            if c.periods.is_empty() {
                errors.push(ValidationError::InvalidValue {
                    field: format!("{}.periods", c.id),
                    reason: "at least one period is required".into(),
                });
            }
            let mut values = HashSet::new();
            for p in &c.periods {
                if !values.insert(p.value.as_str()) {
                    errors.push(ValidationError::Duplicate {
                        field: format!("{} period", c.id),
                        value: p.value.clone(),
                    });
                }
            }
        }

        ValidationError::from_errors(errors)
    }
}

fn range(id: &str, name: &str, label: &str, default_from: f64, default_to: f64) -> RangeConfig {
    RangeConfig {
        id: id.into(),
        name: name.into(),
        label: label.into(),
        default_from,
        default_to,
    }
}

fn period(value: &str, label: &str, extra_name: &str) -> PeriodOption {
    PeriodOption {
        value: value.into(),
        label: label.into(),
        extra_name: extra_name.into(),
    }
}

fn discrete(id: &str, name: &str, label: &str, value: &str, group: &str) -> DiscreteConfig {
    DiscreteConfig {
        id: id.into(),
        name: name.into(),
        label: label.into(),
        value: value.into(),
        group: group.into(),
    }
}
