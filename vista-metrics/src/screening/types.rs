//! Screening payload and control-state types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Payload Types
// ============================================================================

/// Marker for value-membership conditions; serialises as `"value"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Value,
}

/// One condition inside a [`FilterItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionOption {
    /// Field must equal `value`
    Value {
        #[serde(rename = "type")]
        kind: ValueKind,
        value: String,
    },
    /// Field must fall within `[from, to]`
    Range { from: f64, to: f64 },
}

impl ConditionOption {
    pub fn value(value: impl Into<String>) -> Self {
        Self::Value {
            kind: ValueKind::Value,
            value: value.into(),
        }
    }

    pub fn range(from: f64, to: f64) -> Self {
        Self::Range { from, to }
    }
}

/// One filter of the screening query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_name: Option<String>,
    pub condition_options: Vec<ConditionOption>,
}

/// Complete screening query body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningFiltersValue {
    pub page: u32,
    pub page_size: u32,
    pub sort_fields: Vec<String>,
    pub sort_orders: Vec<String>,
    pub filter: Vec<FilterItem>,
    pub visible_columns: Vec<String>,
}

impl ScreeningFiltersValue {
    /// Find a filter by name.
    pub fn find(&self, name: &str) -> Option<&FilterItem> {
        self.filter.iter().find(|item| item.name == name)
    }
}

// ============================================================================
// Control State
// ============================================================================

/// Current bounds of a range control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    pub from: f64,
    pub to: f64,
}

/// Current bounds and period of a multi-period control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPeriodValue {
    pub from: f64,
    pub to: f64,
    pub period: String,
}

/// UI state of every filter control, keyed by control id.
///
/// Mutated by user interaction, read-only to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterControlState {
    #[serde(default)]
    pub enabled_ranges: HashMap<String, bool>,
    #[serde(default)]
    pub range_values: HashMap<String, RangeValue>,
    #[serde(default)]
    pub enabled_multi_period: HashMap<String, bool>,
    #[serde(default)]
    pub multi_period_values: HashMap<String, MultiPeriodValue>,
    #[serde(default)]
    pub enabled_discrete: HashMap<String, bool>,
}

impl FilterControlState {
    pub fn enable_range(&mut self, id: &str, enabled: bool) {
        self.enabled_ranges.insert(id.to_string(), enabled);
    }

    pub fn set_range(&mut self, id: &str, from: f64, to: f64) {
        self.range_values
            .insert(id.to_string(), RangeValue { from, to });
    }

    pub fn enable_multi_period(&mut self, id: &str, enabled: bool) {
        self.enabled_multi_period.insert(id.to_string(), enabled);
    }

    pub fn set_multi_period(&mut self, id: &str, from: f64, to: f64, period: impl Into<String>) {
        self.multi_period_values.insert(
            id.to_string(),
            MultiPeriodValue {
                from,
                to,
                period: period.into(),
            },
        );
    }

    pub fn enable_discrete(&mut self, id: &str, enabled: bool) {
        self.enabled_discrete.insert(id.to_string(), enabled);
    }

    pub fn is_range_enabled(&self, id: &str) -> bool {
        self.enabled_ranges.get(id).copied().unwrap_or(false)
    }

    pub fn is_multi_period_enabled(&self, id: &str) -> bool {
        self.enabled_multi_period.get(id).copied().unwrap_or(false)
    }

    pub fn is_discrete_enabled(&self, id: &str) -> bool {
        self.enabled_discrete.get(id).copied().unwrap_or(false)
    }
}
