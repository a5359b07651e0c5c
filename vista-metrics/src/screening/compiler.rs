//! Screening filter-body compiler.
//!
//! Compiles the current [`FilterControlState`] into a [`ScreeningFiltersValue`]:
//!
//! 1. Fixed `exchange` filter (hsx, hnx, upcom), always present
//! 2. Enabled range controls
//! 3. Enabled multi-period controls, column named `name + extraName`
//! 4. Enabled discrete controls, grouped into one filter per field name
//!
//! The payload is rebuilt from scratch on every call and always starts at
//! page 0 with no sorting.

use std::collections::HashSet;
use tracing::{debug, warn};

use super::catalog::FilterCatalog;
use super::types::*;

/// Field name of the unconditional exchange filter.
pub const EXCHANGE_FIELD: &str = "exchange";

/// Exchanges every screening query is restricted to.
pub const EXCHANGES: &[&str] = &["hsx", "hnx", "upcom"];

/// Compiler bound to one control catalog.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    catalog: FilterCatalog,
}

impl FilterCompiler {
    pub fn new(catalog: FilterCatalog) -> Self {
        Self { catalog }
    }

    /// Compiler over the built-in catalog.
    pub fn standard() -> Self {
        Self::new(FilterCatalog::standard())
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    /// Build the query body for the given control state.
    ///
    /// Values are passed through as-is; `from > to` is not corrected.
    pub fn build_body(&self, page_size: u32, state: &FilterControlState) -> ScreeningFiltersValue {
        let mut filter = vec![exchange_filter()];
        let mut visible_columns = Vec::new();

        for config in &self.catalog.ranges {
            if !state.is_range_enabled(&config.id) || shadows_exchange(&config.id, &config.name) {
                continue;
            }
            let value = state.range_values.get(&config.id).copied().unwrap_or(RangeValue {
                from: config.default_from,
                to: config.default_to,
            });

            filter.push(FilterItem {
                name: config.name.clone(),
                extra_name: None,
                condition_options: vec![ConditionOption::range(value.from, value.to)],
            });
            visible_columns.push(config.name.clone());
        }

        for config in &self.catalog.multi_periods {
            if !state.is_multi_period_enabled(&config.id)
                || shadows_exchange(&config.id, &config.name)
            {
                continue;
            }
            let current = match state.multi_period_values.get(&config.id) {
                Some(v) => Some((v.from, v.to, v.period.as_str())),
                None => config
                    .periods
                    .first()
                    .map(|p| (config.default_from, config.default_to, p.value.as_str())),
            };
            let Some((from, to, period)) = current else {
                warn!(control = %config.id, "No period configured, skipping filter");
                continue;
            };

            let Some(extra_name) = config.extra_name_for(period) else {
                warn!(control = %config.id, period, "Unknown period, skipping filter");
                continue;
            };

            filter.push(FilterItem {
                name: config.name.clone(),
                extra_name: Some(extra_name.to_string()),
                condition_options: vec![ConditionOption::range(from, to)],
            });
            visible_columns.push(format!("{}{}", config.name, extra_name));
        }

        let mut groups: Vec<(String, Vec<ConditionOption>)> = Vec::new();
        for config in &self.catalog.discretes {
            if !state.is_discrete_enabled(&config.id) || shadows_exchange(&config.id, &config.name) {
                continue;
            }
            let option = ConditionOption::value(config.value.clone());
            match groups.iter_mut().find(|(name, _)| *name == config.name) {
                Some((_, options)) => options.push(option),
                None => groups.push((config.name.clone(), vec![option])),
            }
        }
        for (name, condition_options) in groups {
            visible_columns.push(name.clone());
            filter.push(FilterItem {
                name,
                extra_name: None,
                condition_options,
            });
        }

        let visible_columns = dedup_preserving_order(visible_columns);

        debug!(
            filters = filter.len(),
            columns = visible_columns.len(),
            page_size,
            "Screening body compiled"
        );

        ScreeningFiltersValue {
            page: 0,
            page_size,
            sort_fields: Vec::new(),
            sort_orders: Vec::new(),
            filter,
            visible_columns,
        }
    }
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::standard()
    }
}

fn exchange_filter() -> FilterItem {
    FilterItem {
        name: EXCHANGE_FIELD.to_string(),
        extra_name: None,
        condition_options: EXCHANGES.iter().map(|e| ConditionOption::value(*e)).collect(),
    }
}

/// Controls named like the fixed exchange filter are never emitted.
fn shadows_exchange(id: &str, name: &str) -> bool {
    if name == EXCHANGE_FIELD {
        warn!(control = %id, "Control reuses the reserved exchange field, skipping filter");
        return true;
    }
    false
}

fn dedup_preserving_order(columns: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    columns
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
