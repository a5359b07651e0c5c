//! Peer-Multiple Valuation Engine.
//!
//! Turns selected peer multiples and target fundamentals into three
//! independent fair-value-per-share estimates:
//!
//! - **P/E**: `avg_pe × eps_forecast`
//! - **P/B**: `avg_pb × book_value`
//! - **EV/EBITDA**: `(avg_ev_ebitda × ebitda × unit − debt + cash) / shares`
//!
//! The reported average always divides by three, so a method without data
//! pulls the average toward zero instead of being excluded.
//!
//! With no selected peers there is nothing to value against: every figure,
//! including the EV/EBITDA cash/debt adjustment, is zero.

use vista_common::config::ValuationConfig;

use super::selection::SelectionSet;
use super::types::*;

/// Number of valuation methods averaged into [`Valuation::average`].
const METHOD_COUNT: f64 = 3.0;

/// Stateless valuation calculator.
#[derive(Debug, Clone)]
pub struct PeerValuationEngine {
    /// Scale turning EBITDA into the unit of debt and cash
    ebitda_unit: f64,
}

impl PeerValuationEngine {
    /// Create an engine with the default EBITDA unit (millions).
    pub fn new() -> Self {
        Self::with_config(&ValuationConfig::default())
    }

    /// Create an engine from configuration.
    pub fn with_config(config: &ValuationConfig) -> Self {
        Self {
            ebitda_unit: config.ebitda_unit,
        }
    }

    pub fn ebitda_unit(&self) -> f64 {
        self.ebitda_unit
    }

    /// Average each multiple across the peers whose ticker is selected.
    ///
    /// An empty intersection yields all zeros.
    pub fn average_multiples(
        &self,
        benchmark_stocks: &[PeerMultiple],
        selected: &SelectionSet,
    ) -> AverageMultiples {
        let chosen = selected_peers(benchmark_stocks, selected);
        if chosen.is_empty() {
            return AverageMultiples::default();
        }

        AverageMultiples {
            pe: mean(chosen.iter().map(|p| p.pe)),
            pb: mean(chosen.iter().map(|p| p.pb)),
            ev_ebitda: mean(chosen.iter().map(|p| p.ev_ebitda)),
        }
    }

    /// Derive per-share valuations from averaged multiples.
    pub fn valuate(
        &self,
        averages: &AverageMultiples,
        financials: &CompanyFinancials,
    ) -> ValuationBreakdown {
        let eps = resolve_field(Some(financials.eps_forecast));
        let book_value = resolve_field(Some(financials.book_value));
        let ebitda = resolve_field(Some(financials.ebitda_forecast));
        let debt = resolve_field(Some(financials.debt));
        let cash = resolve_field(Some(financials.cash));
        let shares = resolve_field(Some(financials.shares_outstanding));

        let by_pe = averages.pe * eps;
        let by_pb = averages.pb * book_value;

        let enterprise_value = averages.ev_ebitda * ebitda * self.ebitda_unit;
        let market_cap = enterprise_value - debt + cash;
        let by_ev_ebitda = if shares > 0.0 {
            market_cap / shares
        } else {
            0.0
        };

        let valuation = Valuation {
            pe: by_pe,
            pb: by_pb,
            ev_ebitda: by_ev_ebitda,
            average: (by_pe + by_pb + by_ev_ebitda) / METHOD_COUNT,
        };

        ValuationBreakdown {
            averages: *averages,
            enterprise_value,
            market_cap,
            valuation,
        }
    }

    /// Full recompute: filter, average, valuate.
    ///
    /// An empty peer selection short-circuits to an all-zero breakdown
    /// whatever the financials are.
    pub fn compute(
        &self,
        benchmark_stocks: &[PeerMultiple],
        selected: &SelectionSet,
        financials: &CompanyFinancials,
    ) -> ValuationBreakdown {
        if selected_peers(benchmark_stocks, selected).is_empty() {
            tracing::debug!(
                peers = benchmark_stocks.len(),
                selected = selected.len(),
                "No selected peers, valuation is zero"
            );
            return ValuationBreakdown::default();
        }

        let averages = self.average_multiples(benchmark_stocks, selected);
        let breakdown = self.valuate(&averages, financials);

        tracing::debug!(
            peers = benchmark_stocks.len(),
            selected = selected.len(),
            avg_pe = averages.pe,
            avg_pb = averages.pb,
            avg_ev_ebitda = averages.ev_ebitda,
            average = breakdown.valuation.average,
            "Valuation recomputed"
        );

        breakdown
    }
}

impl Default for PeerValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn selected_peers<'a>(
    benchmark_stocks: &'a [PeerMultiple],
    selected: &SelectionSet,
) -> Vec<&'a PeerMultiple> {
    benchmark_stocks
        .iter()
        .filter(|p| selected.contains(&p.ticker))
        .collect()
}

/// Mean of a non-empty sequence, summed in sorted order so the result does
/// not depend on peer ordering.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut values: Vec<f64> = values.map(|v| resolve_field(Some(v))).collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}
