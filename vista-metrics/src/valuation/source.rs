//! Valuation data sources.
//!
//! The peer comparison, per-peer statistics and target fundamentals come from
//! external providers. This module defines that boundary and assembles the
//! provider rows into engine inputs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use vista_common::config::ValuationConfig;

use super::types::{resolve_field, CompanyFinancials, PeerMultiple};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors reported by a valuation data provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),
    /// Data not available for the requested symbol
    #[error("Data not available: {0}")]
    DataNotAvailable(String),
    /// Provider is temporarily unavailable
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
    /// Response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<ProviderError> for vista_common::Error {
    fn from(e: ProviderError) -> Self {
        vista_common::Error::External(e.to_string())
    }
}

// ============================================================================
// Provider Payloads
// ============================================================================

/// One row of the peer comparison table, multiples keyed by period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerComparisonRow {
    pub ticker: String,
    #[serde(default)]
    pub pe: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub pb: HashMap<String, Option<f64>>,
}

/// Per-ticker statistics; only EV/EBITDA is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerStatistics {
    #[serde(default)]
    pub ev_to_ebitda: Option<f64>,
}

/// Target fundamentals as the provider returns them, every field optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFinancials {
    #[serde(rename = "eps2025F", default)]
    pub eps_forecast: Option<f64>,
    #[serde(rename = "bookValue", default)]
    pub book_value: Option<f64>,
    #[serde(rename = "ebitda2025F", default)]
    pub ebitda_forecast: Option<f64>,
    #[serde(default)]
    pub debt: Option<f64>,
    #[serde(default)]
    pub cash: Option<f64>,
    #[serde(rename = "sharesOutstanding", default)]
    pub shares_outstanding: Option<f64>,
}

impl From<RawFinancials> for CompanyFinancials {
    fn from(raw: RawFinancials) -> Self {
        Self {
            eps_forecast: resolve_field(raw.eps_forecast),
            book_value: resolve_field(raw.book_value),
            ebitda_forecast: resolve_field(raw.ebitda_forecast),
            debt: resolve_field(raw.debt),
            cash: resolve_field(raw.cash),
            shares_outstanding: resolve_field(raw.shares_outstanding),
        }
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// External source of everything the valuation view needs.
#[async_trait]
pub trait ValuationDataProvider: Send + Sync {
    /// Peer comparison rows for `symbol`, possibly including an aggregate row.
    async fn peer_comparison(&self, symbol: &str) -> Result<Vec<PeerComparisonRow>, ProviderError>;

    /// Statistics for one ticker.
    async fn statistics(&self, ticker: &str) -> Result<PeerStatistics, ProviderError>;

    /// Fundamentals of the target company.
    async fn fundamentals(&self, symbol: &str) -> Result<RawFinancials, ProviderError>;
}

// ============================================================================
// Assembly
// ============================================================================

/// Whether a comparison row is the provider's aggregate (e.g. "Median") row.
pub fn is_aggregate_row(row: &PeerComparisonRow, aggregate_label: &str) -> bool {
    row.ticker.eq_ignore_ascii_case(aggregate_label)
}

/// Flatten comparison rows plus statistics into engine inputs.
///
/// Drops the aggregate row, picks `period` from each row, and zero-fills
/// anything missing. Peer order is preserved.
pub fn assemble_peers(
    rows: &[PeerComparisonRow],
    statistics: &HashMap<String, PeerStatistics>,
    period: &str,
    aggregate_label: &str,
) -> Vec<PeerMultiple> {
    rows.iter()
        .filter(|row| !is_aggregate_row(row, aggregate_label))
        .map(|row| PeerMultiple {
            ticker: row.ticker.clone(),
            pe: resolve_field(row.pe.get(period).copied().flatten()),
            pb: resolve_field(row.pb.get(period).copied().flatten()),
            ev_ebitda: resolve_field(statistics.get(&row.ticker).and_then(|s| s.ev_to_ebitda)),
        })
        .collect()
}

/// Everything loaded for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSnapshot {
    pub symbol: String,
    pub benchmark_stocks: Vec<PeerMultiple>,
    pub financials: CompanyFinancials,
    /// The target's own EV/EBITDA, shown next to the peer average
    pub target_ev_ebitda: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Fetch and assemble a snapshot for `symbol`.
///
/// Peer list or fundamentals failures fail the whole load. A failed
/// statistics call only zeroes that ticker's EV/EBITDA.
pub async fn load_snapshot<P>(
    provider: &P,
    symbol: &str,
    config: &ValuationConfig,
) -> Result<ValuationSnapshot, ProviderError>
where
    P: ValuationDataProvider + ?Sized,
{
    let rows: Vec<PeerComparisonRow> = provider
        .peer_comparison(symbol)
        .await?
        .into_iter()
        .filter(|row| !is_aggregate_row(row, &config.aggregate_row_label))
        .collect();

    let peer_stats = join_all(rows.iter().map(|row| async move {
        let stats = match provider.statistics(&row.ticker).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(ticker = %row.ticker, error = %e, "Peer statistics unavailable, using 0");
                PeerStatistics::default()
            }
        };
        (row.ticker.clone(), stats)
    }));

    let (peer_stats, target_stats, fundamentals) = futures::join!(
        peer_stats,
        provider.statistics(symbol),
        provider.fundamentals(symbol)
    );

    let statistics: HashMap<String, PeerStatistics> = peer_stats.into_iter().collect();
    let target_ev_ebitda = match target_stats {
        Ok(stats) => resolve_field(stats.ev_to_ebitda),
        Err(e) => {
            warn!(symbol, error = %e, "Target statistics unavailable, using 0");
            0.0
        }
    };
    let financials = CompanyFinancials::from(fundamentals?);

    let benchmark_stocks = assemble_peers(
        &rows,
        &statistics,
        &config.forecast_period,
        &config.aggregate_row_label,
    );

    debug!(
        symbol,
        peers = benchmark_stocks.len(),
        period = %config.forecast_period,
        "Valuation snapshot loaded"
    );

    Ok(ValuationSnapshot {
        symbol: symbol.to_string(),
        benchmark_stocks,
        financials,
        target_ev_ebitda,
        fetched_at: Utc::now(),
    })
}
