//! Integration tests for the peer-multiple valuation engine and session.
//!
//! Covers the engine's numeric guarantees and the session's load/reset
//! behaviour against an in-memory provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;

use vista_common::config::ValuationConfig;
use vista_metrics::valuation::{
    AverageMultiples, CompanyFinancials, LoadOutcome, PeerComparisonRow, PeerMultiple,
    PeerStatistics, PeerValuationEngine, ProviderError, RawFinancials, SelectionSet, Valuation,
    ValuationDataProvider, ValuationSession,
};

// ============================================================================
// Engine Scenarios
// ============================================================================

fn scenario_financials() -> CompanyFinancials {
    CompanyFinancials {
        eps_forecast: 5_000.0,
        book_value: 40_000.0,
        ebitda_forecast: 200.0,
        debt: 1_000_000_000.0,
        cash: 500_000_000.0,
        shares_outstanding: 100_000.0,
    }
}

fn scenario_peers() -> Vec<PeerMultiple> {
    vec![
        PeerMultiple::new("DGC", 10.0, 1.0, 6.0),
        PeerMultiple::new("DPM", 14.0, 2.0, 10.0),
        PeerMultiple::new("DCM", 99.0, 9.0, 99.0),
    ]
}

#[test]
fn test_concrete_scenario() {
    let engine = PeerValuationEngine::new();
    let selected: SelectionSet = ["DGC", "DPM"].into_iter().collect();

    let result = engine.compute(&scenario_peers(), &selected, &scenario_financials());

    assert_eq!(
        result.averages,
        AverageMultiples {
            pe: 12.0,
            pb: 1.5,
            ev_ebitda: 8.0
        }
    );
    assert_eq!(result.valuation.pe, 60_000.0);
    assert_eq!(result.valuation.pb, 60_000.0);
    assert_eq!(result.enterprise_value, 1_600_000_000.0);
    assert_eq!(result.market_cap, 1_100_000_000.0);
    assert_eq!(result.valuation.ev_ebitda, 11_000.0);
    assert!((result.valuation.average - 43_666.666_666).abs() < 1e-3);
}

#[test]
fn test_empty_selection_is_all_zero() {
    let engine = PeerValuationEngine::new();
    let result = engine.compute(&scenario_peers(), &SelectionSet::new(), &scenario_financials());

    assert_eq!(result.averages, AverageMultiples::default());
    assert_eq!(result.valuation, Valuation::default());
    // Cash and debt are not carried into the EV/EBITDA method without peers
    assert_eq!(result.enterprise_value, 0.0);
    assert_eq!(result.market_cap, 0.0);
}

#[test]
fn test_empty_selection_and_empty_inputs_is_zero_valuation() {
    let engine = PeerValuationEngine::new();
    let result = engine.compute(&[], &SelectionSet::new(), &CompanyFinancials::default());
    assert_eq!(result.valuation, Valuation::default());
}

#[test]
fn test_zero_shares_never_produces_nan() {
    let engine = PeerValuationEngine::new();
    let selected: SelectionSet = ["DGC", "DPM", "DCM"].into_iter().collect();
    let financials = CompanyFinancials {
        shares_outstanding: 0.0,
        ..scenario_financials()
    };

    let v = engine.compute(&scenario_peers(), &selected, &financials).valuation;
    assert_eq!(v.ev_ebitda, 0.0);
    assert!(v.average.is_finite());
}

#[test]
fn test_missing_method_drags_average() {
    let engine = PeerValuationEngine::new();
    let averages = AverageMultiples {
        pe: 20.0,
        pb: 0.0,
        ev_ebitda: 0.0,
    };
    let financials = CompanyFinancials {
        eps_forecast: 5.0,
        ..Default::default()
    };

    let v = engine.valuate(&averages, &financials).valuation;
    assert_eq!(v.pe, 100.0);
    assert!((v.average - 33.333_333).abs() < 1e-5);
}

fn peer_strategy() -> impl Strategy<Value = Vec<PeerMultiple>> {
    prop::collection::vec(
        ("[A-Z]{3}", 0.0f64..200.0, 0.0f64..30.0, -50.0f64..100.0)
            .prop_map(|(t, pe, pb, ev)| PeerMultiple::new(t, pe, pb, ev)),
        0..12,
    )
}

fn financials_strategy() -> impl Strategy<Value = CompanyFinancials> {
    (
        -1e5f64..1e5,
        -1e6f64..1e6,
        -1e6f64..1e6,
        0.0f64..1e13,
        0.0f64..1e13,
        0.0f64..1e10,
    )
        .prop_map(|(eps, bv, ebitda, debt, cash, shares)| CompanyFinancials {
            eps_forecast: eps,
            book_value: bv,
            ebitda_forecast: ebitda,
            debt,
            cash,
            shares_outstanding: shares,
        })
}

proptest! {
    #[test]
    fn prop_empty_selection_is_zero_valuation(
        peers in peer_strategy(),
        financials in financials_strategy(),
    ) {
        let engine = PeerValuationEngine::new();
        let result = engine.compute(&peers, &SelectionSet::new(), &financials);
        prop_assert_eq!(result.averages, AverageMultiples::default());
        prop_assert_eq!(result.valuation, Valuation::default());
    }

    #[test]
    fn prop_average_is_order_independent(peers in peer_strategy(), seed in any::<u64>()) {
        let engine = PeerValuationEngine::new();
        let selected: SelectionSet = peers.iter().step_by(2).map(|p| p.ticker.clone()).collect();

        let mut shuffled = peers.clone();
        let len = shuffled.len();
        if len > 1 {
            // deterministic Fisher-Yates driven by the seed
            let mut s = seed;
            for i in (1..len).rev() {
                s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let j = (s >> 33) as usize % (i + 1);
                shuffled.swap(i, j);
            }
        }

        prop_assert_eq!(
            engine.average_multiples(&peers, &selected),
            engine.average_multiples(&shuffled, &selected)
        );
    }

    #[test]
    fn prop_zero_shares_guard(
        avg_ev in -100.0f64..100.0,
        ebitda in -1e6f64..1e6,
        debt in 0.0f64..1e12,
        cash in 0.0f64..1e12,
    ) {
        let engine = PeerValuationEngine::new();
        let averages = AverageMultiples { pe: 1.0, pb: 1.0, ev_ebitda: avg_ev };
        let financials = CompanyFinancials {
            ebitda_forecast: ebitda,
            debt,
            cash,
            shares_outstanding: 0.0,
            ..Default::default()
        };
        let v = engine.valuate(&averages, &financials).valuation;
        prop_assert_eq!(v.ev_ebitda, 0.0);
        prop_assert!(v.average.is_finite());
    }
}

// ============================================================================
// Session Scenarios
// ============================================================================

#[derive(Clone, Default)]
struct Dataset {
    rows: Vec<PeerComparisonRow>,
    financials: RawFinancials,
    delay: Duration,
}

/// In-memory provider keyed by symbol; unknown symbols fail.
#[derive(Default)]
struct MockProvider {
    datasets: HashMap<String, Dataset>,
    statistics: HashMap<String, f64>,
    failing_statistics: Vec<String>,
    /// Symbols whose peer comparison fetch ran to completion
    completed: Mutex<Vec<String>>,
}

#[async_trait]
impl ValuationDataProvider for MockProvider {
    async fn peer_comparison(&self, symbol: &str) -> Result<Vec<PeerComparisonRow>, ProviderError> {
        let dataset = self
            .datasets
            .get(symbol)
            .ok_or_else(|| ProviderError::DataNotAvailable(symbol.to_string()))?;
        tokio::time::sleep(dataset.delay).await;
        self.completed.lock().unwrap().push(symbol.to_string());
        Ok(dataset.rows.clone())
    }

    async fn statistics(&self, ticker: &str) -> Result<PeerStatistics, ProviderError> {
        if self.failing_statistics.iter().any(|t| t == ticker) {
            return Err(ProviderError::Unavailable(ticker.to_string()));
        }
        Ok(PeerStatistics {
            ev_to_ebitda: self.statistics.get(ticker).copied(),
        })
    }

    async fn fundamentals(&self, symbol: &str) -> Result<RawFinancials, ProviderError> {
        self.datasets
            .get(symbol)
            .map(|d| d.financials)
            .ok_or_else(|| ProviderError::DataNotAvailable(symbol.to_string()))
    }
}

fn row(ticker: &str, pe: f64, pb: f64) -> PeerComparisonRow {
    PeerComparisonRow {
        ticker: ticker.to_string(),
        pe: [("2025F".to_string(), Some(pe))].into(),
        pb: [("2025F".to_string(), Some(pb))].into(),
    }
}

fn steel_provider() -> MockProvider {
    let steel = Dataset {
        rows: vec![
            row("HSG", 10.0, 1.0),
            row("Median", 12.0, 1.4),
            row("NKG", 14.0, 2.0),
            row("TLH", 30.0, 0.5),
            row("SMC", 50.0, 0.4),
        ],
        financials: RawFinancials {
            eps_forecast: Some(5_000.0),
            book_value: Some(40_000.0),
            ebitda_forecast: Some(200.0),
            debt: Some(1_000_000_000.0),
            cash: Some(500_000_000.0),
            shares_outstanding: Some(100_000.0),
        },
        delay: Duration::from_millis(10),
    };

    let banks = Dataset {
        rows: vec![row("VCB", 15.0, 2.5), row("CTG", 9.0, 1.3)],
        financials: RawFinancials {
            eps_forecast: Some(4_000.0),
            ..Default::default()
        },
        delay: Duration::from_secs(1),
    };

    MockProvider {
        datasets: [("HPG".to_string(), steel), ("BID".to_string(), banks)].into(),
        statistics: [
            ("HSG".to_string(), 6.0),
            ("NKG".to_string(), 10.0),
            ("TLH".to_string(), 20.0),
            ("HPG".to_string(), 7.2),
        ]
        .into(),
        failing_statistics: vec!["TLH".to_string()],
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_loads_and_selects_first_three_peers() {
    let session = ValuationSession::new(Arc::new(steel_provider()), ValuationConfig::default());

    let outcome = session.change_symbol("HPG").await.unwrap();
    assert_eq!(outcome, LoadOutcome::Applied { peers: 4 });

    let peers = session.benchmark_stocks().await;
    assert!(peers.iter().all(|p| p.ticker != "Median"));
    // Failed statistics call zeroes only that peer's EV/EBITDA
    assert_eq!(peers[2], PeerMultiple::new("TLH", 30.0, 0.5, 0.0));
    assert_eq!(session.target_ev_ebitda().await, 7.2);

    let selected = session.selected().await;
    assert_eq!(selected.len(), 3);
    assert!(selected.contains("HSG") && selected.contains("NKG") && selected.contains("TLH"));
    assert!(!selected.contains("SMC"));
}

#[tokio::test(start_paused = true)]
async fn test_session_toggle_recomputes() {
    let session = ValuationSession::new(Arc::new(steel_provider()), ValuationConfig::default());
    session.change_symbol("HPG").await.unwrap();

    // Deselect TLH: HSG + NKG give the concrete scenario averages
    assert!(!session.toggle("TLH").await);
    let breakdown = session.breakdown().await;
    assert_eq!(
        breakdown.averages,
        AverageMultiples {
            pe: 12.0,
            pb: 1.5,
            ev_ebitda: 8.0
        }
    );
    assert_eq!(breakdown.valuation.ev_ebitda, 11_000.0);
    assert!((session.valuation().await.average - 43_666.67).abs() < 0.01);

    // Deselect everything: averages collapse to zero
    session.toggle("HSG").await;
    session.toggle("NKG").await;
    assert_eq!(session.average_multiples().await, AverageMultiples::default());
    assert_eq!(session.valuation().await, Valuation::default());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_symbol_resets_to_zero() {
    let session = ValuationSession::new(Arc::new(steel_provider()), ValuationConfig::default());
    session.change_symbol("HPG").await.unwrap();

    let outcome = session.change_symbol("XXX").await.unwrap();
    assert!(matches!(outcome, LoadOutcome::Failed(ProviderError::DataNotAvailable(_))));
    assert!(session.benchmark_stocks().await.is_empty());
    assert!(session.selected().await.is_empty());
    assert_eq!(session.financials().await, CompanyFinancials::default());
    assert_eq!(session.valuation().await, Valuation::default());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_load_is_discarded() {
    let session = ValuationSession::new(Arc::new(steel_provider()), ValuationConfig::default());

    // BID resolves after 1s, HPG after 10ms; HPG was requested last
    let (slow, fast) = tokio::join!(session.change_symbol("BID"), session.change_symbol("HPG"));

    assert_eq!(slow.unwrap(), LoadOutcome::Superseded);
    assert_eq!(fast.unwrap(), LoadOutcome::Applied { peers: 4 });
    assert_eq!(session.symbol().await.as_deref(), Some("HPG"));
    assert!(session
        .benchmark_stocks()
        .await
        .iter()
        .all(|p| p.ticker != "VCB" && p.ticker != "CTG"));
}

#[tokio::test(start_paused = true)]
async fn test_symbol_change_clears_inputs_before_load_resolves() {
    let session = Arc::new(ValuationSession::new(
        Arc::new(steel_provider()),
        ValuationConfig::default(),
    ));
    session.change_symbol("HPG").await.unwrap();
    assert_eq!(session.benchmark_stocks().await.len(), 4);

    let loading = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.change_symbol("BID").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Still loading BID: nothing from HPG may remain visible
    assert_eq!(session.symbol().await.as_deref(), Some("BID"));
    assert!(session.benchmark_stocks().await.is_empty());
    assert_eq!(session.valuation().await, Valuation::default());

    let outcome = loading.await.unwrap().unwrap();
    assert_eq!(outcome, LoadOutcome::Applied { peers: 2 });
}

#[tokio::test(start_paused = true)]
async fn test_superseded_fetch_is_dropped_in_flight() {
    let provider = Arc::new(steel_provider());
    let session = Arc::new(ValuationSession::new(
        Arc::clone(&provider),
        ValuationConfig::default(),
    ));
    let started = tokio::time::Instant::now();

    // BID's peer list takes 1s; HPG is requested 100ms in
    let slow = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.change_symbol("BID").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let fast = session.change_symbol("HPG").await.unwrap();
    let slow = slow.await.unwrap().unwrap();

    assert_eq!(fast, LoadOutcome::Applied { peers: 4 });
    assert_eq!(slow, LoadOutcome::Superseded);
    assert!(started.elapsed() < Duration::from_secs(1));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(*provider.completed.lock().unwrap(), vec!["HPG".to_string()]);
    assert_eq!(session.symbol().await.as_deref(), Some("HPG"));
}
