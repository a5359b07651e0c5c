//! Valuation session.
//!
//! Owns the inputs of one valuation view: the target symbol, its peers, the
//! user's peer selection and the target fundamentals. A symbol change wipes
//! the previous inputs before the new load resolves, and a load that is
//! overtaken by a newer symbol change is dropped mid-flight.

use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use vista_common::config::ValuationConfig;
use vista_common::{Error, Result};

use super::engine::PeerValuationEngine;
use super::selection::SelectionSet;
use super::source::{load_snapshot, ProviderError, ValuationDataProvider};
use super::types::*;

/// Result of a [`ValuationSession::change_symbol`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Fresh inputs were applied
    Applied { peers: usize },
    /// A newer symbol change started before this load finished; its
    /// in-flight provider calls were dropped
    Superseded,
    /// The provider failed; inputs stay empty and valuations read zero
    Failed(ProviderError),
}

#[derive(Debug, Default)]
struct SessionState {
    symbol: Option<String>,
    benchmark_stocks: Vec<PeerMultiple>,
    selected: SelectionSet,
    financials: CompanyFinancials,
    target_ev_ebitda: f64,
}

impl SessionState {
    fn reset(&mut self, symbol: &str) {
        *self = Self {
            symbol: Some(symbol.to_string()),
            ..Default::default()
        };
    }
}

/// Stateful owner of one valuation view.
pub struct ValuationSession<P: ValuationDataProvider + ?Sized> {
    provider: Arc<P>,
    engine: PeerValuationEngine,
    config: ValuationConfig,
    state: RwLock<SessionState>,
    /// Bumped on every symbol change; in-flight loads watch it and stop as
    /// soon as it moves past the value they started with
    generation: watch::Sender<u64>,
}

impl<P: ValuationDataProvider + ?Sized> ValuationSession<P> {
    pub fn new(provider: Arc<P>, config: ValuationConfig) -> Self {
        Self {
            provider,
            engine: PeerValuationEngine::with_config(&config),
            config,
            state: RwLock::new(SessionState::default()),
            generation: watch::Sender::new(0),
        }
    }

    /// Switch the target symbol and load its inputs.
    ///
    /// Inputs are reset to empty/zero before the provider is called.
    pub async fn change_symbol(&self, symbol: &str) -> Result<LoadOutcome> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(Error::InvalidInput("symbol must not be empty".into()));
        }

        let (generation, newer) = {
            let mut state = self.state.write().await;
            state.reset(symbol);
            self.generation.send_modify(|g| *g += 1);
            let mut newer = self.generation.subscribe();
            let generation = *newer.borrow_and_update();
            (generation, newer)
        };
        info!(symbol, generation, "Loading valuation inputs");

        let loaded = tokio::select! {
            loaded = load_snapshot(self.provider.as_ref(), symbol, &self.config) => loaded,
            _ = superseded(newer, generation) => {
                debug!(symbol, generation, "Dropping superseded valuation load");
                return Ok(LoadOutcome::Superseded);
            }
        };

        let mut state = self.state.write().await;
        if *self.generation.borrow() != generation {
            debug!(symbol, generation, "Discarding superseded valuation load");
            return Ok(LoadOutcome::Superseded);
        }

        match loaded {
            Ok(snapshot) => {
                let peers = snapshot.benchmark_stocks.len();
                state.selected =
                    SelectionSet::leading(&snapshot.benchmark_stocks, self.config.initial_selection);
                state.benchmark_stocks = snapshot.benchmark_stocks;
                state.financials = snapshot.financials;
                state.target_ev_ebitda = snapshot.target_ev_ebitda;
                info!(symbol, peers, selected = state.selected.len(), "Valuation inputs applied");
                Ok(LoadOutcome::Applied { peers })
            }
            Err(e) => {
                warn!(symbol, error = %e, "Valuation inputs unavailable, showing zero valuation");
                Ok(LoadOutcome::Failed(e))
            }
        }
    }

    /// Toggle a peer in or out of the averaging set.
    ///
    /// Returns whether the ticker is selected afterwards.
    pub async fn toggle(&self, ticker: &str) -> bool {
        let mut state = self.state.write().await;
        let selected = state.selected.toggle(ticker);
        debug!(ticker, selected, total = state.selected.len(), "Peer selection toggled");
        selected
    }

    pub async fn symbol(&self) -> Option<String> {
        self.state.read().await.symbol.clone()
    }

    pub async fn selected(&self) -> SelectionSet {
        self.state.read().await.selected.clone()
    }

    pub async fn benchmark_stocks(&self) -> Vec<PeerMultiple> {
        self.state.read().await.benchmark_stocks.clone()
    }

    pub async fn financials(&self) -> CompanyFinancials {
        self.state.read().await.financials
    }

    pub async fn target_ev_ebitda(&self) -> f64 {
        self.state.read().await.target_ev_ebitda
    }

    pub async fn average_multiples(&self) -> AverageMultiples {
        let state = self.state.read().await;
        self.engine
            .average_multiples(&state.benchmark_stocks, &state.selected)
    }

    pub async fn breakdown(&self) -> ValuationBreakdown {
        let state = self.state.read().await;
        self.engine
            .compute(&state.benchmark_stocks, &state.selected, &state.financials)
    }

    pub async fn valuation(&self) -> Valuation {
        self.breakdown().await.valuation
    }
}

/// Resolves once the session generation moves past `generation`.
async fn superseded(mut newer: watch::Receiver<u64>, generation: u64) {
    loop {
        let current = *newer.borrow_and_update();
        if current != generation {
            return;
        }
        if newer.changed().await.is_err() {
            // sender dropped: no newer change can arrive
            std::future::pending::<()>().await;
        }
    }
}
