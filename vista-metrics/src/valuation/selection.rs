//! Peer selection set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::types::PeerMultiple;

/// Tickers the user has toggled on for averaging.
///
/// No minimum or maximum size is enforced; empty and "all peers" are both
/// valid selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    tickers: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the first `count` peers in provider order.
    pub fn leading(peers: &[PeerMultiple], count: usize) -> Self {
        peers.iter().take(count).map(|p| p.ticker.clone()).collect()
    }

    /// Remove the ticker if present, otherwise add it.
    ///
    /// Returns whether the ticker is selected afterwards.
    pub fn toggle(&mut self, ticker: &str) -> bool {
        if self.tickers.remove(ticker) {
            false
        } else {
            self.tickers.insert(ticker.to_string());
            true
        }
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers.contains(ticker)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn clear(&mut self) {
        self.tickers.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tickers: iter.into_iter().map(Into::into).collect(),
        }
    }
}
