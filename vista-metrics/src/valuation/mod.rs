//! Peer-Multiple Valuation Module.
//!
//! Estimates a fair value per share for a target company from the average
//! multiples of a user-selected peer set.
//!
//! # The Three Methods
//!
//! 1. **P/E**: average peer P/E × forecast EPS
//! 2. **P/B**: average peer P/B × book value per share
//! 3. **EV/EBITDA**: average peer EV/EBITDA × forecast EBITDA gives an
//!    enterprise value; minus debt plus cash, divided by shares outstanding
//!
//! The headline figure is the plain mean of the three.
//!
//! # Usage
//!
//! ```ignore
//! use vista_metrics::valuation::{PeerValuationEngine, SelectionSet};
//!
//! let engine = PeerValuationEngine::new();
//! let selected: SelectionSet = ["HPG", "HSG"].into_iter().collect();
//! let result = engine.compute(&peers, &selected, &financials);
//!
//! println!("Fair value: {:.0}", result.valuation.average);
//! ```

pub mod engine;
pub mod selection;
pub mod session;
pub mod source;
pub mod types;

pub use engine::PeerValuationEngine;
pub use selection::SelectionSet;
pub use session::{LoadOutcome, ValuationSession};
pub use source::{
    assemble_peers, load_snapshot, PeerComparisonRow, PeerStatistics, ProviderError,
    RawFinancials, ValuationDataProvider, ValuationSnapshot,
};
pub use types::{
    resolve_field, AverageMultiples, CompanyFinancials, PeerMultiple, Valuation,
    ValuationBreakdown,
};
