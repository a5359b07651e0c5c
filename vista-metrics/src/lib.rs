//! Vista Metrics Library
//!
//! The derived-metrics core of the Vista market dashboard. Two cooperating
//! subsystems, both pure computation over already-fetched data:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        vista-metrics                              │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────┐     ┌─────────────────────────────┐ │
//! │  │ Peer-Multiple Valuation  │     │ Screening Filter Compiler   │ │
//! │  │  source → session →      │     │  catalog + control state →  │ │
//! │  │  engine → Valuation      │     │  compiler → scheduler → sink│ │
//! │  └──────────────────────────┘     └─────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Valuation
//!
//! Averages P/E, P/B and EV/EBITDA across a user-selected peer set and turns
//! them into three fair-value-per-share estimates plus their mean.
//!
//! # Screening
//!
//! Compiles enabled range, multi-period and discrete filter controls into a
//! query payload for the screening API, delivered after a quiet period.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod screening;
pub mod valuation;

pub use screening::{
    FilterCatalog, FilterCompiler, FilterControlState, FilterItem, FilterScheduler, FilterSink,
    ScreeningFiltersValue,
};
pub use valuation::{
    AverageMultiples, CompanyFinancials, PeerMultiple, PeerValuationEngine, SelectionSet,
    Valuation, ValuationSession,
};
