//! Screening Filter Module.
//!
//! Turns the state of the screener's filter controls into the query payload
//! of the screening API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌───────────────┐   ┌────────────┐
//! │ FilterCatalog│──▶│ FilterCompiler  │◀──│FilterScheduler│──▶│ FilterSink │
//! │ (static cfg) │   │ (build_body)    │   │ (400ms quiet) │   │ (API call) │
//! └──────────────┘   └─────────────────┘   └───────────────┘   └────────────┘
//!                              ▲
//!                    FilterControlState (UI)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use vista_metrics::screening::{FilterCompiler, FilterScheduler};
//!
//! let compiler = Arc::new(FilterCompiler::standard());
//! let mut state = compiler.catalog().initial_state();
//! let scheduler = FilterScheduler::from_config(compiler, sink, &config.screening)?;
//!
//! state.enable_multi_period("adtv", true);
//! scheduler.schedule(config.screening.page_size, state.clone());
//! ```

pub mod catalog;
pub mod compiler;
pub mod scheduler;
pub mod types;

pub use catalog::{DiscreteConfig, FilterCatalog, MultiPeriodConfig, PeriodOption, RangeConfig};
pub use compiler::{FilterCompiler, EXCHANGES, EXCHANGE_FIELD};
pub use scheduler::{FilterScheduler, FilterSink};
pub use types::{
    ConditionOption, FilterControlState, FilterItem, MultiPeriodValue, RangeValue,
    ScreeningFiltersValue, ValueKind,
};
