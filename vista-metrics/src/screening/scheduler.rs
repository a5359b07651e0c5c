//! Debounced delivery of compiled screening payloads.
//!
//! Every control-state change is handed to [`FilterScheduler::schedule`].
//! The payload is compiled and delivered to the sink only after the quiet
//! period passes with no further change; each new change cancels the pending
//! delivery and restarts the wait. The last state scheduled wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use vista_common::config::ScreeningConfig;
use vista_common::{Error, Result};

use super::compiler::FilterCompiler;
use super::types::{FilterControlState, ScreeningFiltersValue};

/// Consumer of compiled payloads (the screening API client).
pub trait FilterSink: Send + Sync + 'static {
    fn apply(&self, value: ScreeningFiltersValue);
}

impl<F> FilterSink for F
where
    F: Fn(ScreeningFiltersValue) + Send + Sync + 'static,
{
    fn apply(&self, value: ScreeningFiltersValue) {
        self(value)
    }
}

/// Debouncing front of a [`FilterCompiler`].
pub struct FilterScheduler {
    compiler: Arc<FilterCompiler>,
    sink: Arc<dyn FilterSink>,
    quiet_period: Duration,
    runtime: Handle,
    pending: Mutex<Option<JoinHandle<()>>>,
    /// Bumped on every schedule/dispose; a delivery only fires if it still
    /// holds the latest value
    generation: Arc<AtomicU64>,
}

impl FilterScheduler {
    /// Create a scheduler on the current tokio runtime.
    pub fn new(
        compiler: Arc<FilterCompiler>,
        sink: Arc<dyn FilterSink>,
        quiet_period: Duration,
    ) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Runtime(format!("filter scheduler needs a tokio runtime: {}", e)))?;

        Ok(Self {
            compiler,
            sink,
            quiet_period,
            runtime,
            pending: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Create a scheduler using the configured quiet period.
    pub fn from_config(
        compiler: Arc<FilterCompiler>,
        sink: Arc<dyn FilterSink>,
        config: &ScreeningConfig,
    ) -> Result<Self> {
        Self::new(compiler, sink, config.quiet_period())
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Record a state change; restarts the quiet period.
    pub fn schedule(&self, page_size: u32, state: FilterControlState) {
        let mut pending = self.lock_pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.generation);
        let compiler = Arc::clone(&self.compiler);
        let sink = Arc::clone(&self.sink);
        let quiet_period = self.quiet_period;

        *pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(quiet_period).await;
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }

            let body = compiler.build_body(page_size, &state);
            info!(
                filters = body.filter.len(),
                columns = body.visible_columns.len(),
                page_size,
                "Delivering screening filters"
            );
            sink.apply(body);
        }));

        debug!(generation, quiet_ms = quiet_period.as_millis() as u64, "Screening recompute scheduled");
    }

    /// Whether a delivery is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel any pending delivery. Safe to call repeatedly.
    pub fn dispose(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.lock_pending().take() {
            handle.abort();
            debug!("Pending screening delivery cancelled");
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FilterScheduler {
    fn drop(&mut self) {
        self.dispose();
    }
}
