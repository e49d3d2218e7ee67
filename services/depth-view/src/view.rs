//! Depth view orchestration
//!
//! `DepthView` is one live pipeline instance: it binds to one book, owns
//! the subscription handle and the step controller, and recomputes a full
//! snapshot synchronously inside every change notification, pushing it to
//! the sink. Recompute cost is O(window size), independent of book depth
//! past the scanned window.
//!
//! State machine: Unbound → (bind) → Bound → (unbind / rebind) → Unbound.
//! The previous subscription is disposed before a new one is taken, so a
//! stale callback can never publish for a replaced binding.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info};
use types::market::{Market, Side};

use crate::aggregate::aggregate_side;
use crate::metrics::ViewMetrics;
use crate::order_book::{BookSubscription, SharedBook};
use crate::scale::{apply_shared_total, shared_total};
use crate::snapshot::{compute_checksum, DepthSnapshot};
use crate::step::StepController;

/// Receives snapshots as they are published.
///
/// One downstream channel per view; the engine never fans out.
pub trait ViewSink {
    fn on_snapshot(&mut self, snapshot: &DepthSnapshot);
}

/// Closures work as sinks directly.
impl<F: FnMut(&DepthSnapshot)> ViewSink for F {
    fn on_snapshot(&mut self, snapshot: &DepthSnapshot) {
        self(snapshot)
    }
}

/// Host commands the view accepts.
///
/// Injected capability: the host dispatches concrete commands instead of
/// registering string-keyed handlers on a global bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    /// Coarsen the grouping by a decade.
    IncreaseAggregation,
    /// Refine the grouping by a decade.
    DecreaseAggregation,
    /// Set the aggregation step directly (clamped).
    SetAggregation(Decimal),
    /// Recompute and republish without a book change.
    Refresh,
}

/// Configuration for a depth view.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Maximum aggregated rows per side.
    pub max_rows: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { max_rows: 50 }
    }
}

/// The Bound half of the state machine.
struct Binding {
    market: Market,
    book: SharedBook,
    /// Held for ownership only; dropping it unregisters the listener.
    _subscription: BookSubscription,
}

struct ViewState {
    config: ViewConfig,
    controller: StepController,
    version: u64,
    binding: Option<Binding>,
}

/// One live aggregation pipeline instance.
///
/// Each view owns its own controller state and subscription handle; there
/// is no process-wide registry of views.
pub struct DepthView {
    state: Rc<RefCell<ViewState>>,
    sink: Rc<RefCell<dyn ViewSink>>,
    metrics: Rc<ViewMetrics>,
}

impl DepthView {
    pub fn new(config: ViewConfig, sink: Rc<RefCell<dyn ViewSink>>) -> Self {
        Self {
            state: Rc::new(RefCell::new(ViewState {
                config,
                controller: StepController::new(),
                version: 0,
                binding: None,
            })),
            sink,
            metrics: Rc::new(ViewMetrics::new()),
        }
    }

    /// Attach to a book.
    ///
    /// Any previous subscription is disposed before the new one is taken,
    /// the step resets to the market default, and an initial snapshot is
    /// computed and published immediately; the view never waits for the
    /// first external mutation.
    pub fn bind(&self, book: &SharedBook, market: Market) {
        {
            let mut state = self.state.borrow_mut();

            // Dispose the old subscription before registering the new one.
            state.binding = None;
            state.controller.reset_for_market(market.price_precision);

            let weak_state = Rc::downgrade(&self.state);
            let sink = Rc::clone(&self.sink);
            let metrics = Rc::clone(&self.metrics);
            let subscription = book.subscribe(move || {
                if let Some(state) = weak_state.upgrade() {
                    metrics.record_notification();
                    recompute_and_publish(&state, &sink, &metrics);
                }
            });

            info!(
                symbol = %market.symbol,
                step = %state.controller.step(),
                "depth view bound"
            );

            state.binding = Some(Binding {
                market,
                book: book.clone(),
                _subscription: subscription,
            });
        }

        recompute_and_publish(&self.state, &self.sink, &self.metrics);
    }

    /// Detach from the current book.
    ///
    /// The subscription is disposed synchronously; queries return
    /// unavailable afterwards, never a stale snapshot.
    pub fn unbind(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(binding) = state.binding.take() {
            info!(symbol = %binding.market.symbol, "depth view unbound");
        }
    }

    /// Whether a book is currently attached.
    pub fn is_bound(&self) -> bool {
        self.state.borrow().binding.is_some()
    }

    /// Market of the current binding.
    pub fn market(&self) -> Option<Market> {
        self.state.borrow().binding.as_ref().map(|b| b.market.clone())
    }

    /// Current aggregation step.
    pub fn step(&self) -> Decimal {
        self.state.borrow().controller.step()
    }

    /// Toolbar label for the current grouping.
    pub fn grouping_label(&self) -> String {
        self.state.borrow().controller.display_grouping()
    }

    /// Recompute a fresh snapshot on demand. None while unbound.
    ///
    /// The view keeps no snapshot history; every call rebuilds from the
    /// live book.
    pub fn snapshot(&self) -> Option<DepthSnapshot> {
        let mut state = self.state.borrow_mut();
        build_snapshot(&mut state, &self.metrics)
    }

    /// Coarsen the grouping by a decade.
    pub fn increase_aggregation(&self) {
        self.apply_step_change(|controller| controller.increase_aggregation());
    }

    /// Refine the grouping by a decade.
    pub fn decrease_aggregation(&self) {
        self.apply_step_change(|controller| controller.decrease_aggregation());
    }

    /// Set the step directly. Clamped; a no-op publishes nothing.
    pub fn set_aggregation(&self, step: Decimal) {
        self.apply_step_change(move |controller| controller.set(step));
    }

    /// Injected host-command capability.
    pub fn trigger(&self, command: ViewCommand) {
        match command {
            ViewCommand::IncreaseAggregation => self.increase_aggregation(),
            ViewCommand::DecreaseAggregation => self.decrease_aggregation(),
            ViewCommand::SetAggregation(step) => self.set_aggregation(step),
            ViewCommand::Refresh => {
                recompute_and_publish(&self.state, &self.sink, &self.metrics)
            }
        }
    }

    /// Metrics handle for scraping.
    pub fn metrics(&self) -> Rc<ViewMetrics> {
        Rc::clone(&self.metrics)
    }

    fn apply_step_change(&self, mutate: impl FnOnce(&mut StepController) -> bool) {
        let changed = mutate(&mut self.state.borrow_mut().controller);
        if changed {
            self.metrics.record_step_change();
            recompute_and_publish(&self.state, &self.sink, &self.metrics);
        }
    }
}

/// Recompute synchronously and push to the sink. No-op while unbound.
fn recompute_and_publish(
    state: &Rc<RefCell<ViewState>>,
    sink: &Rc<RefCell<dyn ViewSink>>,
    metrics: &ViewMetrics,
) {
    let snapshot = {
        let mut state = state.borrow_mut();
        build_snapshot(&mut state, metrics)
    };

    // State borrow is released before the sink runs, so the sink may call
    // back into view queries.
    if let Some(snapshot) = snapshot {
        metrics.record_publish();
        sink.borrow_mut().on_snapshot(&snapshot);
    }
}

/// Build one snapshot from the bound book. None while unbound.
fn build_snapshot(state: &mut ViewState, metrics: &ViewMetrics) -> Option<DepthSnapshot> {
    let started = Instant::now();
    let step = state.controller.step();
    let max_rows = state.config.max_rows;

    let (symbol, mut bids, mut asks) = {
        let binding = state.binding.as_ref()?;
        let book = binding.book.read();
        let bids = aggregate_side(book.bid_levels(), step, Side::Bid, max_rows);
        let asks = aggregate_side(book.ask_levels(), step, Side::Ask, max_rows);
        (binding.market.symbol.clone(), bids, asks)
    };

    // Bucketed spread, taken before the asks are reversed for display.
    let spread = match (bids.first(), asks.first()) {
        (Some(best_bid), Some(best_ask)) => Some(best_ask.price - best_bid.price),
        _ => None,
    };

    if let Some(total) = shared_total(&bids, &asks) {
        apply_shared_total(&mut bids, &mut asks, total);
    }

    // Display order: best ask sits last, adjacent to the spread row.
    asks.reverse();

    state.version += 1;
    let checksum = compute_checksum(&bids, &asks, spread, step);

    let snapshot = DepthSnapshot {
        version: state.version,
        symbol,
        bids,
        asks,
        spread,
        step,
        checksum,
    };

    metrics.record_recompute(started.elapsed().as_nanos() as u64);
    debug!(
        version = snapshot.version,
        bid_rows = snapshot.bids.len(),
        ask_rows = snapshot.asks.len(),
        "snapshot rebuilt"
    );

    Some(snapshot)
}
