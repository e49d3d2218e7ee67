//! Resolved order book ladders and change notification
//!
//! The book is owned and updated by the external market-data layer; the
//! aggregation engine only borrows read access plus a change subscription.
//! `LadderBook` is the sorted state itself; `SharedBook` is the
//! single-threaded shared handle that adds the notification registry.
//!
//! Notifications carry no payload (pull-based): listeners re-read the book
//! through fresh iterators after each notification. Coalescing rapid
//! mutations into one notification is the book's prerogative: `apply`
//! batches mutations and notifies exactly once.

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use rust_decimal::Decimal;
use tracing::debug;
use types::ids::MarketId;
use types::market::Side;
use types::numeric::{Price, Size};

/// One entry in a book ladder: a unique price and its resting size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLevel {
    pub price: Price,
    pub size: Size,
}

/// Resolved order book for a single market.
///
/// Bids and asks are sorted ladders of unique price → size entries.
/// Uses `BTreeMap` for deterministic sorted iteration.
#[derive(Debug, Clone)]
pub struct LadderBook {
    /// Trading pair symbol.
    symbol: MarketId,
    /// Bid ladder; iterated in reverse for best-first (highest price).
    bids: BTreeMap<Price, Size>,
    /// Ask ladder; ascending iteration is already best-first.
    asks: BTreeMap<Price, Size>,
}

impl LadderBook {
    /// Create an empty book for the given symbol.
    pub fn new(symbol: MarketId) -> Self {
        Self {
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    /// Symbol this book belongs to.
    pub fn symbol(&self) -> &MarketId {
        &self.symbol
    }

    /// Insert or replace the resting size at a price level.
    pub fn set_level(&mut self, side: Side, price: Price, size: Size) {
        self.ladder_mut(side).insert(price, size);
    }

    /// Remove a price level entirely. Returns true if it existed.
    pub fn clear_level(&mut self, side: Side, price: Price) -> bool {
        self.ladder_mut(side).remove(&price).is_some()
    }

    /// Current best bid price.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    /// Current best ask price.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Best-ask minus best-bid of the raw (unaggregated) book.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.as_decimal() - bid.as_decimal()),
            _ => None,
        }
    }

    /// Bid levels, best (highest price) first.
    pub fn bid_levels(&self) -> impl Iterator<Item = RawLevel> + '_ {
        self.bids.iter().rev().map(|(price, size)| RawLevel {
            price: *price,
            size: *size,
        })
    }

    /// Ask levels, best (lowest price) first.
    pub fn ask_levels(&self) -> impl Iterator<Item = RawLevel> + '_ {
        self.asks.iter().map(|(price, size)| RawLevel {
            price: *price,
            size: *size,
        })
    }

    /// Number of bid price levels.
    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask price levels.
    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }

    /// Whether both ladders are empty.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    fn ladder_mut(&mut self, side: Side) -> &mut BTreeMap<Price, Size> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }
}

type Listener = Rc<RefCell<dyn FnMut()>>;
type ListenerMap = BTreeMap<u64, Listener>;

/// Shared handle to a ladder book plus its change-notification registry.
///
/// Single-threaded by design: there is exactly one logical thread of
/// control driving mutation and recomputation, so interior mutability is
/// `RefCell`, not a lock.
#[derive(Clone)]
pub struct SharedBook {
    state: Rc<RefCell<LadderBook>>,
    listeners: Rc<RefCell<ListenerMap>>,
    next_listener_id: Rc<Cell<u64>>,
}

impl SharedBook {
    /// Create an empty shared book for the given symbol.
    pub fn new(symbol: MarketId) -> Self {
        Self {
            state: Rc::new(RefCell::new(LadderBook::new(symbol))),
            listeners: Rc::new(RefCell::new(BTreeMap::new())),
            next_listener_id: Rc::new(Cell::new(0)),
        }
    }

    /// Read access to the current ladder state.
    pub fn read(&self) -> Ref<'_, LadderBook> {
        self.state.borrow()
    }

    /// Apply a batch of mutations, then notify listeners exactly once.
    ///
    /// The write borrow is released before listeners run, so callbacks are
    /// free to pull fresh iterators from the book.
    pub fn apply<F: FnOnce(&mut LadderBook)>(&self, mutate: F) {
        mutate(&mut self.state.borrow_mut());
        self.notify();
    }

    /// Set one level and notify.
    pub fn set_level(&self, side: Side, price: Price, size: Size) {
        self.apply(|book| book.set_level(side, price, size));
    }

    /// Clear one level and notify.
    pub fn clear_level(&self, side: Side, price: Price) {
        self.apply(|book| {
            book.clear_level(side, price);
        });
    }

    /// Register a change listener.
    ///
    /// The returned handle owns the registration: dropping or disposing it
    /// unregisters synchronously. Callbacks receive no payload and should
    /// re-read the book.
    pub fn subscribe(&self, callback: impl FnMut() + 'static) -> BookSubscription {
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);

        let listener: Listener = Rc::new(RefCell::new(callback));
        self.listeners.borrow_mut().insert(id, listener);

        debug!(
            symbol = %self.state.borrow().symbol(),
            listener_id = id,
            "book listener registered"
        );

        BookSubscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn notify(&self) {
        // Snapshot the listener set before dispatch: registrations changed
        // mid-notify take effect from the next notification.
        let callbacks: Vec<Listener> = self.listeners.borrow().values().cloned().collect();
        for callback in callbacks {
            (&mut *callback.borrow_mut())();
        }
    }
}

/// Owned subscription handle with exactly one owner.
///
/// Unregistration happens synchronously on `dispose` or drop, so a
/// replaced subscription can never fire again once its handle is gone.
pub struct BookSubscription {
    id: u64,
    listeners: Weak<RefCell<ListenerMap>>,
}

impl BookSubscription {
    /// Unregister the listener. Equivalent to dropping the handle.
    pub fn dispose(self) {}
}

impl Drop for BookSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().remove(&self.id);
        }
    }
}
