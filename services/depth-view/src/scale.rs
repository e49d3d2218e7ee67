//! Magnitude normalization for relative bar widths
//!
//! Produces the shared denominator written into every row of a snapshot.
//! The numerator cap keeps one oversized level from rendering every bar
//! full-width; the 0.5 floor keeps a thin book from stretching its bars.
//! Every normalized bar width `size / total` lands in (0, 1].
//!
//! Both sides share one denominator so bid and ask magnitudes are
//! comparable on screen.

use rust_decimal::Decimal;

use crate::snapshot::AggregatedRow;

/// Joint shared-total denominator across both sides.
///
/// `total = Σ bid sizes + Σ ask sizes`, scaled by
/// `max(max_bid/total, max_ask/total, 0.5)`. Evaluated as
/// `max(max_bid, max_ask, total/2)` so the result stays exact under
/// decimal division. Returns None when the rows carry no size
/// (degenerate book).
pub fn shared_total(bids: &[AggregatedRow], asks: &[AggregatedRow]) -> Option<Decimal> {
    let total: Decimal = bids.iter().chain(asks).map(|r| r.size).sum();
    if total <= Decimal::ZERO {
        return None;
    }

    let max_bid = bids
        .iter()
        .map(|r| r.size)
        .max()
        .unwrap_or(Decimal::ZERO);
    let max_ask = asks
        .iter()
        .map(|r| r.size)
        .max()
        .unwrap_or(Decimal::ZERO);

    let half_total = total / Decimal::TWO;

    Some(max_bid.max(max_ask).max(half_total))
}

/// Write the shared denominator into every row of both sides.
pub fn apply_shared_total(
    bids: &mut [AggregatedRow],
    asks: &mut [AggregatedRow],
    total: Decimal,
) {
    for row in bids.iter_mut().chain(asks.iter_mut()) {
        row.total = total;
    }
}
