//! Price bucketing
//!
//! Maps a raw price onto its aggregation bucket at a given step. Rounding
//! is asymmetric by side: bids round down (toward the book), asks round up,
//! so the displayed spread is always at least the true spread, never
//! tighter.

use rust_decimal::Decimal;
use types::market::Side;
use types::numeric::Price;

/// Bucket a raw price at the given aggregation step.
///
/// Bid side: `floor(price * step) / step`, so a bid's displayed price
/// never overstates what the buyer is offering. Ask side:
/// `ceil(price * step) / step`, so an ask's displayed price never
/// understates what the seller demands.
pub fn bucket_price(price: Price, step: Decimal, side: Side) -> Decimal {
    let scaled = price.as_decimal() * step;
    let rounded = match side {
        Side::Bid => scaled.floor(),
        Side::Ask => scaled.ceil(),
    };
    rounded / step
}
