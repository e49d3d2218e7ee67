//! Side aggregation
//!
//! Walks one side's best-first iterator, buckets each raw level, and merges
//! adjacent levels that land in the same bucket. Merging is a linear
//! adjacent pass, not a general group-by: it relies on the book's iterator
//! being monotonic in price.
//!
//! The cutoff is a row cutoff, not a depth cutoff: raw levels that bucket
//! into the still-open last row are absorbed, and the walk stops when a
//! level would open one row past the bound. Levels beyond the window are
//! dropped, so per-side row sums understate total book depth past the
//! window.

use rust_decimal::Decimal;
use types::market::Side;

use crate::bucket::bucket_price;
use crate::order_book::RawLevel;
use crate::snapshot::AggregatedRow;

/// Aggregate one side of the book into at most `max_rows` rows.
///
/// `levels` must be the side's native best-first iterator. Rows come out in
/// the side's natural direction: descending price for bids, ascending for
/// asks. `total` is left at zero for the normalizer to fill.
pub fn aggregate_side(
    levels: impl Iterator<Item = RawLevel>,
    step: Decimal,
    side: Side,
    max_rows: usize,
) -> Vec<AggregatedRow> {
    let mut rows: Vec<AggregatedRow> = Vec::with_capacity(max_rows);

    for level in levels {
        let bucket = bucket_price(level.price, step, side);

        match rows.last_mut() {
            Some(last) if last.price == bucket => {
                last.size += level.size.as_decimal();
            }
            _ => {
                if rows.len() == max_rows {
                    break;
                }
                rows.push(AggregatedRow {
                    price: bucket,
                    size: level.size.as_decimal(),
                    total: Decimal::ZERO,
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::{Price, Size};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn level(price: &str, size: &str) -> RawLevel {
        RawLevel {
            price: Price::from_str(price).unwrap(),
            size: Size::from_str(size).unwrap(),
        }
    }

    #[test]
    fn test_bid_grouping_at_unit_step() {
        let levels = vec![
            level("100.00", "1"),
            level("100.00", "2"),
            level("99.99", "5"),
        ];

        let rows = aggregate_side(levels.into_iter(), dec("1"), Side::Bid, 50);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price, dec("100"));
        assert_eq!(rows[0].size, dec("3"));
        assert_eq!(rows[1].price, dec("99"));
        assert_eq!(rows[1].size, dec("5"));
    }

    #[test]
    fn test_ask_merge_at_tenth_step() {
        let levels = vec![level("100.01", "1"), level("100.05", "2")];

        let rows = aggregate_side(levels.into_iter(), dec("10"), Side::Ask, 50);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, dec("100.1"));
        assert_eq!(rows[0].size, dec("3"));
    }

    #[test]
    fn test_empty_side_yields_empty() {
        let rows = aggregate_side(std::iter::empty(), dec("1"), Side::Bid, 50);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_row_bound_enforced() {
        let levels: Vec<RawLevel> = (1..=20)
            .map(|i| level(&format!("{}.0", 200 - i), "1"))
            .collect();

        let rows = aggregate_side(levels.into_iter(), dec("1"), Side::Bid, 5);
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_levels_absorbed_into_last_open_row() {
        // Third and fourth raw levels bucket into row 2; the bound of 2
        // rows still absorbs them because the row is not yet closed.
        let levels = vec![
            level("101.5", "1"),
            level("100.9", "1"),
            level("100.5", "2"),
            level("100.1", "4"),
            level("99.9", "8"), // opens row 3, dropped
        ];

        let rows = aggregate_side(levels.into_iter(), dec("1"), Side::Bid, 2);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].price, dec("101"));
        assert_eq!(rows[0].size, dec("1"));
        assert_eq!(rows[1].price, dec("100"));
        assert_eq!(rows[1].size, dec("7"));
    }

    #[test]
    fn test_bids_descend_asks_ascend() {
        let bid_levels = vec![level("105", "1"), level("95", "1"), level("85", "1")];
        let ask_levels = vec![level("110", "1"), level("120", "1"), level("130", "1")];

        let bids = aggregate_side(bid_levels.into_iter(), dec("0.1"), Side::Bid, 50);
        let asks = aggregate_side(ask_levels.into_iter(), dec("0.1"), Side::Ask, 50);

        for pair in bids.windows(2) {
            assert!(pair[0].price > pair[1].price);
        }
        for pair in asks.windows(2) {
            assert!(pair[0].price < pair[1].price);
        }
    }

    #[test]
    fn test_total_left_for_normalizer() {
        let rows = aggregate_side(
            vec![level("100", "1")].into_iter(),
            dec("1"),
            Side::Bid,
            50,
        );
        assert_eq!(rows[0].total, Decimal::ZERO);
    }
}
