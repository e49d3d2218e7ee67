//! Render-ready depth snapshots
//!
//! A snapshot is the immutable output of one recompute: both aggregated
//! sides, the bucketed spread, and the step that produced them. Consumers
//! replace the previous snapshot wholesale; nothing is patched in place.
//! Snapshots carry a monotonic publish version and a SHA-256 checksum over
//! their content.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use types::ids::MarketId;

/// One rendered row: a price bucket, the summed size inside it, and the
/// shared normalization denominator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRow {
    /// Bucketed price.
    pub price: Decimal,
    /// Sum of all raw sizes whose bucketed price equals `price`.
    pub size: Decimal,
    /// Shared denominator, identical in every row of a snapshot. Used only
    /// for relative-bar rendering, never for spread or price math.
    pub total: Decimal,
}

impl AggregatedRow {
    /// Relative bar width for this row; in (0, 1] once normalized.
    pub fn bar_width(&self) -> Decimal {
        if self.total <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            self.size / self.total
        }
    }
}

/// A full recomputed view of both sides of the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    /// Monotonic publish version.
    pub version: u64,
    /// Trading pair symbol.
    pub symbol: MarketId,
    /// Bid rows in descending price order (best bid first).
    pub bids: Vec<AggregatedRow>,
    /// Ask rows in display order: descending price, best ask last.
    pub asks: Vec<AggregatedRow>,
    /// Bucketed best-ask minus bucketed best-bid; None when either side
    /// has no rows.
    pub spread: Option<Decimal>,
    /// Aggregation step the rows were bucketed with.
    pub step: Decimal,
    /// SHA-256 checksum over rows, spread, and step.
    pub checksum: String,
}

impl DepthSnapshot {
    /// Best bid row (display order keeps it first).
    pub fn best_bid_row(&self) -> Option<&AggregatedRow> {
        self.bids.first()
    }

    /// Best ask row (display order keeps it last, adjacent to the spread).
    pub fn best_ask_row(&self) -> Option<&AggregatedRow> {
        self.asks.last()
    }

    /// Whether both sides are empty.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Compute a SHA-256 checksum over rows, spread, and step.
///
/// Row order matters: the inputs are already deterministically sorted.
pub fn compute_checksum(
    bids: &[AggregatedRow],
    asks: &[AggregatedRow],
    spread: Option<Decimal>,
    step: Decimal,
) -> String {
    let mut hasher = Sha256::new();

    for row in bids {
        hash_row(&mut hasher, row);
    }
    hasher.update(b"---");

    for row in asks {
        hash_row(&mut hasher, row);
    }
    hasher.update(b"---");

    match spread {
        Some(s) => hasher.update(s.to_string().as_bytes()),
        None => hasher.update(b"none"),
    }
    hasher.update(b"---");
    hasher.update(step.to_string().as_bytes());

    format!("{:x}", hasher.finalize())
}

fn hash_row(hasher: &mut Sha256, row: &AggregatedRow) {
    hasher.update(row.price.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(row.size.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(row.total.to_string().as_bytes());
    hasher.update(b"|");
}

/// Verify that a snapshot's checksum matches its content.
pub fn verify_snapshot_integrity(snapshot: &DepthSnapshot) -> bool {
    let expected = compute_checksum(
        &snapshot.bids,
        &snapshot.asks,
        snapshot.spread,
        snapshot.step,
    );
    snapshot.checksum == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn row(price: &str, size: &str, total: &str) -> AggregatedRow {
        AggregatedRow {
            price: dec(price),
            size: dec(size),
            total: dec(total),
        }
    }

    fn sample_snapshot() -> DepthSnapshot {
        let bids = vec![row("100", "3", "8"), row("99", "5", "8")];
        let asks = vec![row("102", "2", "8"), row("101", "1", "8")];
        let spread = Some(dec("1"));
        let step = dec("1");
        let checksum = compute_checksum(&bids, &asks, spread, step);

        DepthSnapshot {
            version: 1,
            symbol: MarketId::new("BTC/USD"),
            bids,
            asks,
            spread,
            step,
            checksum,
        }
    }

    #[test]
    fn test_bar_width() {
        let r = row("100", "2", "8");
        assert_eq!(r.bar_width(), dec("0.25"));
    }

    #[test]
    fn test_bar_width_unnormalized_is_zero() {
        let r = row("100", "2", "0");
        assert_eq!(r.bar_width(), Decimal::ZERO);
    }

    #[test]
    fn test_best_rows_respect_display_order() {
        let snap = sample_snapshot();
        assert_eq!(snap.best_bid_row().unwrap().price, dec("100"));
        // Asks are stored descending, best ask last
        assert_eq!(snap.best_ask_row().unwrap().price, dec("101"));
    }

    #[test]
    fn test_snapshot_integrity() {
        let snap = sample_snapshot();
        assert!(verify_snapshot_integrity(&snap));

        let mut tampered = snap.clone();
        tampered.bids[0].size = dec("999");
        assert!(!verify_snapshot_integrity(&tampered));
    }

    #[test]
    fn test_checksum_deterministic() {
        let a = sample_snapshot();
        let b = sample_snapshot();
        assert_eq!(a.checksum, b.checksum);
    }

    #[test]
    fn test_checksum_covers_spread_and_step() {
        let snap = sample_snapshot();

        let no_spread = compute_checksum(&snap.bids, &snap.asks, None, snap.step);
        assert_ne!(snap.checksum, no_spread);

        let other_step = compute_checksum(&snap.bids, &snap.asks, snap.spread, dec("10"));
        assert_ne!(snap.checksum, other_step);
    }

    #[test]
    fn test_snapshot_serialization_roundtrip() {
        let snap = sample_snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let deserialized: DepthSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, deserialized);
    }

    #[test]
    fn test_empty_snapshot() {
        let checksum = compute_checksum(&[], &[], None, dec("1"));
        let snap = DepthSnapshot {
            version: 1,
            symbol: MarketId::new("BTC/USD"),
            bids: vec![],
            asks: vec![],
            spread: None,
            step: dec("1"),
            checksum,
        };
        assert!(snap.is_empty());
        assert!(snap.best_bid_row().is_none());
        assert!(snap.best_ask_row().is_none());
        assert!(verify_snapshot_integrity(&snap));
    }
}
