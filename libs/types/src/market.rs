//! Instrument descriptors and book sides

use serde::{Deserialize, Serialize};

use crate::ids::MarketId;

/// Side of the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy side (demand)
    Bid,
    /// Sell side (supply)
    Ask,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// A tradable instrument as the external market registry describes it.
///
/// Carries only what the depth view needs: the symbol and the display
/// precisions that drive the default aggregation granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Trading pair symbol.
    pub symbol: MarketId,
    /// Number of decimal places in displayed prices.
    pub price_precision: u32,
    /// Number of decimal places in displayed sizes.
    pub size_precision: u32,
}

impl Market {
    /// Create a market descriptor.
    pub fn new(symbol: MarketId, price_precision: u32, size_precision: u32) -> Self {
        Self {
            symbol,
            price_precision,
            size_precision,
        }
    }

    /// Base asset of the pair.
    pub fn base(&self) -> &str {
        self.symbol.split().0
    }

    /// Quote asset of the pair (the currency spreads are denominated in).
    pub fn quote(&self) -> &str {
        self.symbol.split().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Bid.opposite(), Side::Ask);
        assert_eq!(Side::Ask.opposite(), Side::Bid);
    }

    #[test]
    fn test_side_serialization() {
        assert_eq!(serde_json::to_string(&Side::Bid).unwrap(), "\"BID\"");
        assert_eq!(serde_json::to_string(&Side::Ask).unwrap(), "\"ASK\"");
    }

    #[test]
    fn test_market_assets() {
        let market = Market::new(MarketId::new("BTC/USD"), 2, 8);
        assert_eq!(market.base(), "BTC");
        assert_eq!(market.quote(), "USD");
        assert_eq!(market.price_precision, 2);
    }

    #[test]
    fn test_market_serialization_roundtrip() {
        let market = Market::new(MarketId::new("ETH/USDC"), 2, 6);
        let json = serde_json::to_string(&market).unwrap();
        let deserialized: Market = serde_json::from_str(&json).unwrap();
        assert_eq!(market, deserialized);
    }
}
