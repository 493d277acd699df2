//! Asset classification.

use serde::{Deserialize, Serialize};

const CRYPTO_MARKERS: [&str; 7] = ["-USD", "-USDT", "-BUSD", "BTC", "ETH", "USDT", "USDC"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Stock,
    Crypto,
}

impl AssetType {
    /// Classify a ticker by its spelling. Anything without a crypto marker is a stock.
    pub fn detect(symbol: &str) -> Self {
        let upper = symbol.to_uppercase();
        if CRYPTO_MARKERS.iter().any(|m| upper.contains(m)) {
            AssetType::Crypto
        } else {
            AssetType::Stock
        }
    }

    /// Only stocks accrue dividends in the simulator.
    pub fn pays_dividends(&self) -> bool {
        matches!(self, AssetType::Stock)
    }
}
