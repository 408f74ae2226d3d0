//! Seeded record types and their table bindings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat column-name to value mapping, as written to a table.
pub type Row = Map<String, Value>;

/// A record that can be upserted into a named table.
pub trait Record: Serialize {
    /// Target table name.
    const TABLE: &'static str;
    /// Column the upsert matches existing rows on.
    const CONFLICT_KEY: &'static str;

    /// Human-readable identity used in logs and errors.
    fn label(&self) -> &str;

    /// Serializes the record into a row.
    fn to_row(&self) -> Result<Row, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "record for {} serialized to a non-object: {other}",
                Self::TABLE
            ))),
        }
    }
}

/// A trending item tracked by the dashboard's scout view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSignal {
    pub trend_name: String,
    /// "Adjacency" or "Brand". Not enforced.
    pub track: String,
    pub hook_brand: String,
    /// Popularity, 0-100 nominally. Jitter may push low scores below zero.
    pub heat_score: i32,
    /// Target resale price in whole dollars.
    pub exit_price: i32,
}

impl MarketSignal {
    pub fn new(
        trend_name: &str,
        track: &str,
        hook_brand: &str,
        heat_score: i32,
        exit_price: i32,
    ) -> Self {
        Self {
            trend_name: trend_name.to_string(),
            track: track.to_string(),
            hook_brand: hook_brand.to_string(),
            heat_score,
            exit_price,
        }
    }
}

impl Record for MarketSignal {
    const TABLE: &'static str = "market_signals";
    const CONFLICT_KEY: &'static str = "trend_name";

    fn label(&self) -> &str {
        &self.trend_name
    }
}

/// A physical thrift location ranked for sourcing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    /// Free-form; some entries carry a placeholder.
    pub address: String,
    pub zip_code: String,
    /// "High-Yield", "Volume" or "Curated". Not enforced.
    pub income_tier: String,
    pub power_rank: i32,
}

impl Store {
    pub fn new(
        name: &str,
        address: &str,
        zip_code: &str,
        income_tier: &str,
        power_rank: i32,
    ) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            zip_code: zip_code.to_string(),
            income_tier: income_tier.to_string(),
            power_rank,
        }
    }
}

impl Record for Store {
    const TABLE: &'static str = "stores";
    // Stores never carry an `id`, so this key cannot match an existing row.
    const CONFLICT_KEY: &'static str = "id";

    fn label(&self) -> &str {
        &self.name
    }
}
