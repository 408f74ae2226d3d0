//! Market data seeding for the ThriftPulse dashboard.
//!
//! Writes two literal datasets, trending market signals and thrift store
//! locations, into the dashboard's tables. Each signal's heat score gets a
//! small random downward jitter before it is written.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use market_seed::prelude::*;
//!
//! let config = SeedConfig::from_env()?;
//! let report = Seeder::from_config(&config)
//!     .await?
//!     .run(&mut rand::thread_rng())
//!     .await?;
//! ```

pub mod config;
pub mod datasets;
pub mod db;
pub mod jitter;
pub mod records;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{Backend, ConfigError, SeedConfig};
    pub use crate::datasets::{market_signals, stores};
    pub use crate::db::{
        PgWriter, RestWriter, SeedError, SeedPhase, SeedReport, Seeder, TableWriter,
        UpsertRequest, WriteError, open_writer,
    };
    pub use crate::records::{MarketSignal, Record, Row, Store};
}
