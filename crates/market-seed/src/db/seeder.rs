//! Database seeding utilities.

use std::fmt;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use super::{TableWriter, UpsertRequest, WriteError, open_writer};
use crate::config::{ConfigError, SeedConfig};
use crate::datasets;
use crate::jitter::{DEFAULT_MAX_JITTER, jitter_all};
use crate::records::{MarketSignal, Record, Store};

/// Stage of a seeding run. Signals are written in full before stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPhase {
    SeedingSignals,
    SeedingStores,
}

impl fmt::Display for SeedPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedPhase::SeedingSignals => f.write_str("seeding signals"),
            SeedPhase::SeedingStores => f.write_str("seeding stores"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Upsert of {label:?} into {table} failed while {phase}: {source}")]
    Persistence {
        phase: SeedPhase,
        table: &'static str,
        label: String,
        #[source]
        source: WriteError,
    },
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct SeedReport {
    /// Signals as written, after jitter.
    pub signals: Vec<MarketSignal>,
    /// Number of store rows upserted.
    pub stores: usize,
}

/// Writes the seed datasets one record at a time.
///
/// Any failed upsert aborts the run. Rows already written stay written.
pub struct Seeder {
    writer: Box<dyn TableWriter>,
    max_jitter: u8,
}

impl Seeder {
    /// Creates a new seeder writing through `writer`.
    pub fn new(writer: impl TableWriter + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }

    /// Opens the configured writer. The jitter bound stays at its default.
    pub async fn from_config(config: &SeedConfig) -> Result<Self, SeedError> {
        let writer = open_writer(&config.backend).await?;
        Ok(Self::new(writer))
    }

    /// Sets the inclusive upper bound of the heat score jitter.
    pub fn with_max_jitter(mut self, max: u8) -> Self {
        self.max_jitter = max;
        self
    }

    /// Seeds both literal datasets: all signals, then all stores.
    pub async fn run(&self, rng: &mut impl Rng) -> Result<SeedReport, SeedError> {
        let signals = self.seed_signals(&datasets::market_signals(), rng).await?;
        let stores = self.seed_stores(&datasets::stores()).await?;
        Ok(SeedReport { signals, stores })
    }

    /// Jitters each signal's heat score and upserts it on `trend_name`.
    ///
    /// Returns the signals as written.
    pub async fn seed_signals(
        &self,
        signals: &[MarketSignal],
        rng: &mut impl Rng,
    ) -> Result<Vec<MarketSignal>, SeedError> {
        info!("Seeding {} market signals...", signals.len());

        let jittered = jitter_all(signals, self.max_jitter, rng);
        for signal in &jittered {
            self.upsert(SeedPhase::SeedingSignals, signal).await?;
            debug!("  {} -> heat {}", signal.trend_name, signal.heat_score);
        }

        info!("Seeded {} market signals", jittered.len());
        Ok(jittered)
    }

    /// Upserts each store unchanged, declaring `id` as the conflict key.
    pub async fn seed_stores(&self, stores: &[Store]) -> Result<usize, SeedError> {
        info!("Seeding {} stores...", stores.len());

        for store in stores {
            self.upsert(SeedPhase::SeedingStores, store).await?;
            debug!("  {} ({})", store.name, store.zip_code);
        }

        info!("Seeded {} stores", stores.len());
        Ok(stores.len())
    }

    async fn upsert<R: Record>(&self, phase: SeedPhase, record: &R) -> Result<(), SeedError> {
        let persistence = |source: WriteError| SeedError::Persistence {
            phase,
            table: R::TABLE,
            label: record.label().to_string(),
            source,
        };

        let request = UpsertRequest::for_record(record).map_err(|e| persistence(e.into()))?;
        self.writer.upsert(&request).await.map_err(persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryWriter;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test]
    async fn test_seed_signals_one_upsert_each() {
        let writer = MemoryWriter::new();
        let seeder = Seeder::new(writer.clone());
        let mut rng = StdRng::seed_from_u64(42);
        let signals = datasets::market_signals();

        let written = seeder.seed_signals(&signals, &mut rng).await.unwrap();

        let upserts = writer.upserts();
        assert_eq!(upserts.len(), 15);
        assert!(upserts.iter().all(|u| u.table == "market_signals"));
        assert!(upserts.iter().all(|u| u.conflict_key == "trend_name"));

        // Declaration order is preserved.
        let labels: Vec<_> = upserts.iter().map(|u| u.label.as_str()).collect();
        let names: Vec<_> = signals.iter().map(|s| s.trend_name.as_str()).collect();
        assert_eq!(labels, names);

        for (declared, stored) in signals.iter().zip(&written) {
            let low = declared.heat_score - 5;
            assert!((low..=declared.heat_score).contains(&stored.heat_score));
        }
    }

    #[tokio::test]
    async fn test_seed_stores_passes_through() {
        let writer = MemoryWriter::new();
        let seeder = Seeder::new(writer.clone());
        let stores = datasets::stores();

        assert_eq!(seeder.seed_stores(&stores).await.unwrap(), 6);

        let rows = writer.rows("stores");
        assert_eq!(rows.len(), 6);
        for (store, row) in stores.iter().zip(&rows) {
            assert_eq!(row["name"], store.name.as_str());
            assert_eq!(row["power_rank"], store.power_rank);
        }
        assert!(writer.upserts().iter().all(|u| u.conflict_key == "id"));
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_signals() {
        let writer = MemoryWriter::new().fail_at("market_signals", 3);
        let seeder = Seeder::new(writer.clone());
        let mut rng = rand::thread_rng();

        let err = seeder.run(&mut rng).await.unwrap_err();

        match err {
            SeedError::Persistence {
                phase, table, label, ..
            } => {
                assert_eq!(phase, SeedPhase::SeedingSignals);
                assert_eq!(table, "market_signals");
                assert_eq!(label, "Tabi Boots");
            }
            other => panic!("expected persistence error, got {other}"),
        }

        // Earlier rows are kept, nothing later was attempted.
        assert_eq!(writer.rows("market_signals").len(), 3);
        assert!(writer.rows("stores").is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_reports_phase() {
        let writer = MemoryWriter::new().fail_at("stores", 0);
        let seeder = Seeder::new(writer.clone());
        let mut rng = rand::thread_rng();

        let err = seeder.run(&mut rng).await.unwrap_err();

        assert!(matches!(
            err,
            SeedError::Persistence {
                phase: SeedPhase::SeedingStores,
                ..
            }
        ));
        assert_eq!(writer.rows("market_signals").len(), 15);
        assert!(err.to_string().contains("Goodwill - Marietta Pkwy"));
    }

    #[tokio::test]
    async fn test_from_config_rejects_bad_key() {
        let config = SeedConfig {
            backend: crate::config::Backend::Rest {
                url: reqwest::Url::parse("https://abc.supabase.co").unwrap(),
                service_key: "bad\nkey".to_string(),
            },
        };

        let err = Seeder::from_config(&config).await.err().unwrap();
        assert!(matches!(err, SeedError::Config(ConfigError::InvalidKey)));
    }

    #[tokio::test]
    async fn test_zero_jitter_writes_declared_scores() {
        let writer = MemoryWriter::new();
        let seeder = Seeder::new(writer.clone()).with_max_jitter(0);
        let mut rng = rand::thread_rng();

        let report = seeder.run(&mut rng).await.unwrap();

        assert_eq!(report.signals, datasets::market_signals());
        assert_eq!(report.stores, 6);
    }
}
