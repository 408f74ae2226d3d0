//! Database integration for seeding.
//!
//! The [`Seeder`] writes records through a [`TableWriter`]. Two writers are
//! provided: [`RestWriter`] for the hosted REST endpoint and [`PgWriter`] for a
//! direct Postgres connection. `MemoryWriter` is an in-process stand-in used by
//! the test suites and is not part of the public API.

mod memory;
mod postgres;
mod rest;
mod seeder;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::{Backend, ConfigError};
use crate::records::{Record, Row};

#[doc(hidden)]
pub use memory::MemoryWriter;
pub use postgres::PgWriter;
pub use rest::RestWriter;
pub use seeder::{SeedError, SeedPhase, SeedReport, Seeder};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

/// A single-row upsert against one table.
#[derive(Debug, Clone)]
pub struct UpsertRequest {
    pub table: &'static str,
    pub conflict_key: &'static str,
    /// Identity of the record, for logs and errors.
    pub label: String,
    pub row: Row,
}

impl UpsertRequest {
    pub fn for_record<R: Record>(record: &R) -> Result<Self, serde_json::Error> {
        Ok(Self {
            table: R::TABLE,
            conflict_key: R::CONFLICT_KEY,
            label: record.label().to_string(),
            row: record.to_row()?,
        })
    }

    /// The row's value for the conflict key, if it carries one.
    pub fn conflict_value(&self) -> Option<&Value> {
        self.row
            .get(self.conflict_key)
            .filter(|value| !value.is_null())
    }
}

/// Table-oriented write interface of the backing database.
#[async_trait]
pub trait TableWriter: Send + Sync {
    /// Overwrites the row matching the conflict key, or inserts a new one.
    async fn upsert(&self, request: &UpsertRequest) -> Result<(), WriteError>;

    /// Counts rows of `table` whose `column` equals `value`.
    async fn count_where(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<u64, WriteError>;
}

#[async_trait]
impl<W: TableWriter + ?Sized> TableWriter for Box<W> {
    async fn upsert(&self, request: &UpsertRequest) -> Result<(), WriteError> {
        (**self).upsert(request).await
    }

    async fn count_where(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<u64, WriteError> {
        (**self).count_where(table, column, value).await
    }
}

/// Opens the writer selected by the configuration.
pub async fn open_writer(backend: &Backend) -> Result<Box<dyn TableWriter>, ConfigError> {
    let writer: Box<dyn TableWriter> = match backend {
        Backend::Rest { url, service_key } => Box::new(RestWriter::new(url.clone(), service_key)?),
        Backend::Postgres { database_url } => Box::new(PgWriter::connect(database_url).await?),
    };
    Ok(writer)
}
