//! Writer for a direct Postgres connection.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::{PgPool, QueryBuilder};

use super::{TableWriter, UpsertRequest, WriteError};
use crate::config::ConfigError;

/// Postgres writer issuing `INSERT ... ON CONFLICT DO UPDATE` per row.
pub struct PgWriter {
    pool: PgPool,
}

impl PgWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a single-connection pool; the seeder never writes concurrently.
    pub async fn connect(database_url: &str) -> Result<Self, ConfigError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

/// Quotes an SQL identifier, doubling embedded quotes.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn push_value(
    builder: &mut QueryBuilder<'_, Postgres>,
    column: &str,
    value: &Value,
) -> Result<(), WriteError> {
    match value {
        Value::String(s) => {
            builder.push_bind(s.clone());
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                builder.push_bind(i);
            }
            None => {
                return Err(WriteError::InvalidRow(format!(
                    "column {column}: only integer numbers are supported, got {n}"
                )));
            }
        },
        Value::Bool(b) => {
            builder.push_bind(*b);
        }
        Value::Null => {
            builder.push("NULL");
        }
        other => {
            return Err(WriteError::InvalidRow(format!(
                "column {column}: unsupported value {other}"
            )));
        }
    }
    Ok(())
}

/// Builds the upsert statement for one row.
pub(crate) fn build_upsert(
    request: &UpsertRequest,
) -> Result<QueryBuilder<'static, Postgres>, WriteError> {
    if request.row.is_empty() {
        return Err(WriteError::InvalidRow(format!("empty row for {}", request.label)));
    }

    let mut builder = QueryBuilder::new("INSERT INTO ");
    builder.push(quote_ident(request.table));
    builder.push(" (");
    let mut columns = builder.separated(", ");
    for column in request.row.keys() {
        columns.push(quote_ident(column));
    }
    builder.push(") VALUES (");
    for (i, (column, value)) in request.row.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, column, value)?;
    }
    builder.push(") ON CONFLICT (");
    builder.push(quote_ident(request.conflict_key));

    let updates: Vec<&String> = request
        .row
        .keys()
        .filter(|column| column.as_str() != request.conflict_key)
        .collect();
    if updates.is_empty() {
        builder.push(") DO NOTHING");
    } else {
        builder.push(") DO UPDATE SET ");
        let mut sets = builder.separated(", ");
        for column in updates {
            let quoted = quote_ident(column);
            sets.push(format!("{quoted} = EXCLUDED.{quoted}"));
        }
    }

    Ok(builder)
}

/// Builds the row count for `column = value`. A null value matches with `IS NULL`.
pub(crate) fn build_count(
    table: &str,
    column: &str,
    value: &Value,
) -> Result<QueryBuilder<'static, Postgres>, WriteError> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
    builder.push(quote_ident(table));
    builder.push(" WHERE ");
    builder.push(quote_ident(column));
    if value.is_null() {
        builder.push(" IS NULL");
    } else {
        builder.push(" = ");
        push_value(&mut builder, column, value)?;
    }
    Ok(builder)
}

#[async_trait]
impl TableWriter for PgWriter {
    async fn upsert(&self, request: &UpsertRequest) -> Result<(), WriteError> {
        let mut builder = build_upsert(request)?;
        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn count_where(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<u64, WriteError> {
        let mut builder = build_count(table, column, value)?;
        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{MarketSignal, Store};

    #[test]
    fn test_signal_upsert_sql() {
        let signal = MarketSignal::new("Samba OG", "Brand", "Adidas", 82, 110);
        let request = UpsertRequest::for_record(&signal).unwrap();
        let builder = build_upsert(&request).unwrap();
        let sql = builder.sql();

        assert!(sql.starts_with("INSERT INTO \"market_signals\" ("));
        assert!(sql.contains("VALUES ($1, $2, $3, $4, $5)"));
        assert!(sql.contains("ON CONFLICT (\"trend_name\") DO UPDATE SET"));
        assert!(sql.contains("\"heat_score\" = EXCLUDED.\"heat_score\""));
        assert!(!sql.contains("\"trend_name\" = EXCLUDED"));
    }

    #[test]
    fn test_store_upsert_declares_id() {
        let store = Store::new("Buckhead Thrift", "Piedmont Rd", "30305", "High-Yield", 95);
        let request = UpsertRequest::for_record(&store).unwrap();
        let builder = build_upsert(&request).unwrap();
        let sql = builder.sql();

        // `id` is the declared key but is never among the inserted columns.
        assert!(sql.contains("ON CONFLICT (\"id\")"));
        assert!(!sql.contains("\"id\","));
        assert!(sql.contains("\"zip_code\" = EXCLUDED.\"zip_code\""));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("stores"), "\"stores\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_rejects_fractional_numbers() {
        let mut request =
            UpsertRequest::for_record(&MarketSignal::new("x", "Brand", "y", 1, 1)).unwrap();
        request.row.insert("exit_price".to_string(), Value::from(9.5));
        assert!(matches!(build_upsert(&request), Err(WriteError::InvalidRow(_))));
    }

    #[test]
    fn test_count_binds_value() {
        let builder = build_count("stores", "zip_code", &Value::from("30064")).unwrap();
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM \"stores\" WHERE \"zip_code\" = $1"
        );
    }

    #[test]
    fn test_count_null_uses_is_null() {
        let builder = build_count("stores", "address", &Value::Null).unwrap();
        let sql = builder.sql();

        assert_eq!(sql, "SELECT COUNT(*) FROM \"stores\" WHERE \"address\" IS NULL");
        assert!(!sql.contains("= NULL"));
    }
}
