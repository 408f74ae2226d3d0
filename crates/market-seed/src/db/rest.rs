//! Writer for the hosted REST interface.
//!
//! Rows are posted to `/rest/v1/{table}` with `on_conflict` naming the match
//! column and `Prefer: resolution=merge-duplicates`, which the server turns
//! into `INSERT ... ON CONFLICT DO UPDATE`.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use serde_json::Value;
use tracing::debug;

use super::{TableWriter, UpsertRequest, WriteError};
use crate::config::ConfigError;

const REST_PREFIX: &str = "rest/v1/";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";
const COUNT_PREFER: &str = "count=exact";

/// REST writer authenticated with a service-role key.
pub struct RestWriter {
    client: Client,
    base_url: Url,
}

impl RestWriter {
    /// Builds the HTTP client. Fails if the key is not a valid header value.
    pub fn new(base_url: Url, service_key: &str) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(service_key).map_err(|_| ConfigError::InvalidKey)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {service_key}"))
            .map_err(|_| ConfigError::InvalidKey)?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, base_url })
    }

    fn table_url(&self, table: &str) -> Result<Url, WriteError> {
        table_url(&self.base_url, table)
    }
}

/// Resolves `{base}/rest/v1/{table}`, keeping any path prefix on the base.
pub(crate) fn table_url(base: &Url, table: &str) -> Result<Url, WriteError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(REST_PREFIX)
        .and_then(|url| url.join(table))
        .map_err(|e| WriteError::InvalidRow(format!("bad table URL for {table}: {e}")))
}

/// Extracts the total from a `Content-Range` header such as `0-4/5` or `*/0`.
pub(crate) fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// Renders a filter value for the `eq.` operator.
/// Equality filter on one column; null compares with `is`.
fn filter_value(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{s}"),
        other => format!("eq.{other}"),
    }
}

async fn check(resp: Response) -> Result<Response, WriteError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(WriteError::Rejected { status, body })
}

#[async_trait]
impl TableWriter for RestWriter {
    async fn upsert(&self, request: &UpsertRequest) -> Result<(), WriteError> {
        let url = self.table_url(request.table)?;
        debug!("POST {url} on_conflict={}", request.conflict_key);

        let resp = self
            .client
            .post(url)
            .query(&[("on_conflict", request.conflict_key)])
            .header("Prefer", UPSERT_PREFER)
            .json(&request.row)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn count_where(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<u64, WriteError> {
        let url = self.table_url(table)?;
        let filter = filter_value(value);

        let resp = self
            .client
            .head(url)
            .query(&[(column, filter.as_str()), ("select", column)])
            .header("Prefer", COUNT_PREFER)
            .send()
            .await?;
        let resp = check(resp).await?;

        resp.headers()
            .get("content-range")
            .and_then(|h| h.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| WriteError::Rejected {
                status: resp.status().as_u16(),
                body: format!("missing or malformed Content-Range counting {table}"),
            })
    }
}
