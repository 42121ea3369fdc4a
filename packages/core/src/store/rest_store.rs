//! REST implementation of the remote table gateway.
//!
//! Speaks the hosted backend's table protocol: one resource path per table,
//! filter/order/range expressed as query parameters, `apikey` and bearer
//! headers for authorization, JSON request/response bodies.
//!
//! Requests are single-shot; there is no retry layer. Non-success responses
//! surface the backend's body text unmodified as
//! [`StoreError::Backend`](crate::store::StoreError).

use crate::config::RemoteConfig;
use crate::store::table_store::{FilterOp, ListQuery, TableStore};
use crate::store::StoreError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

/// Remote table gateway over the hosted backend's REST protocol.
pub struct RestStore {
    client: Client,
    config: RemoteConfig,
}

impl RestStore {
    /// Create a gateway for the given backend.
    pub fn new(config: RemoteConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            table
        )
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("apikey", &self.config.api_key);
        match &self.config.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder.bearer_auth(&self.config.api_key),
        }
    }

    /// Encode a list query as protocol query parameters
    /// (`col=eq.v`, `order=col.asc`, `limit`/`offset`).
    fn query_params(query: &ListQuery) -> Vec<(String, String)> {
        let mut params = Vec::new();

        for filter in &query.filters {
            let rendered = match filter.op {
                FilterOp::Eq => format!("eq.{}", render_value(&filter.value)),
                FilterOp::Neq => format!("neq.{}", render_value(&filter.value)),
                FilterOp::IsNull => "is.null".to_string(),
            };
            params.push((filter.column.clone(), rendered));
        }

        if let Some(order) = &query.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }

        if let Some(range) = query.range {
            params.push(("offset".to_string(), range.offset.to_string()));
            params.push(("limit".to_string(), range.limit.to_string()));
        }

        params
    }

    /// Turn a non-success response into a backend error carrying the body
    /// text exactly as received.
    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::backend(status.as_u16(), message))
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl TableStore for RestStore {
    async fn list(&self, table: &str, query: ListQuery) -> Result<Vec<Value>, StoreError> {
        let params = Self::query_params(&query);
        let response = self
            .authorize(self.client.get(self.table_url(table)))
            .query(&params)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn get(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let query = ListQuery::new()
            .filter(crate::store::Filter::eq("id", id))
            .range(0, 1);
        let mut rows = self.list(table, query).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        let response = self
            .authorize(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let response = Self::check(response).await?;

        // The backend answers inserts with an array of stored rows.
        let mut rows: Vec<Value> = response.json().await?;
        if rows.is_empty() {
            return Err(StoreError::decode("insert returned no rows"));
        }
        Ok(rows.remove(0))
    }

    async fn update(&self, table: &str, id: &str, partial: Value) -> Result<(), StoreError> {
        let response = self
            .authorize(self.client.patch(self.table_url(table)))
            .query(&[("id", format!("eq.{id}"))])
            .json(&partial)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .authorize(self.client.delete(self.table_url(table)))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
