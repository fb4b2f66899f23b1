// src/index/solr.rs

//! Solr backend using the JSON update handler.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use url::Url;

use crate::error::{AppError, Result};
use crate::index::IndexGateway;
use crate::models::{IndexConfig, SearchDocument};

/// Solr core or collection reached over HTTP.
#[derive(Debug, Clone)]
pub struct SolrIndex {
    client: Client,
    update_url: Url,
}

impl SolrIndex {
    /// Create a client for the core at `config.url`.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            update_url: update_url(&config.url, config.commit)?,
        })
    }

    /// Post an update command; `id` labels failures.
    async fn post(&self, id: &str, body: &Value) -> Result<()> {
        let response = self
            .client
            .post(self.update_url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::index_write(id, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(AppError::index_write(
            id,
            format!("HTTP {}: {}", status, detail.trim()),
        ))
    }
}

#[async_trait]
impl IndexGateway for SolrIndex {
    async fn upsert(&self, document: &SearchDocument) -> Result<()> {
        log::debug!("Solr add {}", document.id);
        self.post(&document.id, &add_body(document)?).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        log::debug!("Solr delete {}", id);
        self.post(id, &delete_body(id)).await
    }
}

/// `{base}/update`, with the commit flag as a query parameter.
fn update_url(base: &str, commit: bool) -> Result<Url> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let mut url = base.join("update")?;
    url.query_pairs_mut()
        .append_pair("commit", if commit { "true" } else { "false" });
    Ok(url)
}

fn add_body(document: &SearchDocument) -> Result<Value> {
    Ok(Value::Array(vec![serde_json::to_value(document)?]))
}

fn delete_body(id: &str) -> Value {
    json!({ "delete": { "id": id } })
}
