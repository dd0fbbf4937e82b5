//! External record store adapter (Notion API shape).
//!
//! The engine only sees the `RecordStore` port; which database properties
//! the fields land under comes from configuration.

use crate::config::toml_config::StoreConfig;
use crate::domain::model::RecordFields;
use crate::domain::ports::RecordStore;
use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};

const NOTION_VERSION: &str = "2022-06-28";

pub struct NotionStore {
    client: Client,
    config: StoreConfig,
    token: String,
    database_id: String,
}

impl NotionStore {
    /// Builds the store when both secrets are present and resolved;
    /// otherwise the integration stays disabled.
    pub fn from_config(config: &StoreConfig) -> Option<Self> {
        let (token, database_id) = config.credentials()?;
        Some(Self {
            client: Client::new(),
            token: token.to_string(),
            database_id: normalize_database_id(database_id),
            config: config.clone(),
        })
    }

    fn build_properties(&self, fields: &RecordFields) -> Value {
        let mut props = Map::new();
        props.insert(
            self.config.url_property.clone(),
            json!({ "url": fields.url }),
        );
        props.insert(
            self.config.missing_count_property.clone(),
            json!({ "number": fields.missing_count }),
        );
        props.insert(
            self.config.missing_volumes_property.clone(),
            rich_text(&fields.missing_volumes),
        );
        props.insert(
            self.config.owned_property.clone(),
            rich_text(&fields.owned_volumes),
        );
        props.insert(
            self.config.existing_property.clone(),
            rich_text(&fields.existing_volumes),
        );
        props.insert(
            self.config.checked_at_property.clone(),
            rich_text(&fields.checked_at),
        );
        props.insert(
            self.config.status_property.clone(),
            rich_text(&fields.status),
        );
        Value::Object(props)
    }
}

#[async_trait]
impl RecordStore for NotionStore {
    async fn find_record_by_url(&self, url: &str) -> Result<String> {
        let endpoint = format!(
            "{}/v1/databases/{}/query",
            self.config.api_base_url, self.database_id
        );
        let payload = json!({
            "filter": {
                "property": self.config.url_property,
                "url": { "equals": url }
            }
        });

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TrackerError::StoreError {
                operation: "query",
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: Value = response.json().await?;
        body["results"]
            .as_array()
            .and_then(|results| results.first())
            .and_then(|record| record["id"].as_str())
            .map(str::to_string)
            .ok_or_else(|| TrackerError::RecordNotFound {
                url: url.to_string(),
            })
    }

    async fn update_record(&self, record_id: &str, fields: &RecordFields) -> Result<()> {
        let endpoint = format!("{}/v1/pages/{}", self.config.api_base_url, record_id);
        let payload = json!({ "properties": self.build_properties(fields) });

        let response = self
            .client
            .patch(&endpoint)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TrackerError::StoreError {
                operation: "update",
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}

fn rich_text(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

/// Strips dashes from a database id; a bare 32-char id is re-hyphenated
/// into the 8-4-4-4-12 UUID layout the API expects.
pub fn normalize_database_id(raw: &str) -> String {
    let stripped: String = raw.trim().chars().filter(|c| *c != '-').collect();
    if stripped.len() == 32 {
        format!(
            "{}-{}-{}-{}-{}",
            &stripped[0..8],
            &stripped[8..12],
            &stripped[12..16],
            &stripped[16..20],
            &stripped[20..32]
        )
    } else {
        stripped
    }
}
