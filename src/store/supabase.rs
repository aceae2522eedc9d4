use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::interface::{StoreError, Table, TranslationStore};
use crate::config::{StoreConfig, TableConfig};

/// Exact-match lookups against the hosted Postgres REST endpoint
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    service_key: String,
    words: TableConfig,
    phrases: TableConfig,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            words: config.words.clone(),
            phrases: config.phrases.clone(),
        })
    }

    fn table_config(&self, table: Table) -> &TableConfig {
        match table {
            Table::Words => &self.words,
            Table::Phrases => &self.phrases,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

/// An `eq.` filter takes everything after the operator literally
fn filter_value(key: &str) -> String {
    format!("eq.{}", key)
}

/// Pull the target column out of the first row, treating null or blank as a miss
fn first_target(rows: &Value, column: &str) -> Result<Option<String>, StoreError> {
    let rows = rows
        .as_array()
        .ok_or_else(|| StoreError::Decode(format!("expected a JSON array, got {}", rows)))?;

    Ok(rows
        .first()
        .and_then(|row| row.get(column))
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string()))
}

#[async_trait]
impl TranslationStore for SupabaseStore {
    async fn lookup_exact(&self, table: Table, key: &str) -> Result<Option<String>, StoreError> {
        let cfg = self.table_config(table);
        let url = self.table_url(&cfg.table);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(&[
                ("select", cfg.target_column.clone()),
                (cfg.source_column.as_str(), filter_value(key)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Value = response.json().await?;
        let found = first_target(&rows, &cfg.target_column)?;
        debug!("Lookup {}:{} -> {:?}", table.as_str(), key, found);
        Ok(found)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let url = format!("{}/rest/v1/", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query, RawQuery, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct SeenRequest {
        table: String,
        raw_query: Option<String>,
        params: HashMap<String, String>,
        headers: HeaderMap,
    }

    type Seen = Arc<Mutex<Vec<SeenRequest>>>;

    async fn rest_table(
        State(seen): State<Seen>,
        Path(table): Path<String>,
        RawQuery(raw_query): RawQuery,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Response {
        let filter = params
            .get("spanish_word")
            .or_else(|| params.get("spanish_phrase"))
            .cloned()
            .unwrap_or_default();
        seen.lock().unwrap().push(SeenRequest {
            table,
            raw_query,
            params,
            headers,
        });

        match filter.as_str() {
            "eq.hola" => Json(json!([{ "zapotec_word": "x" }])).into_response(),
            "eq.di\"ce" => Json(json!([{ "zapotec_word": "literal" }])).into_response(),
            "eq.buenos días" => Json(json!([{ "zapotec_phrase": "xi dxi" }])).into_response(),
            "eq.roto" => (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response(),
            _ => Json(json!([])).into_response(),
        }
    }

    /// Serve a stand-in REST endpoint on an ephemeral port and point a store at it
    async fn store_against_local_rest() -> (SupabaseStore, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/rest/v1/:table", get(rest_table))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = StoreConfig {
            url: format!("http://{}/", addr),
            service_key: "service-key".to_string(),
            ..StoreConfig::default()
        };
        (SupabaseStore::new(&config).unwrap(), seen)
    }

    #[tokio::test]
    async fn test_lookup_exact_request_and_replies() {
        let (store, seen) = store_against_local_rest().await;

        assert_eq!(
            store.lookup_exact(Table::Words, "hola").await.unwrap(),
            Some("x".to_string())
        );
        assert_eq!(store.lookup_exact(Table::Words, "nada").await.unwrap(), None);
        match store.lookup_exact(Table::Words, "roto").await {
            Err(StoreError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected a status error, got {:?}", other),
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        let first = &seen[0];
        assert_eq!(first.table, "translations");
        assert_eq!(
            first.raw_query.as_deref(),
            Some("select=zapotec_word&spanish_word=eq.hola&limit=1")
        );
        assert_eq!(first.headers.get("apikey").unwrap(), "service-key");
        assert_eq!(first.headers.get("authorization").unwrap(), "Bearer service-key");
    }

    #[tokio::test]
    async fn test_lookup_exact_phrase_table_and_literal_keys() {
        let (store, seen) = store_against_local_rest().await;

        assert_eq!(
            store.lookup_exact(Table::Phrases, "buenos días").await.unwrap(),
            Some("xi dxi".to_string())
        );
        assert_eq!(
            store.lookup_exact(Table::Words, "di\"ce").await.unwrap(),
            Some("literal".to_string())
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].table, "phrases");
        assert_eq!(
            seen[0].params.get("select").map(String::as_str),
            Some("zapotec_phrase")
        );
        assert_eq!(
            seen[1].params.get("spanish_word").map(String::as_str),
            Some("eq.di\"ce")
        );
        assert_eq!(seen[1].params.get("limit").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_filter_value_is_never_quoted() {
        assert_eq!(filter_value("hola"), "eq.hola");
        assert_eq!(filter_value("buenos días"), "eq.buenos días");
        assert_eq!(filter_value("di\"ce"), "eq.di\"ce");
        assert_eq!(filter_value("ba`du"), "eq.ba`du");
    }

    #[test]
    fn test_first_target_row_handling() {
        let rows = json!([{ "zapotec_word": "padiuxi" }]);
        assert_eq!(
            first_target(&rows, "zapotec_word").unwrap(),
            Some("padiuxi".to_string())
        );
        assert_eq!(first_target(&json!([]), "zapotec_word").unwrap(), None);
        assert_eq!(
            first_target(&json!([{ "zapotec_word": null }]), "zapotec_word").unwrap(),
            None
        );
        assert!(first_target(&json!({ "message": "nope" }), "zapotec_word").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = StoreConfig {
            url: "https://example.supabase.co/".to_string(),
            ..StoreConfig::default()
        };
        let store = SupabaseStore::new(&config).unwrap();
        assert_eq!(
            store.table_url("translations"),
            "https://example.supabase.co/rest/v1/translations"
        );
        assert_eq!(store.table_config(Table::Phrases).table, "phrases");
    }
}
