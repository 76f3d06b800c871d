use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value, json};
use tracing::debug;

use claimsync_core::DocumentRef;
use claimsync_sync::{DocumentStore, FieldMap, FieldValue, StoreError};

use super::error_body;
use crate::config::{ConfigError, SyncConfig};

/// Firestore REST client performing merge-writes through `documents:commit`.
///
/// A merge is a single `update` write whose `updateMask` names only the
/// literal fields, plus one `REQUEST_TIME` transform per server-timestamp
/// field. Fields outside the mask are left untouched, and the document is
/// created if missing.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    database_id: String,
    access_token: Option<String>,
}

impl FirestoreClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            database_id: database_id.into(),
            access_token: None,
        }
    }

    pub fn from_config(http: reqwest::Client, config: &SyncConfig) -> Result<Self, ConfigError> {
        let client = Self::new(
            http,
            config.firestore_url.clone(),
            config.require_project_id()?,
            config.database_id.clone(),
        );
        Ok(match &config.access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database_id)
    }

    fn commit_url(&self) -> String {
        format!("{}/v1/{}/documents:commit", self.base_url, self.database_path())
    }

    fn document_name(&self, document: &DocumentRef) -> String {
        format!("{}/documents/{}", self.database_path(), document.path())
    }

    /// Body of a `documents:commit` call merging `fields` into `document`.
    fn commit_body(&self, document: &DocumentRef, fields: FieldMap) -> Value {
        let mut values = Map::new();
        let mut mask = Vec::new();
        let mut transforms = Vec::new();

        for (name, value) in fields {
            let path = field_path(&name);
            match value {
                FieldValue::Value(v) => {
                    values.insert(name, encode_value(v));
                    mask.push(Value::String(path));
                }
                FieldValue::ServerTimestamp => transforms.push(json!({
                    "fieldPath": path,
                    "setToServerValue": "REQUEST_TIME",
                })),
            }
        }

        let mut write = json!({
            "update": {
                "name": self.document_name(document),
                "fields": values,
            },
            "updateMask": { "fieldPaths": mask },
        });
        if !transforms.is_empty() {
            write["updateTransforms"] = Value::Array(transforms);
        }

        json!({ "writes": [write] })
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn merge_fields(&self, document: &DocumentRef, fields: FieldMap) -> Result<(), StoreError> {
        let body = self.commit_body(document, fields);

        let mut request = self.http.post(self.commit_url()).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(%document, "firestore commit applied");
            return Ok(());
        }

        let body = error_body(response).await;
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied(body),
            StatusCode::SERVICE_UNAVAILABLE => StoreError::Unavailable(body),
            _ => StoreError::Rejected {
                status: status.as_u16(),
                body,
            },
        })
    }
}

/// Encode a JSON value in Firestore's typed `Value` representation.
fn encode_value(value: Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // int64 travels as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.into_iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => {
            let fields: Map<String, Value> =
                map.into_iter().map(|(k, v)| (k, encode_value(v))).collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Field path segment, backtick-quoted unless it is a plain identifier.
fn field_path(name: &str) -> String {
    let mut chars = name.chars();
    let simple = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        return name.to_string();
    }
    let escaped = name.replace('\\', "\\\\").replace('`', "\\`");
    format!("`{escaped}`")
}
