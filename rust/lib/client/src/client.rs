use std::marker::PhantomData;
use std::sync::Arc;

use pabrik_core::{DirectusConfig, RecordId};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::query::Query;
use crate::token::{NoAuth, StaticToken, TokenSource};

/// The `{ data, meta? }` envelope every Directus item endpoint answers with.
#[derive(Debug, Clone, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    meta: Option<Value>,
}

/// One page of a list call, with Directus metadata when it was requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub meta: Option<Value>,
}

/// Outcome of a connection probe. Never an error: failures are described.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub success: bool,
    /// HTTP status, or 0 when no response arrived.
    pub status: u16,
    pub message: String,
}

/// Short description of a payload for logs: `array(3)`, `object`, `null`.
pub fn payload_shape(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("array({})", items.len()),
        Value::Object(_) => "object".to_string(),
        Value::Null => "null".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "bool".to_string(),
    }
}

fn validate_collection(collection: &str) -> Result<(), ApiError> {
    let ok = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "invalid collection name {collection:?}"
        )))
    }
}

fn validate_id(collection: &str, id: &RecordId) -> Result<(), ApiError> {
    if id.is_blank() {
        return Err(ApiError::Validation(format!(
            "blank id for collection {collection}"
        )));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(collection: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("{collection} data: {e}")))
}

/// Untyped client for the Directus items API:
/// `{base_url}/items/{collection}[/{id}]`.
///
/// Cheap to clone; clones share the connection pool and token source.
#[derive(Clone)]
pub struct DirectusClient {
    http: reqwest::Client,
    base_url: String,
    token_source: Arc<dyn TokenSource>,
}

impl DirectusClient {
    pub fn new(config: &DirectusConfig, token_source: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        config
            .validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_source,
        })
    }

    /// Client authenticated with the configured static token, or anonymous
    /// when none is configured.
    pub fn from_config(config: &DirectusConfig) -> Result<Self, ApiError> {
        let token_source: Arc<dyn TokenSource> = match config.token {
            Some(ref token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(NoAuth),
        };
        Self::new(config, token_source)
    }

    /// Same connection, different credential.
    pub fn with_token_source(&self, token_source: Arc<dyn TokenSource>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token_source,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Typed view over one collection.
    pub fn collection<T>(&self, name: &'static str) -> Collection<T> {
        Collection {
            client: self.clone(),
            name,
            _phantom: PhantomData,
        }
    }

    fn collection_url(&self, collection: &str) -> Result<String, ApiError> {
        validate_collection(collection)?;
        Ok(format!("{}/items/{}", self.base_url, collection))
    }

    fn item_url(&self, collection: &str, id: &RecordId) -> Result<String, ApiError> {
        validate_id(collection, id)?;
        Ok(format!("{}/{}", self.collection_url(collection)?, id))
    }

    /// Build a request with auth header.
    async fn authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token_source.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    /// Send one request and unwrap the envelope. Empty bodies (204) come back
    /// as an envelope with `data: null`.
    async fn execute(
        &self,
        method: Method,
        url: String,
        query: Option<&Query>,
        body: Option<Value>,
    ) -> Result<Envelope, ApiError> {
        let mut req = self.http.request(method.clone(), &url);
        if let Some(q) = query {
            let pairs = q.pairs();
            if !pairs.is_empty() {
                req = req.query(&pairs);
            }
        }
        if let Some(ref body) = body {
            req = req.json(body);
        }
        let req = self.authed(req).await?;

        debug!(%method, %url, "directus request");
        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &bytes);
            debug!(%method, %url, status = status.as_u16(), error = %err, "directus error response");
            return Err(err);
        }

        let envelope: Envelope = if bytes.is_empty() {
            Envelope::default()
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Decode(format!("response body: {e}")))?
        };
        debug!(
            %method,
            %url,
            status = status.as_u16(),
            shape = %payload_shape(&envelope.data),
            "directus response"
        );
        Ok(envelope)
    }

    /// List records. A `null` data field reads as an empty list.
    pub async fn list<T: DeserializeOwned>(&self, collection: &str, query: &Query) -> Result<Vec<T>, ApiError> {
        Ok(self.list_page(collection, query).await?.items)
    }

    /// List records together with the `meta` block.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<ListPage<T>, ApiError> {
        let url = self.collection_url(collection)?;
        let envelope = self.execute(Method::GET, url, Some(query), None).await?;
        let items = match envelope.data {
            Value::Null => Vec::new(),
            data => decode(collection, data)?,
        };
        Ok(ListPage {
            items,
            meta: envelope.meta,
        })
    }

    /// Fetch one record. `None` when the server answers with `data: null`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &RecordId,
        query: &Query,
    ) -> Result<Option<T>, ApiError> {
        let url = self.item_url(collection, id)?;
        let envelope = self.execute(Method::GET, url, Some(query), None).await?;
        match envelope.data {
            Value::Null => Ok(None),
            data => decode(collection, data).map(Some),
        }
    }

    /// Create a record and return what the server stored.
    pub async fn create<B, T>(&self, collection: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.collection_url(collection)?;
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Validation(format!("unserializable body: {e}")))?;
        let envelope = self.execute(Method::POST, url, None, Some(body)).await?;
        info!(collection, "created record");
        decode(collection, envelope.data)
    }

    /// Partially update a record (PATCH).
    pub async fn update<B, T>(&self, collection: &str, id: &RecordId, patch: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.item_url(collection, id)?;
        let body = serde_json::to_value(patch)
            .map_err(|e| ApiError::Validation(format!("unserializable body: {e}")))?;
        let envelope = self.execute(Method::PATCH, url, None, Some(body)).await?;
        info!(collection, %id, "updated record");
        decode(collection, envelope.data)
    }

    /// Delete a record.
    pub async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), ApiError> {
        let url = self.item_url(collection, id)?;
        self.execute(Method::DELETE, url, None, None).await?;
        info!(collection, %id, "deleted record");
        Ok(())
    }

    /// Probe a collection with `?limit=1`.
    pub async fn ping(&self, collection: &str) -> ConnectionStatus {
        let result = match self.collection_url(collection) {
            Ok(url) => {
                self.execute(Method::GET, url, Some(&Query::new().limit(1)), None)
                    .await
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => ConnectionStatus {
                success: true,
                status: 200,
                message: "Connection successful".to_string(),
            },
            Err(ApiError::Remote { status, .. }) => ConnectionStatus {
                success: false,
                status,
                message: format!("HTTP {status}"),
            },
            Err(e) => ConnectionStatus {
                success: false,
                status: 0,
                message: e.to_string(),
            },
        }
    }
}

/// Type-safe CRUD handle for a single collection.
pub struct Collection<T> {
    client: DirectusClient,
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            name: self.name,
            _phantom: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Collection<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn client(&self) -> &DirectusClient {
        &self.client
    }

    pub async fn list(&self, query: &Query) -> Result<Vec<T>, ApiError> {
        self.client.list(self.name, query).await
    }

    pub async fn get(&self, id: &RecordId) -> Result<Option<T>, ApiError> {
        self.client.get(self.name, id, &Query::new()).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T, ApiError> {
        self.client.create(self.name, body).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: &RecordId, patch: &B) -> Result<T, ApiError> {
        self.client.update(self.name, id, patch).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.client.delete(self.name, id).await
    }

    pub async fn ping(&self) -> ConnectionStatus {
        self.client.ping(self.name).await
    }
}
