//! Directus items API client.
//!
//! Every call goes to `{base_url}/items/{collection}[/{id}]`, carries the
//! bearer token produced by the injected [`TokenSource`], and unwraps the
//! `{ data, meta? }` envelope. Failures surface as [`ApiError`]; read paths
//! that prefer an empty result over an error record what happened in a
//! [`FailureLog`].
//!
//! # Usage
//!
//! ```ignore
//! use pabrik_client::{DirectusClient, Query};
//! use pabrik_core::{DirectusConfig, Record};
//!
//! let config = DirectusConfig::new("https://directus.example.com").with_token("secret");
//! let client = DirectusClient::from_config(&config)?;
//! let materials: Vec<Record> = client
//!     .list("rawmaterial", &Query::new().eq("status", "published").sort("kode"))
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod failures;
pub mod query;
pub mod token;

pub use client::{Collection, ConnectionStatus, DirectusClient, ListPage, payload_shape};
pub use error::{ApiError, error_code};
pub use failures::{FailureLog, ReadFailure};
pub use query::{FilterOp, Query};
pub use token::{NoAuth, StaticToken, StoredToken, TOKEN_KEY, TokenSource};
