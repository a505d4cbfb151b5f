use std::sync::Arc;

use http_client::{HttpClient, Transport};
use serde_json::Value;

use crate::codec;
use crate::error::{ApiError, Result};
use crate::player::PlayerSnapshot;
use crate::value::TypedValue;

/// Path of the now-playing document
pub const PLAYER_DATA_PATH: &str = "player:player/data";

const GET_DATA_ENDPOINT: &str = "/api/getData";

/// A client for reading data from a KEF speaker
///
/// Thin wrapper over a [`Transport`] that issues `getData` requests and
/// decodes the results. It is cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct KefClient {
    transport: Arc<dyn Transport>,
}

impl KefClient {
    /// Create a client for the speaker at `host`
    pub fn new(host: &str) -> Result<Self> {
        let http = HttpClient::new(host)?;
        Ok(Self::with_transport(Arc::new(http)))
    }

    /// Create a client over a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// The transport used for requests
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Fetch the raw value document at `path`
    pub async fn get_data(&self, path: &str) -> Result<Value> {
        let body = self
            .transport
            .get(GET_DATA_ENDPOINT, &[("path", path), ("roles", "value")])
            .await?;

        serde_json::from_str(&body)
            .map_err(|e| ApiError::Parse(format!("getData {} returned invalid JSON: {}", path, e)))
    }

    /// Fetch and decode the typed value at `path`
    pub async fn get_typed(&self, path: &str) -> Result<TypedValue> {
        let value = self.get_data(path).await?;
        Ok(codec::decode_value(&value)?)
    }

    /// Fetch the current player snapshot
    pub async fn player_snapshot(&self) -> Result<PlayerSnapshot> {
        let value = self.get_data(PLAYER_DATA_PATH).await?;
        let snapshot = PlayerSnapshot::from_value(&value)?;
        tracing::trace!(state = %snapshot.state, title = snapshot.title(), "Fetched player snapshot");
        Ok(snapshot)
    }
}

impl std::fmt::Debug for KefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KefClient").finish_non_exhaustive()
    }
}
