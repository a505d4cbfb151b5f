//! Session registration
//!
//! The speaker keeps a server-side event queue per session. Registering a
//! subscription set creates the queue and returns its id, which every
//! subsequent poll must carry.

use std::sync::Arc;

use kef_api::Transport;
use tracing::{debug, info};

use crate::error::RegistrationError;
use crate::subscription::{SessionId, Subscription};

pub(crate) const MODIFY_QUEUE_ENDPOINT: &str = "/api/event/modifyQueue";

/// Registers subscription sets with a speaker
#[derive(Clone)]
pub struct SessionRegistrar {
    transport: Arc<dyn Transport>,
}

impl SessionRegistrar {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create a new event queue watching `subscriptions`
    pub async fn register(&self, subscriptions: &[Subscription]) -> Result<SessionId, RegistrationError> {
        let subscribe = serde_json::to_string(subscriptions)
            .map_err(|e| RegistrationError::Encode(e.to_string()))?;

        debug!(count = subscriptions.len(), "Registering subscriptions");

        let body = self
            .transport
            .get(
                MODIFY_QUEUE_ENDPOINT,
                &[
                    ("subscribe", subscribe.as_str()),
                    ("unsubscribe", "[]"),
                    ("queueId", ""),
                ],
            )
            .await?;

        let session = parse_session(&body)?;
        info!(session = %session, subscriptions = subscriptions.len(), "Registered event queue");
        Ok(session)
    }
}

impl std::fmt::Debug for SessionRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistrar").finish_non_exhaustive()
    }
}

/// The registration response is a JSON string literal holding the queue id
fn parse_session(body: &str) -> Result<SessionId, RegistrationError> {
    let id: String = serde_json::from_str(body.trim()).map_err(|e| {
        RegistrationError::InvalidResponse(format!("expected a JSON string, got {:?}: {}", body, e))
    })?;

    if id.is_empty() {
        return Err(RegistrationError::EmptySession);
    }

    Ok(SessionId::from(id))
}
