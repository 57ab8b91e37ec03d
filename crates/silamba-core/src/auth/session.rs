use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::store::{StorageBackend, StoreError};

/// Storage key of the signed-in flag.
pub const ADMIN_AUTH_KEY: &str = "silamba_admin_auth";

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted admin sign-in state.
pub struct AdminSession {
    backend: Arc<dyn StorageBackend>,
    pub data: Option<SessionData>,
}

impl AdminSession {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            data: None,
        }
    }

    /// Restore a previous sign-in. Returns whether one was found.
    ///
    /// A bare `"true"` flag from older installs counts as signed in.
    pub fn load(&mut self) -> Result<bool, AuthError> {
        let Some(raw) = self.backend.get_item(ADMIN_AUTH_KEY)? else {
            return Ok(false);
        };
        self.data = match serde_json::from_str::<SessionData>(&raw) {
            Ok(data) => Some(data),
            Err(_) if raw.trim() == "true" => Some(SessionData {
                username: ADMIN_USERNAME.to_string(),
                created_at: Utc::now(),
            }),
            Err(e) => {
                debug!(error = %e, "Ignoring unreadable admin flag");
                None
            }
        };
        Ok(self.data.is_some())
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.trim() != ADMIN_USERNAME || password != ADMIN_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }
        let data = SessionData {
            username: ADMIN_USERNAME.to_string(),
            created_at: Utc::now(),
        };
        let raw = serde_json::to_string(&data).map_err(StoreError::from)?;
        self.backend.set_item(ADMIN_AUTH_KEY, &raw)?;
        info!("Admin signed in");
        self.data = Some(data);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.backend.remove_item(ADMIN_AUTH_KEY)?;
        self.data = None;
        info!("Admin signed out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.username.as_str())
    }
}
