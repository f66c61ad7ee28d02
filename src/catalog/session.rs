//! Authenticated session shared by all requests of a run.

use crate::config::TransferConfig;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};

/// An authenticated catalog session.
///
/// Holds the bearer token acquired before the run. Token acquisition and
/// refresh happen outside this crate; the session only carries the result.
#[derive(Clone)]
pub struct CatalogSession {
    access_token: SecretString,
}

impl CatalogSession {
    /// Creates a session from a bearer token.
    #[must_use]
    pub fn new(access_token: SecretString) -> Self {
        Self { access_token }
    }

    /// Creates a session from the configured access token.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is configured or it is blank.
    pub fn from_config(config: &TransferConfig) -> Result<Self> {
        let token = config.access_token.clone().ok_or_else(|| {
            Error::InvalidInput(
                "no access token configured (set CATALOG_TRANSFER_ACCESS_TOKEN)".to_string(),
            )
        })?;

        if token.expose_secret().trim().is_empty() {
            return Err(Error::InvalidInput("access token is empty".to_string()));
        }

        Ok(Self::new(token))
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

impl std::fmt::Debug for CatalogSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSession")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}
