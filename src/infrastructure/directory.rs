//! Session directory client
//!
//! REST client for the session manager's user API. The reconciler consumes
//! only the narrow `SessionDirectory` view, so tests can substitute an
//! in-process double.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use crate::error::{DirectoryError, DirectoryResult};
use crate::session::Session;

/// Narrow view of the session manager consumed by the reconciler
#[async_trait]
pub trait SessionDirectory {
    /// Fetch all known sessions.
    async fn list_sessions(&self) -> DirectoryResult<Vec<Session>>;

    /// Request termination of `username`'s server.
    async fn terminate(&self, username: &str) -> DirectoryResult<()>;
}

/// HTTP client for the hub-style user API
pub struct HubClient {
    base_url: String,
    api_token: String,
    client: reqwest::Client,
}

impl HubClient {
    /// Create a new client for the directory at `base_url`.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.api_token)
    }

    fn users_url(&self) -> String {
        format!("{}/api/users", self.base_url)
    }

    fn server_url(&self, username: &str) -> String {
        format!("{}/api/users/{}/server", self.base_url, username)
    }

    /// Map a non-2xx response to `DirectoryError::Http`.
    fn check_status(response: &reqwest::Response) -> DirectoryResult<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DirectoryError::Http {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl SessionDirectory for HubClient {
    async fn list_sessions(&self) -> DirectoryResult<Vec<Session>> {
        let response = self
            .client
            .get(self.users_url())
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        Self::check_status(&response)?;

        response
            .json::<Vec<Session>>()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))
    }

    async fn terminate(&self, username: &str) -> DirectoryResult<()> {
        let response = self
            .client
            .delete(self.server_url(username))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        Self::check_status(&response)
    }
}
