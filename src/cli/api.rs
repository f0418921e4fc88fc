//! HTTP client for the Wave task server.
//!
//! Credentials flow: `login` exchanges e-mail and password for a bearer
//! token which is stored in `~/.wave/token`; every other call reads it
//! from there. Server errors are surfaced through their localized
//! `displayMessage` when one is present.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable overriding the server base URL.
pub const API_URL_ENV: &str = "WAVE_API_URL";

/// Default server base URL (matches `wave serve` defaults).
const DEFAULT_API_URL: &str = "http://127.0.0.1:3333";

/// Request timeout (seconds)
const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Response Types
// ============================================================================

/// A task as the server reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTask {
    pub id: String,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// The authenticated account.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProfile {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ProfileBody {
    user: RemoteProfile,
}

#[derive(Debug, Deserialize)]
struct TaskBody {
    task: RemoteTask,
}

#[derive(Debug, Deserialize)]
struct TaskListBody {
    tasks: Vec<RemoteTask>,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    message: Option<String>,
    #[serde(rename = "displayMessage")]
    display_message: Option<String>,
}

// ============================================================================
// ApiClient
// ============================================================================

/// Client for the task server's REST API.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token_path: PathBuf,
}

impl ApiClient {
    /// Creates a client. The base URL comes from the `--server` flag,
    /// then `$WAVE_API_URL`, then the local default.
    pub fn new(server: Option<String>) -> Result<Self> {
        let base_url = server
            .or_else(|| std::env::var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let token_path = dirs::home_dir()
            .context("could not determine home directory")?
            .join(".wave")
            .join("token");

        Self::with_paths(base_url, token_path)
    }

    /// Creates a client with explicit base URL and token path (used in tests).
    pub fn with_paths(base_url: impl Into<String>, token_path: PathBuf) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            token_path,
        })
    }

    // ------------------------------------------------------------------------
    // Account
    // ------------------------------------------------------------------------

    /// Creates an account, then logs straight in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/users"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        Self::check(response).await?;

        self.login(email, password).await
    }

    /// Logs in and stores the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/sessions/password"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        let body: TokenBody = Self::check(response).await?.json().await?;

        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {:?}", parent))?;
        }
        std::fs::write(&self.token_path, &body.token)
            .with_context(|| format!("failed to save token to {:?}", self.token_path))?;
        debug!("Token saved to {:?}", self.token_path);
        Ok(())
    }

    /// Forgets the stored token. Returns false if there was none.
    pub fn logout(&self) -> Result<bool> {
        match std::fs::remove_file(&self.token_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("failed to remove {:?}", self.token_path))
            }
        }
    }

    /// Fetches the logged-in account.
    pub async fn profile(&self) -> Result<RemoteProfile> {
        let response = self.authed_get("/profile").await?;
        let body: ProfileBody = Self::check(response).await?.json().await?;
        Ok(body.user)
    }

    // ------------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------------

    /// Lists the caller's tasks, newest first.
    pub async fn list_tasks(&self) -> Result<Vec<RemoteTask>> {
        let response = self.authed_get("/tasks").await?;
        let body: TaskListBody = Self::check(response).await?.json().await?;
        Ok(body.tasks)
    }

    /// Creates a task.
    pub async fn add_task(&self, name: &str) -> Result<RemoteTask> {
        let response = self
            .http
            .post(self.url("/tasks"))
            .bearer_auth(self.token()?)
            .json(&json!({ "name": name }))
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        let body: TaskBody = Self::check(response).await?.json().await?;
        Ok(body.task)
    }

    /// Fetches one task.
    pub async fn show_task(&self, id: &str) -> Result<RemoteTask> {
        let response = self.authed_get(&format!("/tasks/{id}")).await?;
        let body: TaskBody = Self::check(response).await?.json().await?;
        Ok(body.task)
    }

    /// Renames a task.
    pub async fn rename_task(&self, id: &str, name: &str) -> Result<RemoteTask> {
        let response = self
            .http
            .put(self.url(&format!("/tasks/{id}")))
            .bearer_auth(self.token()?)
            .json(&json!({ "name": name }))
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        let body: TaskBody = Self::check(response).await?.json().await?;
        Ok(body.task)
    }

    /// Deletes a task.
    pub async fn remove_task(&self, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/tasks/{id}")))
            .bearer_auth(self.token()?)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        Self::check(response).await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authed_get(&self, path: &str) -> Result<Response> {
        self.http
            .get(self.url(path))
            .bearer_auth(self.token()?)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))
    }

    /// Reads the stored token.
    fn token(&self) -> Result<String> {
        match std::fs::read_to_string(&self.token_path) {
            Ok(token) => Ok(token.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                bail!("not logged in; run 'wave account login' first")
            }
            Err(e) => {
                Err(e).with_context(|| format!("failed to read token from {:?}", self.token_path))
            }
        }
    }

    /// Turns non-success responses into errors, preferring the server's
    /// localized message.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: Option<ServerError> = response.json().await.ok();
        let message = body
            .and_then(|e| e.display_message.or(e.message))
            .unwrap_or_else(|| default_status_message(status));
        bail!("{}", message)
    }
}

fn default_status_message(status: StatusCode) -> String {
    format!("server returned {}", status)
}

// ============================================================================
// Tests
// ============================================================================
