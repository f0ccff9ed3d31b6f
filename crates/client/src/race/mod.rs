//! Hub/public source race with a last-resort fallback.
//!
//! 1. Every configured branch is fetched concurrently under its own deadline.
//! 2. A branch only counts when its payload passes that branch's validator.
//! 3. The first branch to finish *and* validate wins; the rest are aborted.
//!    A branch that fails fast never ends the race while another is pending.
//! 4. With no winner, the secondary URL (or the primary URL when there is no
//!    secondary) is fetched once more under the fallback deadline. Any 2xx
//!    JSON body is accepted there.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

use crate::fetch::{FetchClient, FetchError, FetchResponse};

/// Source-specific acceptance check over the raw response and its JSON body.
pub type Validator = Arc<dyn Fn(&FetchResponse, &Value) -> bool + Send + Sync>;

/// Which upstream produced a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Primary,
    Secondary,
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Primary => f.write_str("primary"),
            Source::Secondary => f.write_str("secondary"),
            Source::Fallback => f.write_str("fallback"),
        }
    }
}

/// One raced upstream call.
#[derive(Clone)]
pub struct Branch {
    pub url: Url,
    pub timeout: Duration,
    pub validator: Validator,
}

impl Branch {
    pub fn new(url: Url, timeout: Duration, validator: Validator) -> Self {
        Self { url, timeout, validator }
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("host", &self.url.host_str())
            .field("path", &self.url.path())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Everything needed to resolve one upstream request.
#[derive(Debug, Clone)]
pub struct UpstreamRequestSpec {
    pub primary: Branch,
    pub secondary: Option<Branch>,
    pub fallback_timeout: Duration,
}

/// Winning payload and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub source: Source,
    pub payload: Value,
}

/// Race and fallback both failed.
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    #[error("all sources failed: {message}")]
    AllSourcesFailed { message: String },
}

impl From<RaceError> for wxgate_core::Error {
    fn from(err: RaceError) -> Self {
        match err {
            RaceError::AllSourcesFailed { message } => Self::AllSourcesFailed(message),
        }
    }
}

/// Resolves [`UpstreamRequestSpec`]s against a shared [`FetchClient`].
#[derive(Debug, Clone)]
pub struct RaceCoordinator {
    client: FetchClient,
}

impl RaceCoordinator {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Race the configured branches, falling back once if none validates.
    pub async fn resolve(&self, spec: UpstreamRequestSpec) -> Result<RaceResult, RaceError> {
        let fallback_url = spec.secondary.as_ref().unwrap_or(&spec.primary).url.clone();

        let mut branches = JoinSet::new();
        self.spawn_branch(&mut branches, Source::Primary, spec.primary);
        if let Some(secondary) = spec.secondary {
            self.spawn_branch(&mut branches, Source::Secondary, secondary);
        }

        while let Some(joined) = branches.join_next().await {
            match joined {
                Ok((source, Ok(payload))) => {
                    branches.abort_all();
                    tracing::info!(%source, "upstream race won");
                    return Ok(RaceResult { source, payload });
                }
                Ok((source, Err(e))) => {
                    tracing::warn!(%source, error = %e, "race branch failed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "race branch did not complete");
                }
            }
        }

        tracing::warn!(host = fallback_url.host_str().unwrap_or(""), "no source won the race, trying fallback");

        match self.fetch_single(&fallback_url, spec.fallback_timeout).await {
            Ok(payload) => {
                tracing::info!("fallback succeeded");
                Ok(RaceResult { source: Source::Fallback, payload })
            }
            Err(e) => {
                tracing::error!(error = %e, "all upstream sources failed");
                Err(RaceError::AllSourcesFailed { message: e.to_string() })
            }
        }
    }

    /// Fetch a single source without racing; any 2xx JSON body is accepted.
    pub async fn fetch_single(&self, url: &Url, timeout: Duration) -> Result<Value, FetchError> {
        self.client.fetch(url, timeout).await?.error_for_status()?.json()
    }

    fn spawn_branch(
        &self, branches: &mut JoinSet<(Source, Result<Value, FetchError>)>, source: Source, branch: Branch,
    ) {
        let client = self.client.clone();
        branches.spawn(async move { (source, run_branch(&client, source, branch).await) });
    }
}

async fn run_branch(client: &FetchClient, source: Source, branch: Branch) -> Result<Value, FetchError> {
    let response = client.fetch(&branch.url, branch.timeout).await?;
    tracing::debug!(%source, url = %response.url, fetch_ms = response.fetch_ms, "race branch responded");
    let payload = response.json()?;

    if (branch.validator)(&response, &payload) {
        Ok(payload)
    } else {
        Err(FetchError::Invalid(format!("payload rejected from {}", branch.url.host_str().unwrap_or("upstream"))))
    }
}
