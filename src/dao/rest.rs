//! Score ledger backed by the hosted profile service's REST API.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::dao::ledger::{LedgerError, LedgerResult, PlayerProfile, ScoreLedger};

/// Result alias for REST ledger internals.
pub type RestResult<T> = Result<T, RestLedgerError>;

/// Errors specific to the REST ledger transport.
#[derive(Debug, Error)]
pub enum RestLedgerError {
    /// Required environment variable is not set.
    #[error("missing environment variable {var}")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Builder failure reported by reqwest.
        #[source]
        source: reqwest::Error,
    },
    /// A request to the ledger failed at the transport level.
    #[error("ledger request to {path} failed")]
    Request {
        /// Path of the failing request.
        path: String,
        /// Transport failure reported by reqwest.
        #[source]
        source: reqwest::Error,
    },
    /// The ledger answered with an unexpected status code.
    #[error("ledger answered {status} for {path}")]
    UnexpectedStatus {
        /// Path of the failing request.
        path: String,
        /// Status code returned by the ledger.
        status: StatusCode,
    },
}

impl From<RestLedgerError> for LedgerError {
    fn from(err: RestLedgerError) -> Self {
        match err {
            RestLedgerError::UnexpectedStatus { ref path, status }
                if status == StatusCode::UNPROCESSABLE_ENTITY =>
            {
                LedgerError::Rejected(format!("ledger refused {path}"))
            }
            other => LedgerError::unavailable(other.to_string(), other),
        }
    }
}

/// Runtime configuration describing how to reach the ledger service.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Base URL of the ledger API, without a trailing slash.
    pub base_url: String,
    /// Optional bearer token attached to every request.
    pub token: Option<String>,
}

impl LedgerConfig {
    /// Construct a configuration from an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach a bearer token to the configuration.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> RestResult<Self> {
        let base_url = std::env::var("LEDGER_BASE_URL").map_err(|_| {
            RestLedgerError::MissingEnvVar {
                var: "LEDGER_BASE_URL",
            }
        })?;

        let mut config = Self::new(base_url);
        if let Ok(token) = std::env::var("LEDGER_API_TOKEN") {
            config = config.with_token(token);
        }
        Ok(config)
    }
}

#[derive(Serialize)]
struct DeltaBody {
    delta: i64,
}

/// Ledger client talking to the profile service over HTTPS.
#[derive(Clone)]
pub struct RestLedger {
    client: Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl RestLedger {
    /// Build a client and verify the ledger is reachable.
    pub async fn connect(config: LedgerConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestLedgerError::ClientBuilder { source })?;

        let ledger = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            token: config.token.map(Arc::<str>::from),
        };

        ledger.ping().await?;
        Ok(ledger)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match self.token {
            Some(ref token) => builder.bearer_auth(token.as_ref()),
            None => builder,
        }
    }

    async fn ping(&self) -> RestResult<()> {
        let path = "healthz";
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|source| RestLedgerError::Request {
                path: path.into(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RestLedgerError::UnexpectedStatus {
                path: path.into(),
                status: response.status(),
            })
        }
    }

    async fn fetch_profile(&self, user_id: String) -> RestResult<Option<PlayerProfile>> {
        let path = format!("profiles/{user_id}");
        let response = self
            .request(Method::GET, &path)
            .send()
            .await
            .map_err(|source| RestLedgerError::Request {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let profile =
                    response
                        .json::<PlayerProfile>()
                        .await
                        .map_err(|source| RestLedgerError::Request {
                            path: path.clone(),
                            source,
                        })?;
                Ok(Some(profile))
            }
            status => Err(RestLedgerError::UnexpectedStatus { path, status }),
        }
    }

    async fn post_delta(&self, user_id: String, delta: i64) -> RestResult<PlayerProfile> {
        let path = format!("profiles/{user_id}/score-delta");
        let response = self
            .request(Method::POST, &path)
            .json(&DeltaBody { delta })
            .send()
            .await
            .map_err(|source| RestLedgerError::Request {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestLedgerError::UnexpectedStatus { path, status });
        }

        response
            .json::<PlayerProfile>()
            .await
            .map_err(|source| RestLedgerError::Request { path, source })
    }
}

impl ScoreLedger for RestLedger {
    fn fetch(&self, user_id: &str) -> BoxFuture<'static, LedgerResult<Option<PlayerProfile>>> {
        let ledger = self.clone();
        let user_id = user_id.to_owned();
        Box::pin(async move { ledger.fetch_profile(user_id).await.map_err(Into::into) })
    }

    fn apply_delta(
        &self,
        user_id: &str,
        delta: i64,
    ) -> BoxFuture<'static, LedgerResult<PlayerProfile>> {
        let ledger = self.clone();
        let user_id = user_id.to_owned();
        Box::pin(async move { ledger.post_delta(user_id, delta).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, LedgerResult<()>> {
        let ledger = self.clone();
        Box::pin(async move { ledger.ping().await.map_err(Into::into) })
    }
}
