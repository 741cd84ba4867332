use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::Signer;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// How much authentication an endpoint requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Security {
    /// Public, no credentials attached
    None,
    /// API key header only, no signature
    ApiKey,
    /// API key header and `signature` query parameter
    Signed,
}

impl Security {
    pub const fn needs_credentials(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::ApiKey => "api_key",
            Self::Signed => "signed",
        };
        f.write_str(name)
    }
}

/// One outgoing call: verb, fixed path, encoded query and security level.
/// Built per call and consumed by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: &'static str,
    pub query: String,
    pub security: Security,
}

impl RequestSpec {
    pub fn new(method: Method, path: &'static str, query: String, security: Security) -> Self {
        Self {
            method,
            path,
            query,
            security,
        }
    }
}

/// REST transport seam
///
/// The façade is generic over this trait so tests can substitute the transport.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Send the request and return the raw success body
    async fn execute(&self, request: RequestSpec) -> Result<Vec<u8>, ExchangeError>;

    /// Send the request and decode the success body into `T`
    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestSpec,
    ) -> Result<T, ExchangeError> {
        let body = self.execute(request).await?;
        serde_json::from_slice(&body).map_err(|e| {
            ExchangeError::Decode(format!(
                "Failed to decode response: {}: {}",
                e,
                String::from_utf8_lossy(&body)
            ))
        })
    }
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API, without trailing slash
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            exchange_name,
            timeout_seconds: 30,
            user_agent: concat!("spotlink/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
        }
    }

    /// Set the signer for keyed and signed requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| ExchangeError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(ReqwestRest {
            client,
            config: self.config,
            signer: self.signer,
        })
    }
}

/// `RestClient` over a single pooled `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
}

impl fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    fn signer_for(&self, security: Security) -> Result<Option<&dyn Signer>, ExchangeError> {
        if !security.needs_credentials() {
            return Ok(None);
        }
        self.signer.as_deref().map(Some).ok_or_else(|| {
            ExchangeError::Auth(format!(
                "{} endpoint requires credentials but no signer is configured",
                security
            ))
        })
    }

    /// Final URL: base + path, then the query, with the signature appended
    /// after the unsigned query for signed requests.
    pub fn compose_url(&self, request: &RequestSpec) -> Result<String, ExchangeError> {
        let mut url = format!("{}{}", self.config.base_url, request.path);

        let query = match (request.security, self.signer_for(request.security)?) {
            (Security::Signed, Some(signer)) => signer.sign_query(&request.query),
            _ => request.query.clone(),
        };

        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(
        skip(self, request),
        fields(exchange = %self.config.exchange_name, method = %request.method, path = request.path, security = %request.security)
    )]
    async fn execute(&self, request: RequestSpec) -> Result<Vec<u8>, ExchangeError> {
        let url = self.compose_url(&request)?;
        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(signer) = self.signer_for(request.security)? {
            for (name, value) in signer.auth_headers() {
                builder = builder.header(name, value);
            }
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(format!("Request failed: {}", e)))?;

        // Body first, so error statuses still carry their payload
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ExchangeError::Transport(format!("Failed to read response body: {}", e)))?
            .to_vec();

        trace!(status = status.as_u16(), "Response body: {}", String::from_utf8_lossy(&body));

        if status.is_success() {
            Ok(body)
        } else {
            Err(ExchangeError::api(status.as_u16(), body))
        }
    }
}
