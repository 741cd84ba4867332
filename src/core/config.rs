use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;

pub const MAINNET_REST_URL: &str = "https://api.binance.com";
pub const MAINNET_STREAM_URL: &str = "wss://stream.binance.com:9443/ws/";
pub const TESTNET_REST_URL: &str = "https://testnet.binance.vision";
pub const TESTNET_STREAM_URL: &str = "wss://testnet.binance.vision/ws/";

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub testnet: bool,
    pub base_url: Option<String>,
    pub stream_url: Option<String>,
    pub timeout_seconds: u64,
}

// Never expose secrets in serialization
impl Serialize for ExchangeConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ExchangeConfig", 6)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field("testnet", &self.testnet)?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("stream_url", &self.stream_url)?;
        state.serialize_field("timeout_seconds", &self.timeout_seconds)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ExchangeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ExchangeConfigHelper {
            api_key: String,
            secret_key: String,
            #[serde(default)]
            testnet: bool,
            base_url: Option<String>,
            stream_url: Option<String>,
            timeout_seconds: Option<u64>,
        }

        let helper = ExchangeConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            api_key: Secret::new(helper.api_key),
            secret_key: Secret::new(helper.secret_key),
            testnet: helper.testnet,
            base_url: helper.base_url,
            stream_url: helper.stream_url,
            timeout_seconds: helper.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        })
    }
}

impl ExchangeConfig {
    /// Create a new configuration with API credentials
    #[must_use]
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            testnet: false,
            base_url: None,
            stream_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_API_KEY` (e.g., `BINANCE_API_KEY`)
    /// - `{PREFIX}_SECRET_KEY` (e.g., `BINANCE_SECRET_KEY`)
    /// - `{PREFIX}_TESTNET` (optional, defaults to false)
    /// - `{PREFIX}_BASE_URL` (optional)
    /// - `{PREFIX}_STREAM_URL` (optional)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let api_key_var = format!("{}_API_KEY", prefix);
        let secret_key_var = format!("{}_SECRET_KEY", prefix);

        let api_key = env::var(&api_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_key_var))?;
        let secret_key = env::var(&secret_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(secret_key_var))?;

        let testnet = env::var(format!("{}_TESTNET", prefix))
            .ok()
            .and_then(|value| value.parse::<bool>().ok())
            .unwrap_or(false);

        Ok(Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            testnet,
            base_url: env::var(format!("{}_BASE_URL", prefix)).ok(),
            stream_url: env::var(format!("{}_STREAM_URL", prefix)).ok(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        })
    }

    /// Load a `.env` file from the working directory, then read the environment.
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Same as [`Self::from_env_file`] with an explicit file path.
    /// A missing file is not an error; the process environment is used as-is.
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    /// Configuration for public market data only
    #[must_use]
    pub fn read_only() -> Self {
        Self::new(String::new(), String::new())
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.secret_key.expose_secret().is_empty()
    }

    #[must_use]
    pub const fn testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn stream_url(mut self, stream_url: String) -> Self {
        self.stream_url = Some(stream_url);
        self
    }

    #[must_use]
    pub const fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// REST host, honouring an explicit override before the testnet flag
    pub fn rest_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if self.testnet => TESTNET_REST_URL.to_string(),
            None => MAINNET_REST_URL.to_string(),
        }
    }

    /// Stream host, always ending with `/` so topics can be appended
    pub fn stream_base_url(&self) -> String {
        let url = match &self.stream_url {
            Some(url) => url.clone(),
            None if self.testnet => TESTNET_STREAM_URL.to_string(),
            None => MAINNET_STREAM_URL.to_string(),
        };
        if url.ends_with('/') {
            url
        } else {
            format!("{}/", url)
        }
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get secret key (use carefully - exposes secret)
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_serialize_redact_secrets() {
        let config = ExchangeConfig::new("my-api-key".to_string(), "my-secret".to_string());

        let debug = format!("{:?}", config);
        assert!(!debug.contains("my-api-key"));
        assert!(!debug.contains("my-secret"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("[REDACTED]"));
        assert!(!json.contains("my-secret"));
    }

    #[test]
    fn test_host_selection() {
        let config = ExchangeConfig::read_only();
        assert!(!config.has_credentials());
        assert_eq!(config.rest_base_url(), MAINNET_REST_URL);
        assert_eq!(config.stream_base_url(), MAINNET_STREAM_URL);

        let config = config.testnet(true);
        assert_eq!(config.rest_base_url(), TESTNET_REST_URL);
        assert_eq!(config.stream_base_url(), TESTNET_STREAM_URL);

        let config = config
            .base_url("http://127.0.0.1:8080/".to_string())
            .stream_url("ws://127.0.0.1:9000/ws".to_string());
        assert_eq!(config.rest_base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.stream_base_url(), "ws://127.0.0.1:9000/ws/");
    }

    #[test]
    fn test_from_env_missing_key() {
        let result = ExchangeConfig::from_env("SPOTLINK_TEST_UNSET_PREFIX");
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvironmentVariable(var)) if var == "SPOTLINK_TEST_UNSET_PREFIX_API_KEY"
        ));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: ExchangeConfig =
            serde_json::from_str(r#"{"api_key":"k","secret_key":"s"}"#).unwrap();
        assert!(config.has_credentials());
        assert!(!config.testnet);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }
}
