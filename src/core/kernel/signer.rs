use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key on keyed and signed endpoints
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Query parameter the signature is appended under
pub const SIGNATURE_PARAM: &str = "signature";

/// HMAC-SHA256 of `message` keyed with `secret`, hex encoded.
///
/// Any key length is accepted, including an empty secret.
#[must_use]
pub fn sign(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Request authentication as seen by the executor
///
/// The executor hands over the already-encoded query string and receives the
/// headers to attach plus the signature to append after it.
pub trait Signer: Send + Sync {
    /// Header name/value pairs identifying the caller
    fn auth_headers(&self) -> Vec<(&'static str, String)>;

    /// Signature over the exact bytes of `query`
    fn signature(&self, query: &str) -> String;

    /// `query` with `&signature=<sig>` appended
    fn sign_query(&self, query: &str) -> String {
        let signature = self.signature(query);
        if query.is_empty() {
            format!("{}={}", SIGNATURE_PARAM, signature)
        } else {
            format!("{}&{}={}", query, SIGNATURE_PARAM, signature)
        }
    }
}

/// API key + HMAC secret pair
pub struct HmacSigner {
    api_key: Secret<String>,
    secret_key: Secret<String>,
}

impl HmacSigner {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
        }
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner").finish_non_exhaustive()
    }
}

impl Signer for HmacSigner {
    fn auth_headers(&self) -> Vec<(&'static str, String)> {
        vec![(API_KEY_HEADER, self.api_key.expose_secret().clone())]
    }

    fn signature(&self, query: &str) -> String {
        sign(query, self.secret_key.expose_secret())
    }
}
