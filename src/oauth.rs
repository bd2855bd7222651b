//! OAuth 1.0a request signing.
//!
//! The v1.1 endpoints require an HMAC-SHA1 signature over the method, URL and
//! every request parameter. This module produces the `Authorization` header;
//! whether the credentials are any good is decided by the service alone.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::RngCore;
use sha1::Sha1;

use crate::config::Credentials;
use crate::error::{Error, Result};

/// RFC 3986: everything except ALPHA / DIGIT / "-" / "." / "_" / "~" is encoded.
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub(crate) fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, RFC3986).to_string()
}

/// Signs requests with a fixed set of credentials. Construction is a pure
/// pass-through; no network traffic happens until the client uses the header.
#[derive(Debug, Clone)]
pub struct OauthSigner {
    credentials: Credentials,
}

impl OauthSigner {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            credentials: credentials.clone(),
        }
    }

    /// Build the `OAuth ...` Authorization header for one request.
    ///
    /// `params` must hold every query and form parameter the request will
    /// carry, unencoded; the signature covers all of them.
    pub fn sign(&self, method: &str, url: &str, params: &[(String, String)]) -> Result<String> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| Error::Auth(format!("system clock before unix epoch: {e}")))?
            .as_secs()
            .to_string();
        self.sign_at(method, url, params, &timestamp, &nonce())
    }

    // Split out so tests can pin timestamp and nonce.
    fn sign_at(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        timestamp: &str,
        nonce: &str,
    ) -> Result<String> {
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.credentials.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.credentials.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        // Signature base: method & url & sorted, encoded parameters.
        let all_params: Vec<(String, String)> = oauth_params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .chain(params.iter().cloned())
            .collect();
        let param_string = parameter_string(&all_params);
        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            percent_encode(url),
            percent_encode(&param_string)
        );
        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.credentials.consumer_secret),
            percent_encode(&self.credentials.access_token_secret)
        );

        let signature = hmac_sha1(&signing_key, &base_string)?;
        oauth_params.push(("oauth_signature", signature.as_str()));

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {header}"))
    }
}

/// Normalize parameters for the signature base string. RFC 5849 §3.4.1.3.2
/// sorts by the percent-encoded name and value, so encode first, then sort.
fn parameter_string(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hmac_sha1(key: &str, data: &str) -> Result<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .map_err(|e| Error::Auth(format!("hmac init: {e}")))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
