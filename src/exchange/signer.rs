//! RSA-PSS request signing for the Kalshi API.
//!
//! Every request carries a signature over `timestamp + METHOD + path`
//! (query string excluded), produced with RSA-PSS (MGF1/SHA-256,
//! digest-length salt) and base64-encoded. Signatures are single-use:
//! a fresh timestamp is taken for every request.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::Utc;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Header carrying the public API key identifier.
pub const ACCESS_KEY_HEADER: &str = "KALSHI-ACCESS-KEY";
/// Header carrying the base64 PSS signature.
pub const ACCESS_SIGNATURE_HEADER: &str = "KALSHI-ACCESS-SIGNATURE";
/// Header carrying the millisecond timestamp the signature covers.
pub const ACCESS_TIMESTAMP_HEADER: &str = "KALSHI-ACCESS-TIMESTAMP";

/// Authentication header values for one request.
#[derive(Debug, Clone)]
pub struct AuthHeaders {
    pub api_key_id: String,
    pub signature: String,
    pub timestamp: String,
}

/// Signs outgoing requests with the account's RSA private key.
pub struct RequestSigner {
    api_key_id: String,
    private_key: RsaPrivateKey,
}

impl RequestSigner {
    /// Build a signer from a PEM-encoded private key (PKCS#8 or PKCS#1).
    pub fn from_pem(api_key_id: &str, pem: &str) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| Error::Signing(format!("failed to parse RSA private key: {e}")))?;

        Ok(Self {
            api_key_id: api_key_id.to_string(),
            private_key,
        })
    }

    /// Sign a request, taking a fresh millisecond timestamp.
    pub fn sign(&self, method: &str, path: &str) -> Result<AuthHeaders> {
        let timestamp = Utc::now().timestamp_millis().to_string();
        self.sign_at(&timestamp, method, path)
    }

    /// Sign a request for a caller-supplied timestamp string.
    pub fn sign_at(&self, timestamp: &str, method: &str, path: &str) -> Result<AuthHeaders> {
        let message = signing_message(timestamp, method, path);
        let digest = Sha256::digest(message.as_bytes());

        let padding = Pss::new_with_salt::<Sha256>(<Sha256 as Digest>::output_size());
        let signature = self
            .private_key
            .sign_with_rng(&mut rand::thread_rng(), padding, digest.as_slice())
            .map_err(|e| Error::Signing(format!("PSS signing failed: {e}")))?;

        Ok(AuthHeaders {
            api_key_id: self.api_key_id.clone(),
            signature: BASE64_STANDARD.encode(signature),
            timestamp: timestamp.to_string(),
        })
    }

    /// Public half of the signing key.
    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }
}

/// The exact string the signature covers: timestamp, uppercase HTTP
/// method, and the path with any query string stripped.
pub fn signing_message(timestamp: &str, method: &str, path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    format!("{timestamp}{method}{path}")
}

/// Verify a base64 PSS signature against a message. Used by tests and
/// kept next to the signing side so the parameters cannot drift apart.
pub fn verify_signature(public_key: &RsaPublicKey, message: &str, signature_b64: &str) -> Result<()> {
    let signature = BASE64_STANDARD
        .decode(signature_b64)
        .map_err(|e| Error::Signing(format!("signature is not valid base64: {e}")))?;
    let digest = Sha256::digest(message.as_bytes());
    let padding = Pss::new_with_salt::<Sha256>(<Sha256 as Digest>::output_size());

    public_key
        .verify(padding, digest.as_slice(), &signature)
        .map_err(|e| Error::Signing(format!("signature verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1::EncodeRsaPrivateKey;
    use rsa::pkcs8::{EncodePrivateKey, LineEnding};
    use std::sync::OnceLock;

    fn test_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| {
            RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("keygen")
        })
    }

    #[test]
    fn test_signing_message_strips_query_string() {
        assert_eq!(
            signing_message("1700000000000", "GET", "/markets?limit=1000&status=open"),
            "1700000000000GET/markets"
        );
        assert_eq!(
            signing_message("1700000000000", "POST", "/portfolio/orders"),
            "1700000000000POST/portfolio/orders"
        );
    }

    #[test]
    fn test_pkcs8_pem_round_trip_signs_and_verifies() {
        let pem = test_key().to_pkcs8_pem(LineEnding::LF).unwrap();
        let signer = RequestSigner::from_pem("key-id", &pem).unwrap();

        let headers = signer.sign_at("1700000000000", "GET", "/portfolio/balance").unwrap();
        assert_eq!(headers.timestamp, "1700000000000");
        assert_eq!(headers.api_key_id, "key-id");

        let message = signing_message(&headers.timestamp, "GET", "/portfolio/balance");
        verify_signature(&signer.public_key(), &message, &headers.signature).unwrap();
    }

    #[test]
    fn test_pkcs1_pem_accepted() {
        let pem = test_key().to_pkcs1_pem(LineEnding::LF).unwrap();
        let signer = RequestSigner::from_pem("key-id", &pem).unwrap();

        let headers = signer.sign_at("1", "GET", "/markets").unwrap();
        let message = signing_message("1", "GET", "/markets");
        verify_signature(&signer.public_key(), &message, &headers.signature).unwrap();
    }

    #[test]
    fn test_garbage_pem_rejected() {
        let result = RequestSigner::from_pem("key-id", "not a pem");
        assert!(matches!(result, Err(Error::Signing(_))));
    }

    #[test]
    fn test_tampered_message_fails_verification() {
        let pem = test_key().to_pkcs8_pem(LineEnding::LF).unwrap();
        let signer = RequestSigner::from_pem("key-id", &pem).unwrap();

        let headers = signer.sign_at("1700000000000", "GET", "/markets").unwrap();
        let tampered = signing_message(&headers.timestamp, "POST", "/markets");
        assert!(verify_signature(&signer.public_key(), &tampered, &headers.signature).is_err());
    }

    #[test]
    fn test_fresh_timestamp_per_signature() {
        let pem = test_key().to_pkcs8_pem(LineEnding::LF).unwrap();
        let signer = RequestSigner::from_pem("key-id", &pem).unwrap();

        let headers = signer.sign("GET", "/markets").unwrap();
        let millis: i64 = headers.timestamp.parse().unwrap();
        let now = Utc::now().timestamp_millis();
        assert!((now - millis).abs() < 5_000);
    }
}
