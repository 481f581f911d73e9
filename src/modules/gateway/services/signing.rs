use crate::core::{AppError, Result};
use crate::modules::gateway::models::SignedRequest;
use crate::modules::gateway::services::clock;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};

/// Canonical request signer for the card processor.
///
/// The signable string is `METHOD:PATH:HEX_DIGEST:TIMESTAMP`, where
/// `HEX_DIGEST` is the lower-case SHA-256 of the exact body bytes that go
/// on the wire. The string is signed RSASSA-PKCS1-v1_5 with SHA-256 and
/// emitted as base64. One algorithm, one code path: a signing failure is
/// fatal for the enclosing call and is never papered over by a fallback
/// implementation.
#[derive(Debug)]
pub struct RequestSigner {
    signing_key: SigningKey<Sha256>,
}

impl RequestSigner {
    /// Build a signer from private-key material.
    ///
    /// Accepts PEM (PKCS#8 `PRIVATE KEY` or PKCS#1 `RSA PRIVATE KEY`) as
    /// well as a bare base64 DER blob, which is how the key arrives from
    /// some secret stores that strip PEM armor.
    pub fn from_key_material(material: &str) -> Result<Self> {
        let key = parse_private_key(material)?;
        Ok(Self {
            signing_key: SigningKey::<Sha256>::new(key),
        })
    }

    /// Sign one request. Returns the base64 signature.
    pub fn sign(&self, method: &str, path: &str, body: &[u8], timestamp: &str) -> Result<String> {
        let digest = hex::encode(Sha256::digest(body));
        let payload = format!("{}:{}:{}:{}", method, path, digest, timestamp);

        let signature = self
            .signing_key
            .try_sign(payload.as_bytes())
            .map_err(|e| AppError::signing(format!("RSA signing failed: {}", e)))?;

        Ok(BASE64.encode(signature.to_vec()))
    }

    /// Construct a complete signed request: timestamp and request id from
    /// the gateway clock, signature over the given body bytes.
    pub fn sign_request(
        &self,
        method: &str,
        path: &str,
        body: String,
        partner_id: &str,
        request_id: String,
    ) -> Result<SignedRequest> {
        let timestamp = clock::timestamp();
        let signature = self.sign(method, path, body.as_bytes(), &timestamp)?;

        Ok(SignedRequest {
            method: method.to_string(),
            path: path.to_string(),
            body,
            timestamp,
            signature,
            request_id,
            partner_id: partner_id.to_string(),
        })
    }
}

/// Normalize key material into an `RsaPrivateKey`.
///
/// PEM input is parsed as PKCS#8 first, then PKCS#1. Bare input is
/// base64-decoded to DER and tried the same way.
fn parse_private_key(material: &str) -> Result<RsaPrivateKey> {
    let material = material.trim();

    if material.contains("-----BEGIN") {
        return RsaPrivateKey::from_pkcs8_pem(material)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(material))
            .map_err(|e| AppError::signing(format!("private key PEM is not parseable: {}", e)));
    }

    let stripped: String = material.chars().filter(|c| !c.is_whitespace()).collect();
    let der = BASE64
        .decode(stripped.as_bytes())
        .map_err(|e| AppError::signing(format!("private key is not PEM or base64: {}", e)))?;

    RsaPrivateKey::from_pkcs8_der(&der)
        .or_else(|_| RsaPrivateKey::from_pkcs1_der(&der))
        .map_err(|e| AppError::signing(format!("private key DER is not parseable: {}", e)))
}
