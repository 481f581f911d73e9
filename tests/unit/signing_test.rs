// Signature determinism and key-material normalization for the canonical
// signing engine. The signature must be a function of exactly
// (method, path, body bytes, timestamp, key) and nothing else.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use paybridge::core::AppError;
use paybridge::modules::gateway::services::RequestSigner;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::Verifier;
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};

const PKCS8_PEM: &str = include_str!("../fixtures/test_rsa_pkcs8.pem");
const PKCS1_PEM: &str = include_str!("../fixtures/test_rsa_pkcs1.pem");
const BARE_BASE64: &str = include_str!("../fixtures/test_rsa_bare_base64.txt");

const METHOD: &str = "POST";
const PATH: &str = "/payment/v1.0/cc/create";
const TIMESTAMP: &str = "2026-08-07T10:30:00.123+07:00";
const BODY: &[u8] = br#"{"partnerId":"P001","merchantTradeNo":"TRD-1","amount":790000}"#;

#[test]
fn same_inputs_same_signature() {
    let signer = RequestSigner::from_key_material(PKCS8_PEM).unwrap();
    let first = signer.sign(METHOD, PATH, BODY, TIMESTAMP).unwrap();
    let second = signer.sign(METHOD, PATH, BODY, TIMESTAMP).unwrap();
    assert_eq!(first, second);
}

#[test]
fn every_input_influences_the_signature() {
    let signer = RequestSigner::from_key_material(PKCS8_PEM).unwrap();
    let baseline = signer.sign(METHOD, PATH, BODY, TIMESTAMP).unwrap();

    let changed_method = signer.sign("GET", PATH, BODY, TIMESTAMP).unwrap();
    let changed_path = signer
        .sign(METHOD, "/payment/v1.0/cc/query", BODY, TIMESTAMP)
        .unwrap();
    let changed_body = signer
        .sign(METHOD, PATH, br#"{"amount":790001}"#, TIMESTAMP)
        .unwrap();
    let changed_timestamp = signer
        .sign(METHOD, PATH, BODY, "2026-08-07T10:30:01.123+07:00")
        .unwrap();

    for other in [changed_method, changed_path, changed_body, changed_timestamp] {
        assert_ne!(baseline, other);
    }
}

#[test]
fn all_three_key_forms_sign_identically() {
    let from_pkcs8 = RequestSigner::from_key_material(PKCS8_PEM).unwrap();
    let from_pkcs1 = RequestSigner::from_key_material(PKCS1_PEM).unwrap();
    let from_bare = RequestSigner::from_key_material(BARE_BASE64).unwrap();

    let a = from_pkcs8.sign(METHOD, PATH, BODY, TIMESTAMP).unwrap();
    let b = from_pkcs1.sign(METHOD, PATH, BODY, TIMESTAMP).unwrap();
    let c = from_bare.sign(METHOD, PATH, BODY, TIMESTAMP).unwrap();

    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn signature_verifies_over_the_canonical_string() {
    let signer = RequestSigner::from_key_material(PKCS8_PEM).unwrap();
    let signature_b64 = signer.sign(METHOD, PATH, BODY, TIMESTAMP).unwrap();

    // Reconstruct the signing input the way the processor does.
    let digest = hex::encode(Sha256::digest(BODY));
    let payload = format!("{}:{}:{}:{}", METHOD, PATH, digest, TIMESTAMP);

    let key = RsaPrivateKey::from_pkcs8_pem(PKCS8_PEM).unwrap();
    let verifying_key = VerifyingKey::<Sha256>::new(key.to_public_key());

    let raw = BASE64.decode(signature_b64).unwrap();
    let signature = Signature::try_from(raw.as_slice()).unwrap();
    verifying_key
        .verify(payload.as_bytes(), &signature)
        .expect("signature must verify against the canonical string");
}

#[test]
fn digest_is_lower_case_hex() {
    // Guard against an upper-case digest sneaking into the signing string:
    // sign with a manually lower-cased digest and verify equality.
    let signer = RequestSigner::from_key_material(PKCS8_PEM).unwrap();
    let signature_b64 = signer.sign(METHOD, PATH, BODY, TIMESTAMP).unwrap();

    let digest = hex::encode(Sha256::digest(BODY));
    assert_eq!(digest, digest.to_lowercase());

    let payload = format!("{}:{}:{}:{}", METHOD, PATH, digest, TIMESTAMP);
    let key = RsaPrivateKey::from_pkcs8_pem(PKCS8_PEM).unwrap();
    let verifying_key = VerifyingKey::<Sha256>::new(key.to_public_key());
    let raw = BASE64.decode(signature_b64).unwrap();
    let signature = Signature::try_from(raw.as_slice()).unwrap();
    assert!(verifying_key.verify(payload.as_bytes(), &signature).is_ok());
}

#[test]
fn unusable_key_material_is_a_signing_error() {
    for material in ["", "definitely not a key", "aGVsbG8="] {
        match RequestSigner::from_key_material(material) {
            Err(AppError::Signing(_)) => {}
            other => panic!("expected Signing error, got {:?}", other.map(|_| ())),
        }
    }
}
