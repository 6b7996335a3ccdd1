mod common;

use common::fixed_private_key;
use sessionlock_crypto::{P256Provider, SigningAlgorithm, SigningProvider};

#[test]
fn private_key_debug_is_redacted() {
    let handle = fixed_private_key();
    let debug = format!("{handle:?}");
    assert!(debug.contains("REDACTED"));
    assert!(!debug.contains("1, 2, 3"));
}

#[tokio::test]
async fn public_key_debug_shows_base64() {
    let kp = P256Provider::new().generate_key_pair().await.unwrap();
    let debug = format!("{:?}", kp.public_key);
    assert!(debug.contains(&kp.public_key.to_base64()));
}

#[tokio::test]
async fn public_key_base64_is_standard_padded() {
    let kp = P256Provider::new().generate_key_pair().await.unwrap();
    let b64 = kp.public_key.to_base64();
    // 65 bytes -> 88 chars with one pad character
    assert_eq!(b64.len(), 88);
    assert!(b64.ends_with('='));
    assert!(!b64.contains('.'));
}

#[test]
fn algorithm_names() {
    assert_eq!(SigningAlgorithm::EcdsaP256Sha256.as_str(), "ES256");
    assert_eq!(
        serde_json::to_string(&SigningAlgorithm::EcdsaP256Sha256).unwrap(),
        "\"ES256\""
    );
}
