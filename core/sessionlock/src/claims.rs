//! Reading the device key out of a JWT payload.
//!
//! Only the `publicKey` claim matters here. The JWT's own signature and every
//! other claim belong to the issuer and are left alone.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;

use crate::error::{SessionLockError, SessionLockResult};

/// Name of the claim carrying the device public key.
pub const PUBLIC_KEY_CLAIM: &str = "publicKey";

/// base64url as used by JWT segments, tolerating issuers that pad.
const JWT_SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes a JWT payload segment into its JSON claims object.
pub(crate) fn decode_payload(segment: &str) -> SessionLockResult<serde_json::Map<String, Value>> {
    let bytes = JWT_SEGMENT.decode(segment).map_err(|e| {
        SessionLockError::MalformedToken(format!("invalid JWT payload base64: {e}"))
    })?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(_) => Err(SessionLockError::MalformedToken(
            "JWT payload is not a JSON object".to_string(),
        )),
        Err(e) => Err(SessionLockError::MalformedToken(format!(
            "invalid JWT payload JSON: {e}"
        ))),
    }
}

/// Returns the base64 public key the issuer bound into the payload.
pub(crate) fn public_key_claim(segment: &str) -> SessionLockResult<String> {
    let claims = decode_payload(segment)?;
    match claims.get(PUBLIC_KEY_CLAIM) {
        Some(Value::String(key)) if !key.is_empty() => Ok(key.clone()),
        Some(_) => Err(SessionLockError::MalformedToken(format!(
            "`{PUBLIC_KEY_CLAIM}` claim is not a non-empty string"
        ))),
        None => Err(SessionLockError::MalformedToken(format!(
            "JWT payload has no `{PUBLIC_KEY_CLAIM}` claim"
        ))),
    }
}
