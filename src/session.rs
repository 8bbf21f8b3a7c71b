//! Bearer-token claims extraction.
//!
//! The stored token is only decoded to learn which user id to filter by.
//! Nothing here verifies a signature or an expiry, so the claims are
//! untrusted: the API must authorize every request on its own.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{BizError, Result};

/// URL-safe alphabet that tolerates both padded and unpadded segments
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims read from the token payload without verification
#[derive(Debug, Clone, PartialEq)]
pub struct UntrustedClaims {
    pub admin_id: String,
    pub expires_at: Option<i64>,
}

#[derive(Deserialize)]
struct RawClaims {
    #[serde(rename = "AdminID")]
    admin_id: Option<Value>,
    exp: Option<i64>,
}

/// Decode the payload segment of a dot-delimited token
pub fn decode_claims(token: &str) -> Result<UntrustedClaims> {
    let payload = token
        .trim()
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| BizError::InvalidToken("expected header.payload.signature".into()))?;

    let bytes = LENIENT_URL_SAFE
        .decode(payload)
        .map_err(|e| BizError::InvalidToken(format!("payload is not base64url: {e}")))?;

    let raw: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|e| BizError::InvalidToken(format!("payload is not JSON: {e}")))?;

    let admin_id = match raw.admin_id {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(BizError::InvalidToken("missing AdminID claim".into())),
    };

    Ok(UntrustedClaims {
        admin_id,
        expires_at: raw.exp,
    })
}
