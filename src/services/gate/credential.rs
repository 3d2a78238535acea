//! Credential payload decoding.
//!
//! The credential is a compact JWS (`header.payload.signature`). Only the payload is
//! read and the signature is never checked: trust in the claims is delegated to the
//! issuer that set the cookie.

use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};

use super::role::Role;

// base64url, with or without trailing '='
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const ROLES_CLAIM: &str = "roles";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("expected 3 dot-separated segments, found {0}")]
    SegmentCount(usize),
    #[error("payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not a json object")]
    NotAnObject,
}

/// Decoded (unverified) credential claims.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialClaims {
    claims: Map<String, Value>,
}

impl CredentialClaims {
    pub fn decode(token: &str) -> Result<Self, CredentialError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [_header, payload, _signature] = segments.as_slice() else {
            return Err(CredentialError::SegmentCount(segments.len()));
        };

        let bytes = PAYLOAD_ENGINE.decode(payload)?;
        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(claims) => Ok(Self { claims }),
            _ => Err(CredentialError::NotAnObject),
        }
    }

    /// The `roles` claim, if it is a string naming a known role.
    ///
    /// Arrays are not accepted: a credential carries exactly one role.
    pub fn role(&self) -> Option<Role> {
        match self.claims.get(ROLES_CLAIM)? {
            Value::String(label) => label.parse().ok(),
            _ => None,
        }
    }
}
