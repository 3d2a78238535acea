use super::credential::CredentialError;
use super::role::Role;

/// Attached to an admitted request so handlers know who got in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub role: Role,
    pub prefix: String,
}

/// Why a request to a protected prefix was refused.
///
/// Every variant is answered the same way (not-found); the kinds exist for logs and tests.
#[derive(Debug, thiserror::Error)]
pub enum Denial {
    #[error("no credential cookie")]
    MissingCredential,
    #[error("malformed credential: {0}")]
    MalformedCredential(#[from] CredentialError),
    #[error("roles claim missing or not a known role")]
    UnknownOrAbsentRole,
    #[error("role {role} is limited to {allowed}, requested {requested}")]
    PrefixMismatch {
        role: Role,
        allowed: String,
        requested: String,
    },
}

impl Denial {
    pub fn kind(&self) -> &'static str {
        match self {
            Denial::MissingCredential => "missing_credential",
            Denial::MalformedCredential(_) => "malformed_credential",
            Denial::UnknownOrAbsentRole => "unknown_or_absent_role",
            Denial::PrefixMismatch { .. } => "prefix_mismatch",
        }
    }
}

#[derive(Debug)]
pub enum GateDecision {
    /// Path is not protected.
    PassThrough,
    Admit(Admission),
    Deny(Denial),
}
