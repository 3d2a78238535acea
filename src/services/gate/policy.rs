//! Route authorization policy: which paths are protected and which role may enter them.

use std::collections::BTreeMap;

use axum::http::Uri;

use super::credential::CredentialClaims;
use super::decision::{Admission, Denial, GateDecision};
use super::role::Role;

/// Immutable gate configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub role_prefixes: BTreeMap<Role, String>,
    pub protected_prefixes: Vec<String>,
    pub not_found_path: String,
    pub cookie_name: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        let role_prefixes: BTreeMap<Role, String> = Role::ALL
            .into_iter()
            .map(|role| (role, role.default_prefix().to_string()))
            .collect();
        let protected_prefixes = role_prefixes.values().cloned().collect();

        Self {
            role_prefixes,
            protected_prefixes,
            not_found_path: "/404".to_string(),
            cookie_name: "access_token".to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GateConfigError {
    #[error("invalid prefix {0:?} (must start with '/' and not end with '/')")]
    InvalidPrefix(String),
    #[error("prefix {prefix} for role {role} is not a protected prefix")]
    UnprotectedRolePrefix { role: Role, prefix: String },
    #[error(
        "invalid not-found path {0:?} (must be a plain absolute path outside protected prefixes)"
    )]
    InvalidNotFoundPath(String),
    #[error("cookie name must not be empty")]
    EmptyCookieName,
}

impl GateConfig {
    pub fn validate(&self) -> Result<(), GateConfigError> {
        for prefix in self
            .protected_prefixes
            .iter()
            .chain(self.role_prefixes.values())
        {
            if !prefix.starts_with('/') || prefix.ends_with('/') {
                return Err(GateConfigError::InvalidPrefix(prefix.clone()));
            }
        }

        for (role, prefix) in &self.role_prefixes {
            if !self.protected_prefixes.contains(prefix) {
                return Err(GateConfigError::UnprotectedRolePrefix {
                    role: *role,
                    prefix: prefix.clone(),
                });
            }
        }

        // A protected not-found target would deny its own rewrite.
        if parse_not_found_path(&self.not_found_path).is_none()
            || self
                .protected_prefixes
                .iter()
                .any(|p| path_is_under(&self.not_found_path, p))
        {
            return Err(GateConfigError::InvalidNotFoundPath(
                self.not_found_path.clone(),
            ));
        }

        if self.cookie_name.trim().is_empty() {
            return Err(GateConfigError::EmptyCookieName);
        }

        Ok(())
    }
}

/// The not-found target as a rewrite URI.
///
/// Must be a bare path: no query or fragment, and nothing the router would read as a
/// capture or wildcard.
fn parse_not_found_path(path: &str) -> Option<Uri> {
    if !path.starts_with('/') || path.contains(['{', '}', '*', ':', '?', '#']) {
        return None;
    }
    let uri = path.parse::<Uri>().ok()?;
    (uri.path() == path && uri.query().is_none()).then_some(uri)
}

/// `path` equals `prefix` or lies below it on a segment boundary.
pub fn path_is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Stateless per-request authorization gate.
#[derive(Debug, Clone)]
pub struct RouteGate {
    config: GateConfig,
    not_found_uri: Uri,
}

impl RouteGate {
    pub fn new(config: GateConfig) -> Result<Self, GateConfigError> {
        config.validate()?;
        let not_found_uri = parse_not_found_path(&config.not_found_path)
            .ok_or_else(|| GateConfigError::InvalidNotFoundPath(config.not_found_path.clone()))?;

        Ok(Self {
            config,
            not_found_uri,
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    pub fn not_found_path(&self) -> &str {
        &self.config.not_found_path
    }

    /// Rewrite target for denied requests.
    pub fn not_found_uri(&self) -> &Uri {
        &self.not_found_uri
    }

    /// The protected prefix covering `path`, if any.
    pub fn protected_prefix(&self, path: &str) -> Option<&str> {
        self.config
            .protected_prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| path_is_under(path, prefix))
    }

    pub fn prefix_for(&self, role: Role) -> Option<&str> {
        self.config.role_prefixes.get(&role).map(String::as_str)
    }

    /// Decide what happens to a request for `path` carrying `credential`.
    ///
    /// Pure: no I/O, no shared mutable state.
    pub fn evaluate(&self, path: &str, credential: Option<&str>) -> GateDecision {
        let Some(requested) = self.protected_prefix(path) else {
            return GateDecision::PassThrough;
        };

        match self.authorize(path, requested, credential) {
            Ok(admission) => GateDecision::Admit(admission),
            Err(denial) => GateDecision::Deny(denial),
        }
    }

    fn authorize(
        &self,
        path: &str,
        requested: &str,
        credential: Option<&str>,
    ) -> Result<Admission, Denial> {
        let token = credential
            .filter(|t| !t.is_empty())
            .ok_or(Denial::MissingCredential)?;

        let claims = CredentialClaims::decode(token)?;
        let role = claims.role().ok_or(Denial::UnknownOrAbsentRole)?;
        let allowed = self.prefix_for(role).ok_or(Denial::UnknownOrAbsentRole)?;

        if !path_is_under(path, allowed) {
            return Err(Denial::PrefixMismatch {
                role,
                allowed: allowed.to_string(),
                requested: requested.to_string(),
            });
        }

        Ok(Admission {
            role,
            prefix: allowed.to_string(),
        })
    }
}
