/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, HTTP 制限, Gate 設定など)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::gate::{GateConfig, GateConfigError, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
    Gate(GateConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Gate(e) => write!(f, "invalid gate configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Gate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GateConfigError> for ConfigError {
    fn from(e: GateConfigError) -> Self {
        ConfigError::Gate(e)
    }
}

/// Limits for the HTTP middleware stack.
#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub http: HttpLimits,
    pub gate: GateConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let defaults = HttpLimits::default();
        let http = HttpLimits {
            request_timeout: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            body_limit_bytes: std::env::var("REQUEST_BODY_LIMIT_BYTES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.body_limit_bytes),
        };

        let gate = gate_config_from_vars(
            std::env::var("GATE_ROLE_PREFIXES").ok().as_deref(),
            std::env::var("GATE_PROTECTED_PREFIXES").ok().as_deref(),
            std::env::var("GATE_NOT_FOUND_PATH").ok(),
            std::env::var("GATE_COOKIE_NAME").ok(),
        )?;

        Ok(Self {
            addr,
            app_env,
            http,
            gate,
        })
    }
}

/// Build the gate configuration from raw variable values, falling back to defaults.
///
/// - role prefixes: `USER=/user,ADMIN=/admin,MANAGER=/manager`
/// - protected prefixes: `/user,/admin,/manager` (defaults to the role prefixes)
fn gate_config_from_vars(
    role_prefixes: Option<&str>,
    protected_prefixes: Option<&str>,
    not_found_path: Option<String>,
    cookie_name: Option<String>,
) -> Result<GateConfig, ConfigError> {
    let defaults = GateConfig::default();

    let role_prefixes = match role_prefixes {
        Some(raw) => parse_role_prefixes(raw)?,
        None => defaults.role_prefixes,
    };

    let protected_prefixes = match protected_prefixes {
        Some(raw) => split_list(raw),
        None => role_prefixes.values().cloned().collect(),
    };

    let config = GateConfig {
        role_prefixes,
        protected_prefixes,
        not_found_path: not_found_path.unwrap_or(defaults.not_found_path),
        cookie_name: cookie_name.unwrap_or(defaults.cookie_name),
    };
    config.validate()?;

    Ok(config)
}

fn parse_role_prefixes(raw: &str) -> Result<BTreeMap<Role, String>, ConfigError> {
    split_list(raw)
        .into_iter()
        .map(|pair| -> Result<(Role, String), ConfigError> {
            let (role, prefix) = pair
                .split_once('=')
                .ok_or(ConfigError::Invalid("GATE_ROLE_PREFIXES"))?;
            let role = role
                .trim()
                .parse::<Role>()
                .map_err(|_| ConfigError::Invalid("GATE_ROLE_PREFIXES"))?;
            Ok((role, prefix.trim().to_string()))
        })
        .collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vars_give_default_gate() {
        let config = gate_config_from_vars(None, None, None, None).unwrap();
        assert_eq!(config, GateConfig::default());
    }

    #[test]
    fn role_prefixes_are_parsed() {
        let config = gate_config_from_vars(
            Some("USER=/me, ADMIN=/ops"),
            None,
            Some("/missing".to_string()),
            Some("session".to_string()),
        )
        .unwrap();

        assert_eq!(config.role_prefixes.get(&Role::User).unwrap(), "/me");
        assert_eq!(config.role_prefixes.get(&Role::Admin).unwrap(), "/ops");
        assert!(!config.role_prefixes.contains_key(&Role::Manager));
        assert_eq!(config.protected_prefixes, vec!["/me", "/ops"]);
        assert_eq!(config.not_found_path, "/missing");
        assert_eq!(config.cookie_name, "session");
    }

    #[test]
    fn protected_prefixes_can_exceed_role_prefixes() {
        let config =
            gate_config_from_vars(None, Some("/user,/admin,/manager,/billing"), None, None)
                .unwrap();
        assert_eq!(config.protected_prefixes.len(), 4);
    }

    #[test]
    fn unknown_role_label_is_rejected() {
        assert!(matches!(
            gate_config_from_vars(Some("OWNER=/owner"), None, None, None),
            Err(ConfigError::Invalid("GATE_ROLE_PREFIXES"))
        ));
        assert!(matches!(
            gate_config_from_vars(Some("USER"), None, None, None),
            Err(ConfigError::Invalid("GATE_ROLE_PREFIXES"))
        ));
    }

    #[test]
    fn invalid_gate_config_is_rejected() {
        assert!(matches!(
            gate_config_from_vars(None, None, Some("/user/404".to_string()), None),
            Err(ConfigError::Gate(GateConfigError::InvalidNotFoundPath(_)))
        ));
        assert!(matches!(
            gate_config_from_vars(None, Some("/user"), None, None),
            Err(ConfigError::Gate(GateConfigError::UnprotectedRolePrefix { .. }))
        ));
    }
}
