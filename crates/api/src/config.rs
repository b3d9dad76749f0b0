//! Process configuration, read once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use placement_auth::Hs256CredentialStore;
use placement_observability::LogFormat;

const DEV_SECRET: &str = "placement-dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set (or PLACEMENT_ALLOW_DEV_SECRET=1 for local development)")]
    MissingSecret,

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    /// True when `jwt_secret` is the built-in development value.
    pub using_dev_secret: bool,
    pub bind_addr: SocketAddr,
    /// Absent means the in-memory store.
    pub database_url: Option<String>,
    pub token_ttl: chrono::Duration,
    /// Absent means no background reconciliation.
    pub reconcile_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("using_dev_secret", &self.using_dev_secret)
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("token_ttl", &self.token_ttl)
            .field("reconcile_interval", &self.reconcile_interval)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_u64(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let allow_dev = non_empty("PLACEMENT_ALLOW_DEV_SECRET").is_some_and(|v| v.trim() == "1");
        let (jwt_secret, using_dev_secret) = match non_empty("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if allow_dev => (DEV_SECRET.to_string(), true),
            None => return Err(ConfigError::MissingSecret),
        };

        let bind_addr = non_empty("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let ttl_secs = match non_empty("TOKEN_TTL_SECS") {
            Some(raw) => parse_u64("TOKEN_TTL_SECS", &raw)?,
            None => Hs256CredentialStore::DEFAULT_TTL_SECS as u64,
        };
        if ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                reason: "must be positive".to_string(),
            });
        }
        let token_ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or(ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                reason: "out of range".to_string(),
            })?;

        let reconcile_interval = match non_empty("RECONCILE_INTERVAL_SECS") {
            Some(raw) => match parse_u64("RECONCILE_INTERVAL_SECS", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        let log_format = match non_empty("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|reason| ConfigError::Invalid { name: "LOG_FORMAT", reason })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            jwt_secret,
            using_dev_secret,
            bind_addr,
            database_url: non_empty("DATABASE_URL"),
            token_ttl,
            reconcile_interval,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn secret_is_required() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::MissingSecret);
        assert_eq!(load(&[("JWT_SECRET", "  ")]).unwrap_err(), ConfigError::MissingSecret);
    }

    #[test]
    fn dev_secret_needs_explicit_opt_in() {
        let cfg = load(&[("PLACEMENT_ALLOW_DEV_SECRET", "1")]).unwrap();
        assert!(cfg.using_dev_secret);
        assert_eq!(cfg.jwt_secret, DEV_SECRET);
    }

    #[test]
    fn defaults_apply() {
        let cfg = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.token_ttl, chrono::Duration::days(1));
        assert_eq!(cfg.reconcile_interval, None);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(!cfg.using_dev_secret);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = load(&[
            ("JWT_SECRET", "s3cret"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/placements"),
            ("TOKEN_TTL_SECS", "3600"),
            ("RECONCILE_INTERVAL_SECS", "300"),
            ("LOG_FORMAT", "pretty"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.token_ttl, chrono::Duration::hours(1));
        assert_eq!(cfg.reconcile_interval, Some(Duration::from_secs(300)));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.database_url.is_some());
        assert!(!format!("{cfg:?}").contains("s3cret"));
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = load(&[("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_SECS", .. }));

        let err = load(&[("JWT_SECRET", "s"), ("BIND_ADDR", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));
    }

    #[test]
    fn oversized_ttl_is_rejected_not_wrapped() {
        for raw in ["18446744073709551615", "9223372036854775807"] {
            let err = load(&[("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", raw)]).unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    name: "TOKEN_TTL_SECS",
                    reason: "out of range".to_string(),
                }
            );
        }

        let cfg = load(&[("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", "31536000")]).unwrap();
        assert_eq!(cfg.token_ttl, chrono::Duration::days(365));
    }
}
