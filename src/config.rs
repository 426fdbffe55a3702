// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`Settings`] structure loaded from the environment at startup. Any error
//! here is fatal: the server refuses to start rather than run with a weak or
//! missing signing key.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC-SHA256 token signing key (at least 32 bytes) | Required |
//! | `TOKEN_TTL_SECS` | Lifetime of issued tokens | `3600` |
//! | `BCRYPT_COST` | bcrypt work factor (4..=31) | `12` |
//! | `REVOCATION_SWEEP_SECS` | Interval between revocation purges | `60` |
//! | `BOOTSTRAP_ADMIN_USERNAME` | Seed an admin account at startup | Optional |
//! | `BOOTSTRAP_ADMIN_PASSWORD` | Password for the seeded admin | Optional |
//! | `BOOTSTRAP_ADMIN_EMAIL` | Email for the seeded admin | `admin@localhost` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::time::Duration;

use crate::auth::codec::MIN_SECRET_LEN;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const SWEEP_INTERVAL_ENV: &str = "REVOCATION_SWEEP_SECS";
pub const BOOTSTRAP_ADMIN_USERNAME_ENV: &str = "BOOTSTRAP_ADMIN_USERNAME";
pub const BOOTSTRAP_ADMIN_PASSWORD_ENV: &str = "BOOTSTRAP_ADMIN_PASSWORD";
pub const BOOTSTRAP_ADMIN_EMAIL_ENV: &str = "BOOTSTRAP_ADMIN_EMAIL";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("JWT_SECRET must be at least {min} bytes, got {len}")]
    WeakSecret { len: usize, min: usize },
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Token signing key. Never printed.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([REDACTED])")
    }
}

/// Credentials for the optional admin account seeded at startup.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Authentication settings shared by the codec, verifier and revocation sweeper.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: SigningSecret,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub sweep_interval: Duration,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AuthSettings {
    /// Settings with defaults for everything but the key.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SigningSecret::new(secret),
            token_ttl: DEFAULT_TOKEN_TTL,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            bootstrap_admin: None,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub auth: AuthSettings,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, PORT_ENV, DEFAULT_PORT)?;

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        let secret = lookup(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret {
                len: secret.len(),
                min: MIN_SECRET_LEN,
            });
        }

        let ttl_secs = parse_or(&lookup, TOKEN_TTL_ENV, DEFAULT_TOKEN_TTL.as_secs())?;
        if ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                var: TOKEN_TTL_ENV,
                value: ttl_secs.to_string(),
            });
        }

        let bcrypt_cost = parse_or(&lookup, BCRYPT_COST_ENV, DEFAULT_BCRYPT_COST)?;
        if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                var: BCRYPT_COST_ENV,
                value: bcrypt_cost.to_string(),
            });
        }

        let sweep_secs = parse_or(&lookup, SWEEP_INTERVAL_ENV, DEFAULT_SWEEP_INTERVAL.as_secs())?;
        if sweep_secs == 0 {
            return Err(ConfigError::Invalid {
                var: SWEEP_INTERVAL_ENV,
                value: sweep_secs.to_string(),
            });
        }

        let bootstrap_admin = match (
            lookup(BOOTSTRAP_ADMIN_USERNAME_ENV),
            lookup(BOOTSTRAP_ADMIN_PASSWORD_ENV),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin {
                username,
                password,
                email: lookup(BOOTSTRAP_ADMIN_EMAIL_ENV)
                    .unwrap_or_else(|| "admin@localhost".to_string()),
            }),
            (Some(_), None) => return Err(ConfigError::Missing(BOOTSTRAP_ADMIN_PASSWORD_ENV)),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            log_format,
            auth: AuthSettings {
                jwt_secret: SigningSecret::new(secret),
                token_ttl: Duration::from_secs(ttl_secs),
                bcrypt_cost,
                sweep_interval: Duration::from_secs(sweep_secs),
                bootstrap_admin,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "an-adequately-long-secret-for-hs256-signing";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let settings = Settings::from_lookup(lookup_from(&[(JWT_SECRET_ENV, SECRET)])).unwrap();
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert_eq!(settings.auth.token_ttl, DEFAULT_TOKEN_TTL);
        assert_eq!(settings.auth.bcrypt_cost, DEFAULT_BCRYPT_COST);
        assert!(settings.auth.bootstrap_admin.is_none());
    }

    #[test]
    fn missing_secret_is_fatal() {
        let err = Settings::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(JWT_SECRET_ENV)));
    }

    #[test]
    fn short_secret_is_fatal() {
        let err = Settings::from_lookup(lookup_from(&[(JWT_SECRET_ENV, "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::WeakSecret { len: 5, .. }));
    }

    #[test]
    fn overrides_are_parsed() {
        let settings = Settings::from_lookup(lookup_from(&[
            (JWT_SECRET_ENV, SECRET),
            (PORT_ENV, "9000"),
            (TOKEN_TTL_ENV, "600"),
            (BCRYPT_COST_ENV, "4"),
            (LOG_FORMAT_ENV, "json"),
            (BOOTSTRAP_ADMIN_USERNAME_ENV, "root"),
            (BOOTSTRAP_ADMIN_PASSWORD_ENV, "changeme123"),
        ]))
        .unwrap();

        assert_eq!(settings.port, 9000);
        assert_eq!(settings.auth.token_ttl, Duration::from_secs(600));
        assert_eq!(settings.auth.bcrypt_cost, 4);
        assert_eq!(settings.log_format, LogFormat::Json);
        let admin = settings.auth.bootstrap_admin.unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.email, "admin@localhost");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = Settings::from_lookup(lookup_from(&[
            (JWT_SECRET_ENV, SECRET),
            (BCRYPT_COST_ENV, "99"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: BCRYPT_COST_ENV, .. }));

        let err = Settings::from_lookup(lookup_from(&[
            (JWT_SECRET_ENV, SECRET),
            (PORT_ENV, "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: PORT_ENV, .. }));
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let settings = AuthSettings::with_secret(SECRET);
        assert!(!format!("{settings:?}").contains(SECRET));
    }
}
