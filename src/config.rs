// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup (a `.env` file is
//! read first when present).
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `STORAGE_BACKEND` | `mongodb` or `memory` | `mongodb` |
//! | `MONGODB_URI` | Full connection string, overrides the `DB_*` credentials | Optional |
//! | `DB_USER` / `DB_PASS` | Database credentials | Required without `MONGODB_URI` |
//! | `DB_HOST` | Cluster host for `mongodb+srv://` | Required without `MONGODB_URI` |
//! | `DB_NAME` | Database name | `smart_db` |
//! | `DB_APP_NAME` | Driver application name | `smart-deals-server` |
//! | `FIREBASE_PROJECT_ID` | Firebase project (token audience) | Required |
//! | `FIREBASE_JWKS_URL` | Signing key endpoint | Google securetoken JWKS |
//! | `AUTH_POLICY` | `compat` or `strict` | `compat` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

use crate::auth::{jwks::FIREBASE_JWKS_URL, PolicyMode};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";
pub const MONGODB_URI_ENV: &str = "MONGODB_URI";
pub const DB_USER_ENV: &str = "DB_USER";
pub const DB_PASS_ENV: &str = "DB_PASS";
pub const DB_HOST_ENV: &str = "DB_HOST";
pub const DB_NAME_ENV: &str = "DB_NAME";
pub const DB_APP_NAME_ENV: &str = "DB_APP_NAME";
pub const FIREBASE_PROJECT_ID_ENV: &str = "FIREBASE_PROJECT_ID";
pub const FIREBASE_JWKS_URL_ENV: &str = "FIREBASE_JWKS_URL";
pub const AUTH_POLICY_ENV: &str = "AUTH_POLICY";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_NAME: &str = "smart_db";
const DEFAULT_APP_NAME: &str = "smart-deals-server";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Where documents are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// In-process store; contents are lost on exit.
    Memory,
    Mongo {
        uri: String,
        database: String,
        app_name: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub firebase_project_id: String,
    pub jwks_url: String,
    pub policy_mode: PolicyMode,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host: IpAddr = var(HOST_ENV)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })?;
        let port = match var(PORT_ENV) {
            Some(port) => port.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let storage = match var(STORAGE_BACKEND_ENV).map(|b| b.to_lowercase()).as_deref() {
            None | Some("mongodb") | Some("mongo") => StorageConfig::Mongo {
                uri: match var(MONGODB_URI_ENV) {
                    Some(uri) => uri,
                    None => build_mongo_uri(
                        &var(DB_USER_ENV).ok_or(ConfigError::Missing(DB_USER_ENV))?,
                        &var(DB_PASS_ENV).ok_or(ConfigError::Missing(DB_PASS_ENV))?,
                        &var(DB_HOST_ENV).ok_or(ConfigError::Missing(DB_HOST_ENV))?,
                    )?,
                },
                database: var(DB_NAME_ENV).unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
                app_name: var(DB_APP_NAME_ENV).unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            },
            Some("memory") => StorageConfig::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: STORAGE_BACKEND_ENV,
                    reason: format!("unknown backend {other:?} (expected mongodb or memory)"),
                })
            }
        };

        let policy_mode = match var(AUTH_POLICY_ENV) {
            Some(mode) => mode.parse().map_err(|reason| ConfigError::Invalid {
                name: AUTH_POLICY_ENV,
                reason,
            })?,
            None => PolicyMode::default(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            storage,
            firebase_project_id: var(FIREBASE_PROJECT_ID_ENV)
                .ok_or(ConfigError::Missing(FIREBASE_PROJECT_ID_ENV))?,
            jwks_url: var(FIREBASE_JWKS_URL_ENV).unwrap_or_else(|| FIREBASE_JWKS_URL.to_string()),
            policy_mode,
        })
    }
}

/// `mongodb+srv://` URI for an Atlas cluster, credentials percent-encoded.
fn build_mongo_uri(user: &str, password: &str, host: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: DB_HOST_ENV,
        reason,
    };

    let mut uri = Url::parse(&format!("mongodb+srv://{host}/"))
        .map_err(|e| invalid(e.to_string()))?;
    uri.set_username(user)
        .map_err(|()| invalid("host does not accept credentials".to_string()))?;
    uri.set_password(Some(password))
        .map_err(|()| invalid("host does not accept credentials".to_string()))?;
    uri.query_pairs_mut()
        .append_pair("retryWrites", "true")
        .append_pair("w", "majority");
    Ok(uri.into())
}
