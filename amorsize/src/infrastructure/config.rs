// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Configuration
//!
//! Runtime configuration of the advisor's infrastructure pieces: where the
//! local cache lives, whether a shared cache is wired up, and the TTL and
//! timeout defaults.
//!
//! ## Sources and Precedence
//!
//! Configuration is programmatic-first: construct an [`AmorsizeConfig`],
//! adjust fields, hand it to the coordinator. [`AmorsizeConfig::from_env`]
//! additionally honors the optional environment surface:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `AMORSIZE_CACHE_DIR` | Local cache directory |
//! | `AMORSIZE_SHARED_CACHE_URL` | Shared cache endpoint (`redis://host:port`) |
//! | `AMORSIZE_DEFAULT_TTL_SECONDS` | Cache entry TTL |
//!
//! A malformed TTL value is logged and ignored rather than failing
//! startup; configuration trouble must never make planning impossible.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use amorsize_domain::AmorsizeError;

/// Environment variable naming the local cache directory.
pub const ENV_CACHE_DIR: &str = "AMORSIZE_CACHE_DIR";

/// Environment variable naming the shared cache endpoint.
pub const ENV_SHARED_CACHE_URL: &str = "AMORSIZE_SHARED_CACHE_URL";

/// Environment variable overriding the default cache TTL.
pub const ENV_DEFAULT_TTL_SECONDS: &str = "AMORSIZE_DEFAULT_TTL_SECONDS";

/// Default cache entry TTL: seven days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default socket timeout for shared-cache transports.
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(5);

/// Default key namespace prefix in the shared store.
pub const DEFAULT_KEY_PREFIX: &str = "amorsize";

/// Infrastructure configuration for one advisor instance.
#[derive(Debug, Clone)]
pub struct AmorsizeConfig {
    /// Directory holding the local cache, one file per fingerprint.
    pub cache_dir: PathBuf,
    /// Shared cache endpoint; `None` disables the shared tier.
    pub shared_cache_url: Option<String>,
    /// TTL applied to new cache entries on both tiers.
    pub default_ttl: Duration,
    /// Namespace prefix for shared-store keys.
    pub key_prefix: String,
    /// Socket timeout for every shared-cache operation.
    pub socket_timeout: Duration,
}

impl AmorsizeConfig {
    /// Builds the configuration from defaults plus the optional
    /// environment surface.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var(ENV_CACHE_DIR) {
            if !dir.is_empty() {
                config.cache_dir = PathBuf::from(dir);
            }
        }

        if let Ok(url) = env::var(ENV_SHARED_CACHE_URL) {
            if !url.is_empty() {
                config.shared_cache_url = Some(url);
            }
        }

        if let Ok(raw) = env::var(ENV_DEFAULT_TTL_SECONDS) {
            match raw.parse::<u64>() {
                Ok(seconds) if seconds > 0 => {
                    config.default_ttl = Duration::from_secs(seconds);
                }
                _ => {
                    warn!(
                        value = %raw,
                        "ignoring malformed {}; keeping default TTL",
                        ENV_DEFAULT_TTL_SECONDS
                    );
                }
            }
        }

        config
    }

    /// Validates internal consistency.
    ///
    /// # Errors
    /// [`AmorsizeError::InvalidInput`] when a field is unusable.
    pub fn validate(&self) -> Result<(), AmorsizeError> {
        if self.default_ttl.is_zero() {
            return Err(AmorsizeError::invalid_input("cache TTL must be positive"));
        }
        if self.key_prefix.is_empty() {
            return Err(AmorsizeError::invalid_input(
                "shared-cache key prefix must not be empty",
            ));
        }
        if self.key_prefix.contains('*') {
            return Err(AmorsizeError::invalid_input(
                "shared-cache key prefix must not contain wildcards",
            ));
        }
        Ok(())
    }

    /// Default local cache directory: `$XDG_CACHE_HOME/amorsize`, then
    /// `~/.cache/amorsize`, then a temp-dir fallback.
    fn default_cache_dir() -> PathBuf {
        if let Ok(xdg) = env::var("XDG_CACHE_HOME") {
            if !xdg.is_empty() {
                return PathBuf::from(xdg).join("amorsize");
            }
        }
        if let Ok(home) = env::var("HOME") {
            if !home.is_empty() {
                return PathBuf::from(home).join(".cache").join("amorsize");
            }
        }
        env::temp_dir().join("amorsize")
    }
}

impl Default for AmorsizeConfig {
    fn default() -> Self {
        Self {
            cache_dir: Self::default_cache_dir(),
            shared_cache_url: None,
            default_ttl: DEFAULT_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            socket_timeout: DEFAULT_SOCKET_TIMEOUT,
        }
    }
}
