// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Local Decision Cache
//!
//! The per-host persistent cache tier: one directory per installation, one
//! file per fingerprint.
//!
//! ## File Format
//!
//! ```text
//! offset  size  field
//! 0       4     magic "AMSZ"
//! 4       2     schema version (little-endian)
//! 6       8     creation timestamp, Unix microseconds (little-endian)
//! 14      8     TTL in seconds (little-endian)
//! 22      N     JSON-encoded CacheEntry payload
//! ```
//!
//! The binary header lets expiry and format checks run without parsing
//! JSON. The file name carries the schema version as a prefix
//! (`<version>-<hex_fingerprint>.entry`), so a format migration presents
//! as a clean miss without even opening old files.
//!
//! ## Concurrency
//!
//! Writes are atomic: the entry is written to a temp file in the same
//! directory and renamed into place. Reads are lock-free; there is no
//! cross-process lock, so a torn read presents as corruption and the file
//! is unlinked. Expired and corrupt entries are both deleted on read, so
//! the directory is self-cleaning.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use amorsize_domain::{
    AmorsizeError, CacheEntry, CacheLookup, Decision, DecisionCache, Fingerprint, HostSnapshot,
    MissReason, CACHE_SCHEMA_VERSION,
};

/// File magic identifying an amorsize cache entry.
const MAGIC: [u8; 4] = *b"AMSZ";

/// Header length in bytes: magic + version + timestamp + TTL.
const HEADER_LEN: usize = 4 + 2 + 8 + 8;

/// Per-host persistent decision store.
pub struct LocalDecisionCache {
    root: PathBuf,
    ttl: Duration,
}

impl LocalDecisionCache {
    /// Opens (and lazily creates) a cache rooted at `root`.
    ///
    /// # Arguments
    /// * `root` - Directory holding the entry files
    /// * `ttl` - Expiry applied when reading entries back
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            root: root.into(),
            ttl,
        }
    }

    /// The configured entry TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root
            .join(format!("{}-{}.entry", CACHE_SCHEMA_VERSION, fingerprint.to_hex()))
    }

    fn encode_entry(entry: &CacheEntry, ttl: Duration) -> Result<Vec<u8>, AmorsizeError> {
        let payload = entry.to_json()?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&entry.schema_version().to_le_bytes());
        bytes.extend_from_slice(&entry.created_at_micros().to_le_bytes());
        bytes.extend_from_slice(&ttl.as_secs().to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Parses the binary header, returning `(created_at_micros,
    /// ttl_seconds, payload)`.
    fn decode_header(bytes: &[u8]) -> Result<(i64, u64, &[u8]), AmorsizeError> {
        if bytes.len() < HEADER_LEN {
            return Err(AmorsizeError::cache_corrupt("file shorter than header"));
        }
        if bytes[0..4] != MAGIC {
            return Err(AmorsizeError::cache_corrupt("bad magic"));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != CACHE_SCHEMA_VERSION {
            return Err(AmorsizeError::cache_corrupt(format!(
                "schema version {} does not match {}",
                version, CACHE_SCHEMA_VERSION
            )));
        }
        let mut created_bytes = [0u8; 8];
        created_bytes.copy_from_slice(&bytes[6..14]);
        let mut ttl_bytes = [0u8; 8];
        ttl_bytes.copy_from_slice(&bytes[14..22]);
        Ok((
            i64::from_le_bytes(created_bytes),
            u64::from_le_bytes(ttl_bytes),
            &bytes[HEADER_LEN..],
        ))
    }

    fn unlink_quietly(path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to unlink cache entry");
            }
        }
    }

    /// True when a file name (without directory) matches a clear pattern.
    fn name_matches(name: &str, pattern: &str) -> bool {
        let Some(stem) = name.strip_suffix(".entry") else {
            return false;
        };
        let Some((_, hex)) = stem.split_once('-') else {
            return false;
        };
        if pattern == "*" {
            return true;
        }
        match pattern.strip_suffix('*') {
            Some(prefix) => hex.starts_with(prefix),
            None => hex == pattern,
        }
    }
}

impl DecisionCache for LocalDecisionCache {
    fn load(&self, fingerprint: &Fingerprint, current_host: &HostSnapshot) -> CacheLookup {
        let path = self.entry_path(fingerprint);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return CacheLookup::Miss(MissReason::NotFound);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache read failed; treating as miss");
                return CacheLookup::Miss(MissReason::NotFound);
            }
        };

        let (created, ttl_secs, payload) = match Self::decode_header(&bytes) {
            Ok(parts) => parts,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt cache entry removed");
                Self::unlink_quietly(&path);
                return CacheLookup::Miss(MissReason::Corrupt);
            }
        };

        let entry = match CacheEntry::from_json(payload) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt cache payload removed");
                Self::unlink_quietly(&path);
                return CacheLookup::Miss(MissReason::Corrupt);
            }
        };

        let now = Utc::now().timestamp_micros();
        if entry.is_expired(now, Duration::from_secs(ttl_secs)) {
            debug!(fingerprint = %fingerprint, age_micros = now - created, "expired cache entry removed");
            Self::unlink_quietly(&path);
            return CacheLookup::Miss(MissReason::Expired);
        }

        if !entry.is_compatible_with(current_host) {
            // The entry may still be valid for the host that wrote it;
            // leave the file alone.
            return CacheLookup::Miss(MissReason::HostMismatch);
        }

        CacheLookup::Hit(entry.into_decision())
    }

    fn save(
        &self,
        fingerprint: &Fingerprint,
        decision: &Decision,
        host: &HostSnapshot,
        ttl: Duration,
    ) -> Result<(), AmorsizeError> {
        fs::create_dir_all(&self.root)?;

        let entry = CacheEntry::new(decision.clone(), *host);
        let bytes = Self::encode_entry(&entry, ttl)?;

        // Atomic publish: temp file in the same directory, then rename.
        let path = self.entry_path(fingerprint);
        let tmp = self.root.join(format!(
            ".{}-{}.tmp.{}",
            CACHE_SCHEMA_VERSION,
            fingerprint.to_hex(),
            std::process::id()
        ));
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path).map_err(|e| {
            Self::unlink_quietly(&tmp);
            AmorsizeError::io_error(format!("publishing cache entry failed: {}", e))
        })?;

        debug!(fingerprint = %fingerprint, bytes = bytes.len(), "cache entry written");
        Ok(())
    }

    fn clear(&self, pattern: &str) -> Result<usize, AmorsizeError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0usize;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if Self::name_matches(name, pattern) {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
