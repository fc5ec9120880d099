//! Found-prime cache for repeated renders.
//!
//! The prime search is the only expensive step of a render. A 200×200
//! image seeds a 40 000-digit search that can run for minutes, while
//! decoding and writing the page take milliseconds. This module lets
//! `render` skip the search when the same digits were searched before with
//! parameters that could not change the answer.
//!
//! # Design
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: entries are keyed by the digit
//! string, not by the input file path, so renaming or copying a bitmap
//! keeps its entry and two bitmaps that decode to the same digits share
//! one.
//!
//! - **`digits_hash`**: SHA-256 of the canonical digit string.
//! - **`params_hash`**: SHA-256 of the search parameters that can change
//!   which candidate is accepted: the Miller–Rabin round count and the base
//!   derivation version. Sieve bound, window size, caps and deadlines only
//!   change how fast the answer is found, so they are not part of the key.
//!
//! A cache hit requires an entry with matching hashes whose stored prime
//! parses and is at least the seed. Anything else is a miss.
//!
//! ## Storage
//!
//! A JSON file at `<cache-dir>/prime-cache.json`. An unreadable file or a
//! different format version is treated as an empty cache.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `render` to force a fresh search. The lookup is
//! skipped, but the new result is merged into the existing file, so entries
//! for other images survive.

use crate::bigint::BigUint;
use crate::prime::BASE_DERIVATION_VERSION;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache file within the cache directory.
const CACHE_FILENAME: &str = "prime-cache.json";

/// Version of the cache file format. Bump this to invalidate all existing
/// caches when the format or key computation changes.
const CACHE_VERSION: u32 = 1;

/// A single cached search result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub digits_hash: String,
    pub params_hash: String,
    /// The prime, in decimal.
    pub prime: String,
}

/// On-disk cache mapping `"{digits_hash}:{params_hash}"` to results.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PrimeCache {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl PrimeCache {
    /// Create an empty cache (used on the first run).
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the cache directory. Returns an empty cache if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(cache_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(cache_path(cache_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let cache: Self = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        if cache.version != CACHE_VERSION {
            return Self::empty();
        }
        cache
    }

    /// Save to the cache directory, creating it if needed.
    pub fn save(&self, cache_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(cache_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_path(cache_dir), json)
    }

    /// Look up the prime found for these hashes.
    ///
    /// The stored value is re-parsed and must be at least `seed`; an entry
    /// that fails either check is ignored.
    pub fn lookup(&self, digits_hash: &str, params_hash: &str, seed: &BigUint) -> Option<BigUint> {
        let entry = self.entries.get(&content_key(digits_hash, params_hash))?;
        let prime = BigUint::parse(&entry.prime).ok()?;
        (prime >= *seed).then_some(prime)
    }

    /// Record the prime found for these hashes, replacing any older entry.
    pub fn insert(&mut self, digits_hash: String, params_hash: String, prime: &BigUint) {
        self.entries.insert(
            content_key(&digits_hash, &params_hash),
            CacheEntry {
                digits_hash,
                params_hash,
                prime: prime.to_string(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn content_key(digits_hash: &str, params_hash: &str) -> String {
    format!("{}:{}", digits_hash, params_hash)
}

/// SHA-256 hash of the canonical digit string, as hex.
pub fn hash_digits(digits: &str) -> String {
    format!("{:x}", Sha256::digest(digits.as_bytes()))
}

/// SHA-256 hash of the search parameters that affect the result.
pub fn hash_search_params(rounds: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"next-prime\0");
    hasher.update(rounds.to_le_bytes());
    hasher.update(BASE_DERIVATION_VERSION.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of cache use for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} searched ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} searched", self.misses)
        }
    }
}

/// Resolve the cache file path for a cache directory.
pub fn cache_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(CACHE_FILENAME)
}
