//! Bitmap to prime to page.
//!
//! ```text
//! bytes ─decode─▶ DigitGrid ─flatten─▶ "8181" ─parse─▶ BigUint ─search─▶ prime ─render─▶ HTML
//! ```
//!
//! Each stage hands its output to the next by value. [`prime_from_bitmap`]
//! is the pure core (bytes in, prime out, no filesystem); [`render_file`]
//! wraps it with file I/O and the found-prime cache.

use crate::bigint::{BigInt, BigUint, ParseBigIntError};
use crate::cache::{CacheStats, PrimeCache, hash_digits, hash_search_params};
use crate::config::{ConfigError, PrimeConfig};
use crate::prime::{SearchError, SearchEvent, SearchOptions, SearchOutcome, next_prime_with};
use crate::raster::{self, DigitGrid, FormatError, RasterHeader};
use crate::render::{RenderError, render_page, write_page};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("could not open {path}: {source}")]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unsupported file format: {0}")]
    Format(#[from] FormatError),
    #[error("not a valid number: {0}")]
    Parse(#[from] ParseBigIntError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("could not save cache in {path}: {source}")]
    Cache {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Input { .. } => 2,
            PipelineError::Format(_) => 3,
            PipelineError::Parse(_) => 6,
            PipelineError::Render(_) => 7,
            PipelineError::Cache { .. } => 8,
            PipelineError::Search(_) => 9,
            PipelineError::Config(_) => 10,
        }
    }
}

/// A decoded bitmap and the prime found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeImage {
    pub width: usize,
    pub height: usize,
    /// Canonical digit string, one digit per pixel, top row first.
    pub digits: String,
    pub prime: BigUint,
    /// `prime - seed`
    pub distance: u64,
}

impl PrimeImage {
    pub fn prime_digits(&self) -> usize {
        self.prime.decimal_digits()
    }
}

/// How the prime for a render was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimeSource {
    Cached,
    Searched,
}

/// Result of [`render_file`].
#[derive(Debug)]
pub struct RenderReport {
    pub image: PrimeImage,
    pub source: PrimeSource,
    pub cache_stats: CacheStats,
    /// Characters (bytes) of HTML written.
    pub bytes_written: usize,
}

pub fn read_bitmap(path: &Path) -> Result<Vec<u8>, PipelineError> {
    std::fs::read(path).map_err(|source| PipelineError::Input {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate the headers only.
pub fn check_bitmap(bytes: &[u8]) -> Result<RasterHeader, FormatError> {
    RasterHeader::parse(bytes)
}

pub fn digits_from_bitmap(bytes: &[u8]) -> Result<DigitGrid, FormatError> {
    raster::decode(bytes)
}

/// Decode a bitmap and find the smallest prime at or above its digits.
pub fn prime_from_bitmap(
    bytes: &[u8],
    options: &SearchOptions,
    events: Option<Sender<SearchEvent>>,
) -> Result<PrimeImage, PipelineError> {
    let grid = digits_from_bitmap(bytes)?;
    let (width, height) = (grid.width(), grid.height());
    let digits = grid.into_digit_string();
    let seed = BigUint::parse(&digits)?;
    let outcome = next_prime_with(&seed, options, events)?;
    Ok(PrimeImage {
        width,
        height,
        digits,
        prime: outcome.prime,
        distance: outcome.distance,
    })
}

/// Parse a decimal literal, optionally negative, and search from it.
pub fn next_prime_from_literal(
    literal: &str,
    options: &SearchOptions,
    events: Option<Sender<SearchEvent>>,
) -> Result<SearchOutcome, PipelineError> {
    let seed = match literal.strip_prefix('-') {
        Some(magnitude) => -BigInt::parse(magnitude)?,
        None => BigInt::parse(literal)?,
    };
    let seed = seed.into_biguint().ok_or(SearchError::InvalidInput)?;
    Ok(next_prime_with(&seed, options, events)?)
}

/// Full pipeline: read `input`, find the prime, write the page to `output`.
pub fn render_file(
    input: &Path,
    output: &Path,
    config: &PrimeConfig,
    cache_dir: &Path,
    use_cache: bool,
    events: Option<Sender<SearchEvent>>,
) -> Result<RenderReport, PipelineError> {
    let bytes = read_bitmap(input)?;
    render_bitmap(&bytes, output, config, cache_dir, use_cache, events)
}

/// [`render_file`] for a bitmap already in memory.
///
/// With `use_cache` off the lookup is skipped and the search always runs,
/// but the result is still added to the existing cache file.
pub fn render_bitmap(
    bytes: &[u8],
    output: &Path,
    config: &PrimeConfig,
    cache_dir: &Path,
    use_cache: bool,
    events: Option<Sender<SearchEvent>>,
) -> Result<RenderReport, PipelineError> {
    let grid = digits_from_bitmap(bytes)?;
    let (width, height) = (grid.width(), grid.height());
    let digits = grid.into_digit_string();
    let seed = BigUint::parse(&digits)?;

    let mut cache = PrimeCache::load(cache_dir);
    let mut cache_stats = CacheStats::default();
    let digits_hash = hash_digits(&digits);
    let params_hash = hash_search_params(config.search.rounds);

    let cached = use_cache
        .then(|| cache.lookup(&digits_hash, &params_hash, &seed))
        .flatten();
    let (prime, source) = match cached {
        Some(prime) => {
            cache_stats.hit();
            (prime, PrimeSource::Cached)
        }
        None => {
            let options = SearchOptions::from_config(&config.search);
            let outcome = next_prime_with(&seed, &options, events)?;
            cache_stats.miss();
            cache.insert(digits_hash, params_hash, &outcome.prime);
            cache.save(cache_dir).map_err(|source| PipelineError::Cache {
                path: cache_dir.to_path_buf(),
                source,
            })?;
            (outcome.prime, PrimeSource::Searched)
        }
    };

    let distance = prime
        .checked_sub(&seed)
        .and_then(|d| d.to_u64())
        .unwrap_or(u64::MAX);
    let title = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| output.display().to_string());
    let page = render_page(&title, &prime, width, &config.render);
    let bytes_written = write_page(output, &page)?;

    Ok(RenderReport {
        image: PrimeImage {
            width,
            height,
            digits,
            prime,
            distance,
        },
        source,
        cache_stats,
        bytes_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{BmpBuilder, DARK, LIGHT};
    use tempfile::TempDir;

    fn two_by_two() -> BmpBuilder {
        BmpBuilder::new(vec![vec![DARK, LIGHT], vec![DARK, LIGHT]])
    }

    // =========================================================================
    // Pure pipeline
    // =========================================================================

    #[test]
    fn two_by_two_bitmap_yields_8191() {
        let image =
            prime_from_bitmap(&two_by_two().build(), &SearchOptions::default(), None).unwrap();
        assert_eq!(image.digits, "8181");
        assert_eq!(image.prime, BigUint::from_u64(8191));
        assert_eq!(image.distance, 10);
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.prime_digits(), 4);
    }

    #[test]
    fn top_down_storage_gives_same_prime() {
        let bottom_up =
            prime_from_bitmap(&two_by_two().build(), &SearchOptions::default(), None).unwrap();
        let top_down = prime_from_bitmap(
            &two_by_two().top_down().build(),
            &SearchOptions::default(),
            None,
        )
        .unwrap();
        assert_eq!(bottom_up, top_down);
    }

    #[test]
    fn unsupported_bitmap_is_format_error() {
        let err = prime_from_bitmap(
            &two_by_two().bit_depth(32).build(),
            &SearchOptions::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Format(FormatError::BitDepth(32))));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn next_prime_from_literal_cases() {
        let options = SearchOptions::default();
        let got = next_prime_from_literal("8181", &options, None).unwrap();
        assert_eq!(got.prime, BigUint::from_u64(8191));

        let err = next_prime_from_literal("-7", &options, None).unwrap_err();
        assert!(matches!(err, PipelineError::Search(SearchError::InvalidInput)));
        assert_eq!(err.exit_code(), 9);

        let err = next_prime_from_literal("12a", &options, None).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
        assert_eq!(err.exit_code(), 6);

        // Negative zero is just zero
        let got = next_prime_from_literal("-0", &options, None).unwrap();
        assert_eq!(got.prime, BigUint::from_u64(2));
    }

    // =========================================================================
    // render_file
    // =========================================================================

    #[test]
    fn render_file_writes_page_and_caches() {
        let tmp = TempDir::new().unwrap();
        let input = two_by_two().write_to(tmp.path(), "in.bmp");
        let output = tmp.path().join("out.html");
        let cache_dir = tmp.path().join(".cache");
        let config = PrimeConfig::default();

        let first = render_file(&input, &output, &config, &cache_dir, true, None).unwrap();
        assert_eq!(first.source, PrimeSource::Searched);
        assert_eq!(first.image.prime, BigUint::from_u64(8191));
        let html = std::fs::read_to_string(&output).unwrap();
        assert_eq!(first.bytes_written, html.len());
        assert!(html.contains("81<br>91<br>"));
        assert!(html.contains("<title>out.html</title>"));

        let second = render_file(&input, &output, &config, &cache_dir, true, None).unwrap();
        assert_eq!(second.source, PrimeSource::Cached);
        assert_eq!(second.image, first.image);
        assert_eq!(second.cache_stats.hits, 1);
    }

    #[test]
    fn render_file_no_cache_searches_again() {
        let tmp = TempDir::new().unwrap();
        let input = two_by_two().write_to(tmp.path(), "in.bmp");
        let output = tmp.path().join("out.html");
        let cache_dir = tmp.path().join(".cache");
        let config = PrimeConfig::default();

        render_file(&input, &output, &config, &cache_dir, true, None).unwrap();
        let again = render_file(&input, &output, &config, &cache_dir, false, None).unwrap();
        assert_eq!(again.source, PrimeSource::Searched);
        assert_eq!(again.cache_stats.misses, 1);
    }

    #[test]
    fn render_file_no_cache_keeps_other_entries() {
        let tmp = TempDir::new().unwrap();
        let first = two_by_two().write_to(tmp.path(), "a.bmp");
        let second = BmpBuilder::from_digits(&["888", "111"]).write_to(tmp.path(), "b.bmp");
        let output = tmp.path().join("out.html");
        let cache_dir = tmp.path().join(".cache");
        let config = PrimeConfig::default();

        render_file(&first, &output, &config, &cache_dir, true, None).unwrap();
        let bypassed = render_file(&second, &output, &config, &cache_dir, false, None).unwrap();
        assert_eq!(bypassed.source, PrimeSource::Searched);
        assert_eq!(PrimeCache::load(&cache_dir).len(), 2);

        let again = render_file(&first, &output, &config, &cache_dir, true, None).unwrap();
        assert_eq!(again.source, PrimeSource::Cached);
        let again = render_file(&second, &output, &config, &cache_dir, true, None).unwrap();
        assert_eq!(again.source, PrimeSource::Cached);
    }

    #[test]
    fn render_file_rounds_change_invalidates_cache() {
        let tmp = TempDir::new().unwrap();
        let input = two_by_two().write_to(tmp.path(), "in.bmp");
        let output = tmp.path().join("out.html");
        let cache_dir = tmp.path().join(".cache");
        let mut config = PrimeConfig::default();

        render_file(&input, &output, &config, &cache_dir, true, None).unwrap();
        config.search.rounds = 10;
        let again = render_file(&input, &output, &config, &cache_dir, true, None).unwrap();
        assert_eq!(again.source, PrimeSource::Searched);
    }

    #[test]
    fn render_bitmap_from_memory_matches_file() {
        let tmp = TempDir::new().unwrap();
        let bytes = two_by_two().build();
        let output = tmp.path().join("page.html");
        let report = render_bitmap(
            &bytes,
            &output,
            &PrimeConfig::default(),
            &tmp.path().join(".cache"),
            true,
            None,
        )
        .unwrap();
        assert_eq!(report.image.prime, BigUint::from_u64(8191));
        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("<title>page.html</title>"));
    }

    #[test]
    fn render_file_missing_input() {
        let tmp = TempDir::new().unwrap();
        let err = render_file(
            &tmp.path().join("missing.bmp"),
            &tmp.path().join("out.html"),
            &PrimeConfig::default(),
            &tmp.path().join(".cache"),
            true,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Input { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn render_file_rejected_bitmap_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let input = two_by_two().compression(1).write_to(tmp.path(), "in.bmp");
        let output = tmp.path().join("out.html");
        let err = render_file(
            &input,
            &output,
            &PrimeConfig::default(),
            &tmp.path().join(".cache"),
            true,
            None,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(!output.exists());
    }

    #[test]
    fn render_file_unwritable_output() {
        let tmp = TempDir::new().unwrap();
        let input = two_by_two().write_to(tmp.path(), "in.bmp");
        let err = render_file(
            &input,
            &tmp.path().join("no/such/dir/out.html"),
            &PrimeConfig::default(),
            &tmp.path().join(".cache"),
            true,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Render(_)));
        assert_eq!(err.exit_code(), 7);
    }
}
