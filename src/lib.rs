//! # Pixel Prime
//!
//! Turns a small bitmap into a prime number that draws the same picture.
//! Every pixel becomes one decimal digit, `8` if it is dark and `1` if it
//! is light, read left to right and top to bottom. The smallest prime at or
//! above that number is then written out as an HTML page, broken into lines
//! as wide as the image, so the prime's digits redraw the bitmap (give or
//! take a few digits at the end).
//!
//! # Architecture: Single-Pass Pipeline
//!
//! ```text
//! 1. Decode   image.bmp  →  DigitGrid        (header checks, luminance threshold, row order)
//! 2. Parse    digits     →  BigUint          (arbitrary precision)
//! 3. Search   BigUint    →  prime            (sieve + Miller–Rabin, parallel)
//! 4. Render   prime      →  page.html        (Maud)
//! ```
//!
//! Stages own their output and hand it on by value. Stages 1 to 3 are pure
//! and run without touching the filesystem; [`pipeline::render_file`] adds
//! file I/O and a cache of previously found primes around them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`raster`] | 24-bit uncompressed bitmap decoding into a top-down digit grid |
//! | [`bigint`] | Arbitrary-precision integers: parsing, arithmetic, Montgomery modular exponentiation |
//! | [`prime`] | Small-prime sieve, Miller–Rabin, and the next-prime search |
//! | [`pipeline`] | Wires the stages together; error type with per-failure exit codes |
//! | [`render`] | HTML page for a found prime, using Maud |
//! | [`cache`] | Content-addressed cache of found primes |
//! | [`config`] | `pixel-prime.toml` loading, validation, and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Row Order From the Height Sign
//!
//! A bitmap with a positive height stores its bottom row first; a negative
//! height means rows are stored top-down. The decoder derives an
//! [`raster::Orientation`] from the sign once and normalizes rows in one
//! place, where [`raster::decode`] builds the [`raster::DigitGrid`], so the
//! digit string is always top-down.
//!
//! ## Own Big Integers
//!
//! Primality testing needs only a handful of operations: parse, compare,
//! small remainders, and modular exponentiation. [`bigint`] implements
//! exactly those on 64-bit limbs, with Montgomery multiplication for the odd
//! moduli every prime candidate has.
//!
//! ## Reproducible Probable Primes
//!
//! Below 3.3·10²⁴ Miller–Rabin with the first 13 prime bases is exact.
//! Above that the bases are derived from a hash of the candidate, so the
//! same input always yields the same prime, and a composite slips through
//! with probability at most 4^-rounds (2^-50 at the default 25 rounds).

pub mod bigint;
pub mod cache;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod prime;
pub mod raster;
pub mod render;

#[cfg(test)]
pub(crate) mod test_helpers;
