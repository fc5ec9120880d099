//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! Image: in.bmp 2x2 (4 digits)
//! Searching above a 13-bit number (6541 sieve primes)
//!     window 0: 3 candidates
//! Found prime 10 above the starting number
//! Prime: 4 digits (searched, 10 above the image number)
//! Cache: 1 searched
//! 1043 characters written to out.html.
//! ```
//!
//! ## Check
//!
//! ```text
//! Bitmap: 2x2, 24 bits per pixel, uncompressed
//!     Rows: stored bottom-up
//!     Digits: 4
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::pipeline::{PrimeSource, RenderReport};
use crate::prime::{SearchEvent, SearchOutcome};
use crate::raster::{DigitGrid, Orientation, RasterHeader};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// check
// ============================================================================

/// Format a validated bitmap header.
pub fn format_header(header: &RasterHeader) -> Vec<String> {
    let order = match header.orientation() {
        Orientation::BottomUp => "bottom-up",
        Orientation::TopDown => "top-down",
    };
    vec![
        format!(
            "Bitmap: {}x{}, {} bits per pixel, uncompressed",
            header.width_px(),
            header.rows(),
            header.bits_per_pixel
        ),
        format!("{}Rows: stored {}", indent(1), order),
        format!("{}Digits: {}", indent(1), header.width_px() * header.rows()),
    ]
}

pub fn print_header(header: &RasterHeader) {
    for line in format_header(header) {
        println!("{}", line);
    }
}

// ============================================================================
// digits
// ============================================================================

/// One line per image row, top row first.
pub fn format_digits(grid: &DigitGrid) -> Vec<String> {
    grid.rows()
        .map(|row| row.iter().copied().map(char::from).collect())
        .collect()
}

pub fn print_digits(grid: &DigitGrid) {
    for line in format_digits(grid) {
        println!("{}", line);
    }
}

// ============================================================================
// Search progress
// ============================================================================

/// Format a single search progress event as display lines.
pub fn format_search_event(event: &SearchEvent) -> Vec<String> {
    match event {
        SearchEvent::Started { bits, sieve_primes } => vec![format!(
            "Searching above a {}-bit number ({} sieve primes)",
            bits, sieve_primes
        )],
        SearchEvent::Window { index, survivors } => vec![format!(
            "{}window {}: {}",
            indent(1),
            index,
            plural(*survivors, "candidate")
        )],
        SearchEvent::Found { distance } => {
            vec![format!("Found prime {} above the starting number", distance)]
        }
    }
}

// ============================================================================
// next-prime
// ============================================================================

pub fn format_next_prime(outcome: &SearchOutcome) -> Vec<String> {
    vec![
        outcome.prime.to_string(),
        format!(
            "{}{}, {} above the input",
            indent(1),
            plural(outcome.prime.decimal_digits(), "digit"),
            outcome.distance
        ),
    ]
}

pub fn print_next_prime(outcome: &SearchOutcome) {
    for line in format_next_prime(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// render
// ============================================================================

/// Image size before the search runs.
pub fn format_render_start(input: &Path, width: usize, height: usize) -> Vec<String> {
    vec![format!(
        "Image: {} {}x{} ({})",
        input.display(),
        width,
        height,
        plural(width * height, "digit")
    )]
}

/// Summary after the page is written.
pub fn format_render_report(report: &RenderReport, output: &Path) -> Vec<String> {
    let source = match report.source {
        PrimeSource::Cached => "cached",
        PrimeSource::Searched => "searched",
    };
    vec![
        format!(
            "Prime: {} ({}, {} above the image number)",
            plural(report.image.prime_digits(), "digit"),
            source,
            report.image.distance
        ),
        format!("Cache: {}", report.cache_stats),
        format!(
            "{} characters written to {}.",
            report.bytes_written,
            output.display()
        ),
    ]
}

pub fn print_render_report(report: &RenderReport, output: &Path) {
    for line in format_render_report(report, output) {
        println!("{}", line);
    }
}
