//! HTML page for a found prime.
//!
//! The page shows the prime in a square font, broken into lines as wide as
//! the source image so the digits redraw the picture: dark pixels became
//! `8`, light ones `1`. Lines are broken here rather than in page
//! JavaScript, so the output is plain static HTML.
//!
//! ```text
//! <div id="prime">
//!   8181<br>
//!   8191<br>
//!   <br> is a 8 digit number and a prime.
//! </div>
//! ```

use crate::bigint::BigUint;
use crate::config::RenderConfig;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Split `digits` into lines of `width` characters. The last line may be
/// shorter. A width of zero keeps everything on one line.
pub fn wrap_digits(digits: &str, width: usize) -> Vec<&str> {
    if digits.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return vec![digits];
    }
    // Digits are ASCII, so byte chunks are char chunks
    digits
        .as_bytes()
        .chunks(width)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect()
}

fn page_css(config: &RenderConfig) -> String {
    format!(
        "@font-face {{ font-family: {family}; src: url('{url}'); }}\n\
         #prime {{ font-family: {family}; font-size: {size}; line-height: 1; }}",
        family = config.font_family,
        url = config.font_url,
        size = config.font_size,
    )
}

/// Render the full page for `prime`, wrapped at `width` digits per line.
pub fn render_page(title: &str, prime: &BigUint, width: usize, config: &RenderConfig) -> Markup {
    let digits = prime.to_string();
    let lines = wrap_digits(&digits, width);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                // Font values are validated free of markup when config loads
                style { (PreEscaped(page_css(config))) }
            }
            body {
                div #prime {
                    @for line in &lines {
                        (line)
                        br;
                    }
                    br;
                    " is a " (digits.len()) " digit number and a prime."
                }
            }
        }
    }
}

/// Write a rendered page and return the number of bytes written.
pub fn write_page(path: &Path, page: &Markup) -> Result<usize, RenderError> {
    let html = page.clone().into_string();
    std::fs::write(path, &html).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(html.len())
}
