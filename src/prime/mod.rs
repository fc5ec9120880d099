//! Primality testing and next-prime search.
//!
//! | Module | Role |
//! |--------|------|
//! | `sieve` | Small primes and the window sieve that discards candidates with a small factor |
//! | `miller_rabin` | Strong probable-prime test, exact below 3.3e24 |
//! | `search` | `next_prime`: windowed, parallel, optionally capped by distance or time |

mod miller_rabin;
mod search;
mod sieve;

pub use miller_rabin::{BASE_DERIVATION_VERSION, DETERMINISTIC_BOUND, is_probable_prime};
pub use search::{
    SearchError, SearchEvent, SearchOptions, SearchOutcome, next_prime, next_prime_with,
};
pub use sieve::{CandidateSieve, odd_primes_below};
