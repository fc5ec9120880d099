//! Next-prime search.
//!
//! Candidates are walked in increasing order, one window of odd numbers at a
//! time. Each window is sieved against the small primes, and the survivors
//! are Miller–Rabin tested in parallel. `find_first` keeps the answer the
//! smallest passing candidate no matter which worker finishes first.

use super::miller_rabin::is_probable_prime;
use super::sieve::{CandidateSieve, odd_primes_below};
use crate::bigint::{BigInt, BigUint};
use crate::config::SearchConfig;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search seed must be non-negative")]
    InvalidInput,
    #[error("no prime found within {limit} of the seed")]
    Exhausted { limit: u64 },
    #[error("prime search gave up after {elapsed:.1?}")]
    DeadlineExceeded { elapsed: Duration },
}

/// Tuning for one search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub rounds: u32,
    pub sieve_limit: u32,
    pub window: usize,
    /// Give up once candidates are further than this above the seed.
    pub max_distance: Option<u64>,
    pub timeout: Option<Duration>,
}

impl SearchOptions {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            rounds: config.rounds,
            sieve_limit: config.sieve_limit,
            window: config.window,
            max_distance: config.max_distance,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

/// Progress reported while searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Started { bits: u64, sieve_primes: usize },
    /// A window was sieved; `survivors` candidates go on to Miller–Rabin.
    Window { index: u64, survivors: usize },
    Found { distance: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub prime: BigUint,
    /// `prime - seed`
    pub distance: u64,
}

/// Smallest prime `>= n`, with default options.
pub fn next_prime(n: &BigInt) -> Result<BigInt, SearchError> {
    let seed = n.to_biguint().ok_or(SearchError::InvalidInput)?;
    let outcome = next_prime_with(&seed, &SearchOptions::default(), None)?;
    Ok(BigInt::from(outcome.prime))
}

/// Smallest prime `>= seed`, reporting progress to `events` when given.
pub fn next_prime_with(
    seed: &BigUint,
    options: &SearchOptions,
    events: Option<Sender<SearchEvent>>,
) -> Result<SearchOutcome, SearchError> {
    let started = Instant::now();
    let emit = |event: SearchEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };

    if let Some(small) = seed.to_u64().filter(|&s| s <= 2) {
        let distance = 2 - small;
        emit(SearchEvent::Found { distance });
        return Ok(SearchOutcome {
            prime: BigUint::from_u64(2),
            distance,
        });
    }

    // First odd candidate at or above the seed
    let lead = u64::from(seed.is_even());
    let primes = odd_primes_below(options.sieve_limit);
    emit(SearchEvent::Started {
        bits: seed.bits(),
        sieve_primes: primes.len(),
    });

    let window = options.window.max(1);
    let mut sieve = CandidateSieve::new(seed.add_u64(lead), primes, window);
    let window_span = 2 * window as u64;
    let within_cap = |distance: u64| options.max_distance.is_none_or(|cap| distance <= cap);

    // Set by whichever worker first sees the deadline pass; every test after
    // that is skipped, so a window stops within one Miller–Rabin test.
    let expired = AtomicBool::new(false);
    let past_deadline = || {
        let Some(timeout) = options.timeout else {
            return false;
        };
        if expired.load(Ordering::Relaxed) {
            return true;
        }
        let passed = started.elapsed() >= timeout;
        if passed {
            expired.store(true, Ordering::Relaxed);
        }
        passed
    };

    for index in 0u64.. {
        if past_deadline() {
            return Err(SearchError::DeadlineExceeded {
                elapsed: started.elapsed(),
            });
        }

        let base = lead.saturating_add(index.saturating_mul(window_span));
        if !within_cap(base) {
            break;
        }

        let survivors = sieve.survivors();
        emit(SearchEvent::Window {
            index,
            survivors: survivors.len(),
        });

        let found = survivors.par_iter().copied().find_first(|&k| {
            within_cap(base.saturating_add(2 * k as u64))
                && !past_deadline()
                && is_probable_prime(&sieve.candidate(k), options.rounds)
        });
        // A skipped smaller candidate could have been prime, so a hit found
        // after the deadline is not trusted either.
        if expired.load(Ordering::Relaxed) {
            return Err(SearchError::DeadlineExceeded {
                elapsed: started.elapsed(),
            });
        }
        if let Some(k) = found {
            let distance = base + 2 * k as u64;
            emit(SearchEvent::Found { distance });
            return Ok(SearchOutcome {
                prime: sieve.candidate(k),
                distance,
            });
        }
        sieve.advance();
    }

    Err(SearchError::Exhausted {
        limit: options.max_distance.unwrap_or(u64::MAX),
    })
}
