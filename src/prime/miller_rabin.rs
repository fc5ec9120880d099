//! Miller–Rabin strong probable-prime test.
//!
//! ## Base selection
//!
//! - Below [`DETERMINISTIC_BOUND`] the first 13 primes as bases give an exact
//!   answer (Sorenson & Webster, 2015), whatever the requested round count.
//! - Above it, base 2 runs first because it rejects nearly every composite,
//!   then `rounds - 1` further bases derived from SHA-256 of the candidate and
//!   the round index, reduced into `[2, n - 2]`.
//!
//! Derived bases are deterministic (the same candidate always sees the same
//! bases, so a search is reproducible) but are not a fixed public list, so
//! composites built to fool a known base set are not a concern. Each round
//! passes a composite with probability at most 1/4, giving an error bound of
//! 4^-rounds; the default of 25 rounds keeps it under 2^-50.

use crate::bigint::{BigUint, Modulus};
use sha2::{Digest, Sha256};

/// Smallest strong pseudoprime to all of the first 13 prime bases.
pub const DETERMINISTIC_BOUND: u128 = 3_317_044_064_679_887_385_961_981;

const DETERMINISTIC_BASES: [u64; 13] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];

/// Bump when base derivation changes; cached search results depend on it.
pub const BASE_DERIVATION_VERSION: u32 = 1;

/// Whether `n` is (probably) prime.
///
/// Small factors are checked first, so even numbers, multiples of the
/// deterministic bases, and the values 0 and 1 never reach the expensive test.
pub fn is_probable_prime(n: &BigUint, rounds: u32) -> bool {
    if n.to_u64().is_some_and(|small| small < 2) {
        return false;
    }
    for &p in &DETERMINISTIC_BASES {
        if *n == p {
            return true;
        }
        if n.rem_u64(p) == 0 {
            return false;
        }
    }
    // No factor up to 41, so anything below 43^2 is prime
    if n.to_u64().is_some_and(|small| small < 43 * 43) {
        return true;
    }
    StrongTest::new(n).is_some_and(|test| test.is_probable_prime(rounds))
}

/// One odd candidate `n > 3`, decomposed as `n - 1 = d * 2^s`.
struct StrongTest<'a> {
    n: &'a BigUint,
    modulus: Modulus,
    n_minus_one: BigUint,
    d: BigUint,
    s: u64,
}

impl<'a> StrongTest<'a> {
    fn new(n: &'a BigUint) -> Option<Self> {
        let modulus = Modulus::new(n)?;
        let n_minus_one = n.checked_sub_u64(1)?;
        let s = n_minus_one.trailing_zeros()?;
        let d = &n_minus_one >> s;
        Some(Self {
            n,
            modulus,
            n_minus_one,
            d,
            s,
        })
    }

    fn is_probable_prime(&self, rounds: u32) -> bool {
        let exact = self.n.to_u128().is_some_and(|v| v < DETERMINISTIC_BOUND);
        if exact {
            return DETERMINISTIC_BASES
                .iter()
                .all(|&a| self.passes(&BigUint::from_u64(a)));
        }
        if !self.passes(&BigUint::from_u64(2)) {
            return false;
        }
        (1..rounds.max(1)).all(|round| self.passes(&derived_base(self.n, round)))
    }

    /// One strong-pseudoprime round for `base`.
    fn passes(&self, base: &BigUint) -> bool {
        let mut x = self.modulus.pow(base, &self.d);
        if x.is_one() || x == self.n_minus_one {
            return true;
        }
        for _ in 1..self.s {
            x = self.modulus.mul(&x, &x);
            if x == self.n_minus_one {
                return true;
            }
            if x.is_one() {
                return false;
            }
        }
        false
    }
}

/// Base for `round`, uniform-looking in `[2, n - 2]`. Requires `n > 4`.
fn derived_base(n: &BigUint, round: u32) -> BigUint {
    let mut hasher = Sha256::new();
    hasher.update(b"pixel-prime/miller-rabin\0");
    hasher.update(BASE_DERIVATION_VERSION.to_le_bytes());
    hasher.update(n.to_be_bytes());
    hasher.update(round.to_le_bytes());
    let digest = hasher.finalize();

    let span = n.checked_sub_u64(3).unwrap_or_else(BigUint::one);
    (&BigUint::from_be_bytes(&digest) % &span).add_u64(2)
}
