//! Small primes and the candidate window sieve.
//!
//! Trial division against every small prime would cost one multi-limb
//! remainder per prime per candidate. Instead the residue of the window's
//! first candidate is computed once per prime, and every odd candidate in
//! the window that shares a factor with a small prime is crossed out in one
//! pass. Advancing to the next window only updates the residues.

use crate::bigint::BigUint;

/// Odd primes strictly below `limit`, in increasing order.
pub fn odd_primes_below(limit: u32) -> Vec<u32> {
    let limit = limit as usize;
    if limit < 4 {
        return Vec::new();
    }
    // index i stands for the odd number 2i + 1
    let mut composite = vec![false; limit / 2];
    let mut i = 1;
    while (2 * i + 1) * (2 * i + 1) < limit {
        if !composite[i] {
            let p = 2 * i + 1;
            let mut j = p * p / 2;
            while j < composite.len() {
                composite[j] = true;
                j += p;
            }
        }
        i += 1;
    }
    composite
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(idx, is_composite)| !**is_composite && 2 * idx + 1 < limit)
        .map(|(idx, _)| (2 * idx + 1) as u32)
        .collect()
}

/// Sieve over consecutive windows of odd candidates `start + 2k`.
#[derive(Debug, Clone)]
pub struct CandidateSieve {
    primes: Vec<u32>,
    /// `start mod p` for each sieve prime.
    residues: Vec<u32>,
    start: BigUint,
    /// `start` when it fits in a word, used so a candidate equal to a sieve
    /// prime is not crossed out as its own multiple.
    start_small: Option<u64>,
    window: usize,
}

impl CandidateSieve {
    /// `start` must be odd.
    pub fn new(start: BigUint, primes: Vec<u32>, window: usize) -> Self {
        debug_assert!(start.is_odd());
        let residues = primes
            .iter()
            .map(|&p| start.rem_u64(u64::from(p)) as u32)
            .collect();
        let start_small = start.to_u64();
        Self {
            primes,
            residues,
            start,
            start_small,
            window,
        }
    }

    pub fn start(&self) -> &BigUint {
        &self.start
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Window offsets `k` whose candidate `start + 2k` has no small factor
    /// (other than being that small prime itself), in increasing order.
    pub fn survivors(&self) -> Vec<usize> {
        let mut crossed = vec![false; self.window];
        for (&p, &r) in self.primes.iter().zip(&self.residues) {
            let p = u64::from(p);
            // start + 2k = 0 (mod p)  <=>  k = -r * 2^-1 (mod p)
            let half = p.div_ceil(2);
            let mut k = ((p - u64::from(r)) % p) * half % p;
            if let Some(small) = self.start_small
                && small.checked_add(2 * k) == Some(p)
            {
                k += p;
            }
            while (k as usize) < self.window {
                crossed[k as usize] = true;
                k += p;
            }
        }
        crossed
            .iter()
            .enumerate()
            .filter(|(_, is_crossed)| !**is_crossed)
            .map(|(k, _)| k)
            .collect()
    }

    /// The candidate at window offset `k`.
    pub fn candidate(&self, k: usize) -> BigUint {
        self.start.add_u64(2 * k as u64)
    }

    /// Move to the next window of `window` odd candidates.
    pub fn advance(&mut self) {
        let step = 2 * self.window as u64;
        self.start.add_assign_u64(step);
        for (r, &p) in self.residues.iter_mut().zip(&self.primes) {
            let p = u64::from(p);
            *r = ((u64::from(*r) + step % p) % p) as u32;
        }
        self.start_small = self.start_small.and_then(|s| s.checked_add(step));
    }
}
