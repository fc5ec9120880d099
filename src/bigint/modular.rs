//! Modular exponentiation.
//!
//! [`Modulus`] prepares a modulus once so repeated exponentiations against it
//! (one per Miller–Rabin round) share the setup cost. Odd moduli, which is
//! every prime candidate past 2, run through Montgomery multiplication with
//! a 4-bit fixed window. Even moduli fall back to square-and-multiply with a
//! full division after each step.

use super::BigUint;

/// Exponent bits consumed per window step.
const WINDOW_BITS: u64 = 4;

/// A non-zero modulus ready for modular arithmetic.
#[derive(Debug, Clone)]
pub struct Modulus {
    kind: Kind,
}

#[derive(Debug, Clone)]
enum Kind {
    Montgomery(Montgomery),
    Plain(BigUint),
}

impl Modulus {
    /// Returns `None` for a zero modulus.
    pub fn new(modulus: &BigUint) -> Option<Self> {
        if modulus.is_zero() {
            return None;
        }
        let kind = if modulus.is_odd() {
            Kind::Montgomery(Montgomery::new(modulus))
        } else {
            Kind::Plain(modulus.clone())
        };
        Some(Self { kind })
    }

    pub fn value(&self) -> &BigUint {
        match &self.kind {
            Kind::Montgomery(ctx) => &ctx.modulus,
            Kind::Plain(modulus) => modulus,
        }
    }

    /// `base^exp mod m`. Any `base` is accepted; it is reduced first.
    pub fn pow(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        if self.value().is_one() {
            return BigUint::zero();
        }
        match &self.kind {
            Kind::Montgomery(ctx) => ctx.pow(base, exp),
            Kind::Plain(modulus) => plain_pow(base, exp, modulus),
        }
    }

    /// `a * b mod m`.
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        &(a * b) % self.value()
    }
}

impl BigUint {
    /// `self^exp mod modulus`, or `None` when `modulus` is zero.
    ///
    /// For many exponentiations against one modulus, build a [`Modulus`]
    /// once instead.
    pub fn modpow(&self, exp: &BigUint, modulus: &BigUint) -> Option<BigUint> {
        Modulus::new(modulus).map(|m| m.pow(self, exp))
    }
}

fn plain_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    let base = base % modulus;
    let mut acc = BigUint::one();
    for bit in (0..exp.bits()).rev() {
        acc = &(&acc * &acc) % modulus;
        if exp.bit(bit) {
            acc = &(&acc * &base) % modulus;
        }
    }
    acc
}

// ============================================================================
// Montgomery arithmetic
// ============================================================================

/// Montgomery context for an odd modulus `m` of `n` limbs, with
/// `R = 2^(64n)`. Residues are kept as exactly `n` limbs.
#[derive(Debug, Clone)]
struct Montgomery {
    modulus: BigUint,
    m: Vec<u64>,
    /// `-m^-1 mod 2^64`
    m_inv: u64,
    /// `R^2 mod m`, used to enter the Montgomery domain.
    r2: Vec<u64>,
}

impl Montgomery {
    fn new(modulus: &BigUint) -> Self {
        let m = modulus.limbs().to_vec();
        let n = m.len();
        let m_inv = inverse_mod_word(m[0]).wrapping_neg();
        let r2 = &(&BigUint::one() << (128 * n as u64)) % modulus;
        Self {
            modulus: modulus.clone(),
            r2: padded(&r2, n),
            m,
            m_inv,
        }
    }

    /// `a * b * R^-1 mod m` for `a, b < m` (CIOS form).
    fn mont_mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        let n = self.m.len();
        let mut t = vec![0u64; n + 2];
        for &word in b {
            let mut carry = 0u64;
            for j in 0..n {
                let wide =
                    u128::from(t[j]) + u128::from(a[j]) * u128::from(word) + u128::from(carry);
                t[j] = wide as u64;
                carry = (wide >> 64) as u64;
            }
            let wide = u128::from(t[n]) + u128::from(carry);
            t[n] = wide as u64;
            t[n + 1] = (wide >> 64) as u64;

            let q = t[0].wrapping_mul(self.m_inv);
            let wide = u128::from(t[0]) + u128::from(q) * u128::from(self.m[0]);
            let mut carry = (wide >> 64) as u64;
            for j in 1..n {
                let wide =
                    u128::from(t[j]) + u128::from(q) * u128::from(self.m[j]) + u128::from(carry);
                t[j - 1] = wide as u64;
                carry = (wide >> 64) as u64;
            }
            let wide = u128::from(t[n]) + u128::from(carry);
            t[n - 1] = wide as u64;
            t[n] = t[n + 1] + (wide >> 64) as u64;
            t[n + 1] = 0;
        }

        // t < 2m here; one conditional subtraction brings it below m
        if t[n] != 0 || !less_than(&t[..n], &self.m) {
            let mut borrow = false;
            for j in 0..n {
                let (diff, b1) = t[j].overflowing_sub(self.m[j]);
                let (diff, b2) = diff.overflowing_sub(u64::from(borrow));
                t[j] = diff;
                borrow = b1 || b2;
            }
        }
        t.truncate(n);
        t
    }

    fn to_mont(&self, value: &BigUint) -> Vec<u64> {
        let reduced = value % &self.modulus;
        self.mont_mul(&padded(&reduced, self.m.len()), &self.r2)
    }

    fn from_mont(&self, value: &[u64]) -> BigUint {
        let mut one = vec![0u64; self.m.len()];
        one[0] = 1;
        BigUint::from_limbs(self.mont_mul(value, &one))
    }

    fn pow(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        let one = self.to_mont(&BigUint::one());
        let base = self.to_mont(base);

        let mut table = Vec::with_capacity(1 << WINDOW_BITS);
        table.push(one.clone());
        for i in 1..(1 << WINDOW_BITS) {
            let next = self.mont_mul(&table[i - 1], &base);
            table.push(next);
        }

        let mut acc = one;
        let mut started = false;
        for window in (0..exp.bits().div_ceil(WINDOW_BITS)).rev() {
            if started {
                for _ in 0..WINDOW_BITS {
                    acc = self.mont_mul(&acc, &acc);
                }
            }
            let digit = exp_window(exp, window);
            if digit != 0 {
                acc = self.mont_mul(&acc, &table[digit]);
                started = true;
            }
        }
        self.from_mont(&acc)
    }
}

/// The `index`-th 4-bit window of `exp`, least significant first.
fn exp_window(exp: &BigUint, index: u64) -> usize {
    let bit = index * WINDOW_BITS;
    let limb = exp.limbs()[(bit / 64) as usize];
    ((limb >> (bit % 64)) & ((1 << WINDOW_BITS) - 1)) as usize
}

/// Inverse of an odd word modulo 2^64 by Newton iteration; each step doubles
/// the number of correct low bits, starting from one.
fn inverse_mod_word(odd: u64) -> u64 {
    let mut inv: u64 = 1;
    for _ in 0..6 {
        inv = inv.wrapping_mul(2u64.wrapping_sub(odd.wrapping_mul(inv)));
    }
    inv
}

fn padded(value: &BigUint, len: usize) -> Vec<u64> {
    let mut limbs = value.limbs().to_vec();
    limbs.resize(len, 0);
    limbs
}

/// `a < b` for equal-length limb slices.
fn less_than(a: &[u64], b: &[u64]) -> bool {
    a.iter().rev().lt(b.iter().rev())
}
