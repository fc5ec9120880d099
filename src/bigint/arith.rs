//! Limb-level arithmetic on [`BigUint`].
//!
//! Schoolbook algorithms throughout: quadratic multiplication and Knuth's
//! Algorithm D for long division. At the sizes this crate sees (a few
//! thousand decimal digits) these beat the asymptotically faster methods.

use super::BigUint;
use std::ops::{Add, Mul, Rem, Shl, Shr};

impl BigUint {
    /// `self = self * mul + add`, in place.
    pub(crate) fn mul_small_add(&mut self, mul: u64, add: u64) {
        let mut carry = add;
        for limb in &mut self.limbs {
            let wide = u128::from(*limb) * u128::from(mul) + u128::from(carry);
            *limb = wide as u64;
            carry = (wide >> 64) as u64;
        }
        if carry != 0 {
            self.limbs.push(carry);
        }
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
    }

    pub fn add_u64(&self, value: u64) -> BigUint {
        let mut out = self.clone();
        out.add_assign_u64(value);
        out
    }

    pub fn add_assign_u64(&mut self, value: u64) {
        let mut carry = value;
        for limb in &mut self.limbs {
            if carry == 0 {
                return;
            }
            let (sum, overflow) = limb.overflowing_add(carry);
            *limb = sum;
            carry = u64::from(overflow);
        }
        if carry != 0 {
            self.limbs.push(carry);
        }
    }

    /// Add one in place. Carries ripple into a new limb when every limb is
    /// `u64::MAX`.
    pub fn increment(&mut self) {
        self.add_assign_u64(1);
    }

    /// `self - other`, or `None` if the result would be negative.
    pub fn checked_sub(&self, other: &BigUint) -> Option<BigUint> {
        if *self < *other {
            return None;
        }
        let mut limbs = self.limbs.clone();
        sub_assign_limbs(&mut limbs, &other.limbs);
        Some(BigUint::from_limbs(limbs))
    }

    pub fn checked_sub_u64(&self, value: u64) -> Option<BigUint> {
        self.checked_sub(&BigUint::from_u64(value))
    }

    /// Quotient and remainder of division by a single word.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero.
    pub fn div_rem_u64(&self, divisor: u64) -> (BigUint, u64) {
        assert!(divisor != 0, "attempt to divide by zero");
        let divisor = u128::from(divisor);
        let mut quotient = vec![0u64; self.limbs.len()];
        let mut rem: u128 = 0;
        for (i, &limb) in self.limbs.iter().enumerate().rev() {
            let current = (rem << 64) | u128::from(limb);
            quotient[i] = (current / divisor) as u64;
            rem = current % divisor;
        }
        (BigUint::from_limbs(quotient), rem as u64)
    }

    /// Remainder of division by a single word.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero.
    pub fn rem_u64(&self, divisor: u64) -> u64 {
        assert!(divisor != 0, "attempt to calculate the remainder with a divisor of zero");
        let divisor = u128::from(divisor);
        self.limbs.iter().rev().fold(0u128, |rem, &limb| {
            ((rem << 64) | u128::from(limb)) % divisor
        }) as u64
    }

    /// Quotient and remainder, or `None` when `divisor` is zero.
    pub fn checked_div_rem(&self, divisor: &BigUint) -> Option<(BigUint, BigUint)> {
        if divisor.is_zero() {
            return None;
        }
        if *self < *divisor {
            return Some((BigUint::zero(), self.clone()));
        }
        if let [word] = divisor.limbs.as_slice() {
            let (quotient, rem) = self.div_rem_u64(*word);
            return Some((quotient, BigUint::from_u64(rem)));
        }
        Some(div_rem_knuth(&self.limbs, &divisor.limbs))
    }
}

// ============================================================================
// Limb helpers
// ============================================================================

/// `a -= b` where `a >= b` as integers and `a.len() >= b.len()`.
fn sub_assign_limbs(a: &mut [u64], b: &[u64]) {
    let mut borrow = false;
    for (i, limb) in a.iter_mut().enumerate() {
        let rhs = b.get(i).copied().unwrap_or(0);
        if rhs == 0 && !borrow && i >= b.len() {
            break;
        }
        let (diff, b1) = limb.overflowing_sub(rhs);
        let (diff, b2) = diff.overflowing_sub(u64::from(borrow));
        *limb = diff;
        borrow = b1 || b2;
    }
}

fn add_limbs(a: &[u64], b: &[u64]) -> Vec<u64> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry = false;
    for (i, &x) in long.iter().enumerate() {
        let y = short.get(i).copied().unwrap_or(0);
        let (sum, c1) = x.overflowing_add(y);
        let (sum, c2) = sum.overflowing_add(u64::from(carry));
        out.push(sum);
        carry = c1 || c2;
    }
    if carry {
        out.push(1);
    }
    out
}

fn mul_limbs(a: &[u64], b: &[u64]) -> Vec<u64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0u64; a.len() + b.len()];
    for (i, &x) in a.iter().enumerate() {
        let mut carry = 0u64;
        for (j, &y) in b.iter().enumerate() {
            let wide = u128::from(out[i + j]) + u128::from(x) * u128::from(y) + u128::from(carry);
            out[i + j] = wide as u64;
            carry = (wide >> 64) as u64;
        }
        out[i + b.len()] = carry;
    }
    out
}

/// Shift left by `shift < 64` bits into a buffer of exactly `len` limbs.
fn shl_limbs(src: &[u64], shift: u32, len: usize) -> Vec<u64> {
    let mut out = vec![0u64; len];
    for (i, &limb) in src.iter().enumerate() {
        out[i] |= limb << shift;
        if shift > 0 && i + 1 < len {
            out[i + 1] = limb >> (64 - shift);
        }
    }
    out
}

/// Shift right by `shift < 64` bits.
fn shr_limbs(src: &[u64], shift: u32) -> Vec<u64> {
    if shift == 0 {
        return src.to_vec();
    }
    (0..src.len())
        .map(|i| {
            let high = src.get(i + 1).map_or(0, |next| next << (64 - shift));
            (src[i] >> shift) | high
        })
        .collect()
}

/// Knuth, TAOCP vol. 2, 4.3.1 Algorithm D. Requires `v.len() >= 2` and
/// `u >= v`.
fn div_rem_knuth(u: &[u64], v: &[u64]) -> (BigUint, BigUint) {
    const BASE: u128 = 1 << 64;

    let n = v.len();
    let m = u.len() - n;
    let shift = v[n - 1].leading_zeros();
    let vn = shl_limbs(v, shift, n);
    let mut un = shl_limbs(u, shift, u.len() + 1);
    let mut quotient = vec![0u64; m + 1];

    let top = u128::from(vn[n - 1]);
    let second = u128::from(vn[n - 2]);

    for j in (0..=m).rev() {
        let numerator = (u128::from(un[j + n]) << 64) | u128::from(un[j + n - 1]);
        let mut qhat = numerator / top;
        let mut rhat = numerator % top;
        while qhat >= BASE || qhat * second > ((rhat << 64) | u128::from(un[j + n - 2])) {
            qhat -= 1;
            rhat += top;
            if rhat >= BASE {
                break;
            }
        }

        // un[j..=j+n] -= qhat * vn
        let mut borrow = 0u64;
        let mut carry = 0u64;
        for i in 0..n {
            let product = qhat * u128::from(vn[i]) + u128::from(carry);
            carry = (product >> 64) as u64;
            let (diff, b1) = un[i + j].overflowing_sub(product as u64);
            let (diff, b2) = diff.overflowing_sub(borrow);
            un[i + j] = diff;
            borrow = u64::from(b1 || b2);
        }
        let (diff, b1) = un[j + n].overflowing_sub(carry);
        let (diff, b2) = diff.overflowing_sub(borrow);
        un[j + n] = diff;

        // qhat was one too large: add the divisor back
        if b1 || b2 {
            qhat -= 1;
            let mut carry = 0u64;
            for i in 0..n {
                let sum = u128::from(un[i + j]) + u128::from(vn[i]) + u128::from(carry);
                un[i + j] = sum as u64;
                carry = (sum >> 64) as u64;
            }
            un[j + n] = un[j + n].wrapping_add(carry);
        }
        quotient[j] = qhat as u64;
    }

    let remainder = shr_limbs(&un[..n], shift);
    (BigUint::from_limbs(quotient), BigUint::from_limbs(remainder))
}

// ============================================================================
// Operator impls
// ============================================================================

impl Add<&BigUint> for &BigUint {
    type Output = BigUint;

    fn add(self, rhs: &BigUint) -> BigUint {
        BigUint::from_limbs(add_limbs(&self.limbs, &rhs.limbs))
    }
}

impl Mul<&BigUint> for &BigUint {
    type Output = BigUint;

    fn mul(self, rhs: &BigUint) -> BigUint {
        BigUint::from_limbs(mul_limbs(&self.limbs, &rhs.limbs))
    }
}

impl Rem<&BigUint> for &BigUint {
    type Output = BigUint;

    /// # Panics
    ///
    /// Panics if `rhs` is zero.
    fn rem(self, rhs: &BigUint) -> BigUint {
        match self.checked_div_rem(rhs) {
            Some((_, rem)) => rem,
            None => panic!("attempt to calculate the remainder with a divisor of zero"),
        }
    }
}

impl Shl<u64> for &BigUint {
    type Output = BigUint;

    fn shl(self, bits: u64) -> BigUint {
        if self.is_zero() {
            return BigUint::zero();
        }
        let mut limbs = vec![0u64; (bits / 64) as usize];
        limbs.extend(shl_limbs(
            &self.limbs,
            (bits % 64) as u32,
            self.limbs.len() + 1,
        ));
        BigUint::from_limbs(limbs)
    }
}

impl Shr<u64> for &BigUint {
    type Output = BigUint;

    fn shr(self, bits: u64) -> BigUint {
        let skip = (bits / 64) as usize;
        if skip >= self.limbs.len() {
            return BigUint::zero();
        }
        BigUint::from_limbs(shr_limbs(&self.limbs[skip..], (bits % 64) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigUint {
        BigUint::parse(s).unwrap()
    }

    // =========================================================================
    // Addition and increment
    // =========================================================================

    #[test]
    fn increment_carries_into_new_limb() {
        let mut value = BigUint::from_u64(u64::MAX);
        value.increment();
        assert_eq!(value.limbs(), &[0, 1]);
    }

    #[test]
    fn increment_rolls_over_all_nines() {
        let mut value = big(&"9".repeat(1000));
        value.increment();
        assert_eq!(value.to_string(), format!("1{}", "0".repeat(1000)));
    }

    #[test]
    fn add_mixed_lengths() {
        let a = big("340282366920938463463374607431768211455"); // 2^128 - 1
        let b = BigUint::one();
        assert_eq!((&a + &b).to_string(), "340282366920938463463374607431768211456");
        assert_eq!((&b + &a).to_string(), "340282366920938463463374607431768211456");
    }

    // =========================================================================
    // Subtraction
    // =========================================================================

    #[test]
    fn checked_sub_borrows_across_limbs() {
        let a = big("18446744073709551616"); // 2^64
        assert_eq!(a.checked_sub_u64(1), Some(BigUint::from_u64(u64::MAX)));
    }

    #[test]
    fn checked_sub_rejects_negative_result() {
        assert_eq!(BigUint::from_u64(3).checked_sub_u64(4), None);
        assert_eq!(BigUint::from_u64(3).checked_sub_u64(3), Some(BigUint::zero()));
    }

    // =========================================================================
    // Multiplication
    // =========================================================================

    #[test]
    fn mul_matches_u128() {
        let a = 0xdead_beef_cafe_babe_u64;
        let b = 0x1234_5678_9abc_def0_u64;
        let product = &BigUint::from_u64(a) * &BigUint::from_u64(b);
        assert_eq!(product.to_u128(), Some(u128::from(a) * u128::from(b)));
    }

    #[test]
    fn mul_by_zero() {
        assert!((&big("123456789") * &BigUint::zero()).is_zero());
    }

    #[test]
    fn mul_powers_of_ten() {
        let a = big(&format!("1{}", "0".repeat(50)));
        let b = big(&format!("1{}", "0".repeat(70)));
        assert_eq!((&a * &b).to_string(), format!("1{}", "0".repeat(120)));
    }

    // =========================================================================
    // Division
    // =========================================================================

    #[test]
    fn rem_u64_small_divisors() {
        let value = big("8181");
        assert_eq!(value.rem_u64(10), 1);
        assert_eq!(value.rem_u64(3), 0);
        assert_eq!(big("18446744073709551617").rem_u64(u64::MAX), 2);
    }

    #[test]
    fn div_rem_u64_reconstructs() {
        let value = big("98765432109876543210987654321");
        let (q, r) = value.div_rem_u64(1_000_003);
        assert_eq!(&(&q * &BigUint::from_u64(1_000_003)) + &BigUint::from_u64(r), value);
    }

    #[test]
    fn div_rem_multi_limb_reconstructs() {
        let cases = [
            ("8".repeat(300), "1".repeat(45)),
            ("1".repeat(200), "18".repeat(20)),
            // Divisor with top limb near the base forces qhat correction
            (
                "340282366920938463463374607431768211455340282366920938463463374607431768211455"
                    .to_string(),
                "340282366920938463463374607431768211455".to_string(),
            ),
            (
                "115792089237316195423570985008687907853269984665640564039457584007913129639935"
                    .to_string(),
                "18446744073709551617".to_string(),
            ),
        ];
        for (u, v) in cases {
            let u = big(&u);
            let v = big(&v);
            let (q, r) = u.checked_div_rem(&v).unwrap();
            assert!(r < v, "remainder {r} not below divisor {v}");
            assert_eq!(&(&q * &v) + &r, u);
        }
    }

    #[test]
    fn div_rem_smaller_dividend() {
        let (q, r) = big("5").checked_div_rem(&big("18446744073709551617")).unwrap();
        assert!(q.is_zero());
        assert_eq!(r, BigUint::from_u64(5));
    }

    #[test]
    fn div_by_zero_is_none() {
        assert!(big("5").checked_div_rem(&BigUint::zero()).is_none());
    }

    #[test]
    #[should_panic(expected = "divisor of zero")]
    fn rem_operator_panics_on_zero() {
        let _ = &big("5") % &BigUint::zero();
    }

    // =========================================================================
    // Shifts
    // =========================================================================

    #[test]
    fn shifts_round_trip() {
        let value = big("123456789123456789123456789");
        for bits in [0, 1, 63, 64, 65, 200] {
            assert_eq!(&(&value << bits) >> bits, value);
        }
    }

    #[test]
    fn shl_is_multiplication_by_power_of_two() {
        let value = BigUint::from_u64(3);
        assert_eq!((&value << 130).to_string(), "4083388403051261561560495289181218537472");
    }

    #[test]
    fn shr_past_end_is_zero() {
        assert!((&BigUint::from_u64(u64::MAX) >> 64).is_zero());
    }
}
