//! Signed wrapper over [`BigUint`].

use super::{BigUint, ParseBigIntError};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// Sign + magnitude integer. Zero is never negative.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BigInt {
    negative: bool,
    magnitude: BigUint,
}

impl BigInt {
    /// Parse a string of ASCII decimal digits. Only non-negative values can
    /// be parsed; negative values come from [`Neg`] or `From<i64>`.
    pub fn parse(s: &str) -> Result<Self, ParseBigIntError> {
        BigUint::parse(s).map(Self::from)
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> &BigUint {
        &self.magnitude
    }

    /// The value as a [`BigUint`], or `None` if it is negative.
    pub fn to_biguint(&self) -> Option<BigUint> {
        (!self.negative).then(|| self.magnitude.clone())
    }

    pub fn into_biguint(self) -> Option<BigUint> {
        (!self.negative).then_some(self.magnitude)
    }

    pub fn increment(&mut self) {
        if !self.negative {
            self.magnitude.increment();
            return;
        }
        // -m + 1 = -(m - 1); magnitude is at least one here
        self.magnitude = self
            .magnitude
            .checked_sub_u64(1)
            .unwrap_or_default();
        self.negative = !self.magnitude.is_zero();
    }

    /// Euclidean remainder: always in `0..modulus`, also for negatives.
    ///
    /// # Panics
    ///
    /// Panics if `modulus` is zero.
    pub fn rem_euclid_u64(&self, modulus: u64) -> u64 {
        let rem = self.magnitude.rem_u64(modulus);
        if self.negative && rem != 0 {
            modulus - rem
        } else {
            rem
        }
    }

    /// `self^exp mod modulus` with the result in `0..modulus`.
    ///
    /// Returns `None` for a negative exponent or a non-positive modulus.
    pub fn modpow(&self, exp: &BigInt, modulus: &BigInt) -> Option<BigInt> {
        if exp.negative || modulus.negative || modulus.magnitude.is_zero() {
            return None;
        }
        let m = &modulus.magnitude;
        let mut base = &self.magnitude % m;
        if self.negative && !base.is_zero() {
            base = m.checked_sub(&base)?;
        }
        base.modpow(&exp.magnitude, m).map(Self::from)
    }
}

impl From<BigUint> for BigInt {
    fn from(magnitude: BigUint) -> Self {
        Self {
            negative: false,
            magnitude,
        }
    }
}

impl From<u64> for BigInt {
    fn from(value: u64) -> Self {
        Self::from(BigUint::from_u64(value))
    }
}

impl From<i64> for BigInt {
    fn from(value: i64) -> Self {
        Self {
            negative: value < 0,
            magnitude: BigUint::from_u64(value.unsigned_abs()),
        }
    }
}

impl FromStr for BigInt {
    type Err = ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Neg for BigInt {
    type Output = BigInt;

    fn neg(self) -> BigInt {
        let negative = !self.negative && !self.magnitude.is_zero();
        Self {
            negative,
            magnitude: self.magnitude,
        }
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.magnitude.to_string();
        f.pad_integral(!self.negative, "", &digits)
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_sign() {
        assert!(BigInt::parse("-8").is_err());
        assert_eq!(BigInt::parse("8").unwrap(), BigInt::from(8u64));
    }

    #[test]
    fn negative_from_i64() {
        let value = BigInt::from(-42i64);
        assert!(value.is_negative());
        assert_eq!(value.to_string(), "-42");
        assert!(value.to_biguint().is_none());
    }

    #[test]
    fn negating_zero_stays_non_negative() {
        let zero = -BigInt::from(0u64);
        assert!(!zero.is_negative());
        assert_eq!(zero, BigInt::default());
    }

    #[test]
    fn ordering_across_signs() {
        let values = [
            BigInt::from(-100i64),
            BigInt::from(-3i64),
            BigInt::from(0i64),
            BigInt::from(2i64),
            BigInt::parse("18446744073709551616").unwrap(),
        ];
        for pair in values.windows(2) {
            assert!(pair[0] < pair[1], "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn increment_through_zero() {
        let mut value = BigInt::from(-2i64);
        value.increment();
        assert_eq!(value, BigInt::from(-1i64));
        value.increment();
        assert_eq!(value, BigInt::from(0i64));
        assert!(!value.is_negative());
        value.increment();
        assert_eq!(value, BigInt::from(1i64));
    }

    #[test]
    fn rem_euclid_of_negative() {
        assert_eq!(BigInt::from(-7i64).rem_euclid_u64(3), 2);
        assert_eq!(BigInt::from(-6i64).rem_euclid_u64(3), 0);
        assert_eq!(BigInt::from(7i64).rem_euclid_u64(3), 1);
    }

    #[test]
    fn modpow_with_negative_base() {
        // (-2)^3 = -8 = 5 mod 13
        let got = BigInt::from(-2i64)
            .modpow(&BigInt::from(3i64), &BigInt::from(13i64))
            .unwrap();
        assert_eq!(got, BigInt::from(5i64));
    }

    #[test]
    fn modpow_rejects_bad_arguments() {
        let two = BigInt::from(2i64);
        assert!(two.modpow(&BigInt::from(-1i64), &BigInt::from(5i64)).is_none());
        assert!(two.modpow(&BigInt::from(1i64), &BigInt::from(0i64)).is_none());
        assert!(two.modpow(&BigInt::from(1i64), &BigInt::from(-5i64)).is_none());
    }
}
