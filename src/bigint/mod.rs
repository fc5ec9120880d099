//! Arbitrary-precision integers.
//!
//! Two types live here:
//!
//! - [`BigUint`]: a non-negative magnitude stored as little-endian `u64`
//!   limbs. All arithmetic is implemented on this type.
//! - [`BigInt`]: a sign + magnitude wrapper used at API boundaries where a
//!   caller could hand over a negative value.
//!
//! The prime search only needs a narrow slice of arithmetic: parsing,
//! comparison, small-word remainders, addition of small offsets, and modular
//! exponentiation through [`Modulus`]. Everything else in [`arith`] exists to
//! support those operations.
//!
//! ## Representation
//!
//! A `BigUint` never carries high zero limbs, so zero is the empty limb
//! vector and two equal values always have identical limbs. Every
//! constructor funnels through [`BigUint::from_limbs`] to keep that true.

mod arith;
mod modular;
mod signed;

pub use modular::Modulus;
pub use signed::BigInt;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseBigIntError {
    #[error("cannot parse an integer from an empty string")]
    Empty,
    #[error("invalid digit {found:?} at position {position}")]
    InvalidDigit { position: usize, found: char },
}

/// 10^19, the largest power of ten that fits in a limb.
const DECIMAL_CHUNK: u64 = 10_000_000_000_000_000_000;
const DECIMAL_CHUNK_DIGITS: usize = 19;

/// Non-negative integer of unbounded size.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BigUint {
    limbs: Vec<u64>,
}

impl BigUint {
    pub fn zero() -> Self {
        Self { limbs: Vec::new() }
    }

    pub fn one() -> Self {
        Self::from_u64(1)
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_limbs(vec![value])
    }

    pub fn from_u128(value: u128) -> Self {
        Self::from_limbs(vec![value as u64, (value >> 64) as u64])
    }

    /// Build from little-endian limbs, dropping high zero limbs.
    pub(crate) fn from_limbs(mut limbs: Vec<u64>) -> Self {
        while limbs.last() == Some(&0) {
            limbs.pop();
        }
        Self { limbs }
    }

    pub(crate) fn limbs(&self) -> &[u64] {
        &self.limbs
    }

    /// Interpret big-endian bytes as an unsigned integer.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let limbs = bytes
            .rchunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
            })
            .collect();
        Self::from_limbs(limbs)
    }

    /// Minimal big-endian byte encoding. Zero encodes as an empty slice.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = self
            .limbs
            .iter()
            .rev()
            .flat_map(|limb| limb.to_be_bytes())
            .collect();
        let leading = bytes.iter().take_while(|&&b| b == 0).count();
        bytes.drain(..leading);
        bytes
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.limbs == [1]
    }

    pub fn is_even(&self) -> bool {
        self.limbs.first().is_none_or(|limb| limb & 1 == 0)
    }

    pub fn is_odd(&self) -> bool {
        !self.is_even()
    }

    pub fn to_u64(&self) -> Option<u64> {
        match self.limbs.as_slice() {
            [] => Some(0),
            [low] => Some(*low),
            _ => None,
        }
    }

    pub fn to_u128(&self) -> Option<u128> {
        match self.limbs.as_slice() {
            [] => Some(0),
            [low] => Some(u128::from(*low)),
            [low, high] => Some(u128::from(*low) | (u128::from(*high) << 64)),
            _ => None,
        }
    }

    /// Number of significant bits. Zero has zero bits.
    pub fn bits(&self) -> u64 {
        match self.limbs.last() {
            Some(top) => self.limbs.len() as u64 * 64 - u64::from(top.leading_zeros()),
            None => 0,
        }
    }

    /// Value of bit `index` (0 = least significant).
    pub fn bit(&self, index: u64) -> bool {
        let limb = (index / 64) as usize;
        self.limbs
            .get(limb)
            .is_some_and(|value| (value >> (index % 64)) & 1 == 1)
    }

    /// Position of the lowest set bit, or `None` for zero.
    pub fn trailing_zeros(&self) -> Option<u64> {
        self.limbs
            .iter()
            .enumerate()
            .find(|(_, limb)| **limb != 0)
            .map(|(i, limb)| i as u64 * 64 + u64::from(limb.trailing_zeros()))
    }

    /// Parse a string of ASCII decimal digits.
    ///
    /// Signs, whitespace and separators are rejected; leading zeros are
    /// accepted and do not change the value.
    pub fn parse(s: &str) -> Result<Self, ParseBigIntError> {
        if s.is_empty() {
            return Err(ParseBigIntError::Empty);
        }
        if let Some((position, found)) = s.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
            return Err(ParseBigIntError::InvalidDigit { position, found });
        }

        let digits = s.as_bytes();
        let mut value = Self::zero();
        let head = match digits.len() % DECIMAL_CHUNK_DIGITS {
            0 => DECIMAL_CHUNK_DIGITS,
            n => n,
        };
        let (first, rest) = digits.split_at(head.min(digits.len()));
        value.mul_small_add(1, chunk_value(first));
        for chunk in rest.chunks(DECIMAL_CHUNK_DIGITS) {
            value.mul_small_add(DECIMAL_CHUNK, chunk_value(chunk));
        }
        Ok(value)
    }

    /// Number of decimal digits. Zero has one digit.
    pub fn decimal_digits(&self) -> usize {
        self.to_string().len()
    }
}

fn chunk_value(digits: &[u8]) -> u64 {
    digits
        .iter()
        .fold(0u64, |acc, &d| acc * 10 + u64::from(d - b'0'))
}

impl From<u64> for BigUint {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl FromStr for BigUint {
    type Err = ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for BigUint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.limbs
            .len()
            .cmp(&other.limbs.len())
            .then_with(|| self.limbs.iter().rev().cmp(other.limbs.iter().rev()))
    }
}

impl PartialOrd for BigUint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq<u64> for BigUint {
    fn eq(&self, other: &u64) -> bool {
        self.to_u64() == Some(*other)
    }
}

impl fmt::Display for BigUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.pad_integral(true, "", "0");
        }
        let mut chunks = Vec::with_capacity(self.limbs.len() * 2);
        let mut rest = self.clone();
        while !rest.is_zero() {
            let (quotient, chunk) = rest.div_rem_u64(DECIMAL_CHUNK);
            chunks.push(chunk);
            rest = quotient;
        }
        let mut out = String::with_capacity(chunks.len() * DECIMAL_CHUNK_DIGITS);
        let mut iter = chunks.iter().rev();
        if let Some(top) = iter.next() {
            out.push_str(&top.to_string());
        }
        for chunk in iter {
            out.push_str(&format!("{chunk:019}"));
        }
        f.pad_integral(true, "", &out)
    }
}

impl fmt::Debug for BigUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigUint({self})")
    }
}
