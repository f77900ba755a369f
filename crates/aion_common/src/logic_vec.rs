//! Packed storage for four-state bit vectors.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A vector of [`Logic`] values, bit 0 being the least significant.
///
/// Each value occupies 2 bits, 32 values per `u64` word. The vector carries
/// no signedness or sizing information; see [`Number`](crate::Number) for that.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    /// Packed storage: 2 bits per logic value, 32 values per u64.
    data: Vec<u64>,
}

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

impl LogicVec {
    /// Creates a vector of the given width with every bit `Zero`.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Creates a vector of the given width with every bit set to `value`.
    pub fn filled(width: u32, value: Logic) -> Self {
        let pattern = match value {
            Logic::Zero => 0,
            Logic::One => 0x5555_5555_5555_5555,
            Logic::X => 0xAAAA_AAAA_AAAA_AAAA,
            Logic::Z => u64::MAX,
        };
        let mut v = Self {
            width,
            data: vec![pattern; word_count(width)],
        };
        v.clear_unused();
        v
    }

    /// Returns the number of bits in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        Logic::from_bits(self.data[word_idx] >> bit_offset)
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << bit_offset);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << bit_offset);
    }

    /// Iterates over the bits from least to most significant.
    pub fn iter(&self) -> impl Iterator<Item = Logic> + '_ {
        (0..self.width).map(move |i| self.get(i))
    }

    /// Creates a vector from the low `width` bits of `value`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Returns the value as a `u64` if every bit is defined and the value fits.
    pub fn to_u64(&self) -> Option<u64> {
        let mut result = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One if i < 64 => result |= 1 << i,
                Logic::One | Logic::X | Logic::Z => return None,
            }
        }
        Some(result)
    }

    /// Returns `true` if no bit is `X` or `Z`.
    pub fn is_defined(&self) -> bool {
        // A word is defined when no high bit of any 2-bit pair is set.
        self.data
            .iter()
            .all(|&w| w & 0xAAAA_AAAA_AAAA_AAAA == 0)
    }

    /// Returns `true` if every bit is `Zero`.
    pub fn is_all_zero(&self) -> bool {
        self.data.iter().all(|&w| w == 0)
    }

    /// Returns `true` if any bit is `One`.
    pub fn has_one(&self) -> bool {
        self.iter().any(|b| b == Logic::One)
    }

    /// Returns a copy extended with `fill` or truncated to `width` bits.
    pub fn resized(&self, width: u32, fill: Logic) -> Self {
        let mut v = Self::filled(width, fill);
        for i in 0..width.min(self.width) {
            v.set(i, self.get(i));
        }
        v
    }

    /// Extracts `width` bits starting at `offset`; bits past the end read as `X`.
    pub fn slice(&self, offset: i64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width {
            let src = offset + i as i64;
            let bit = if src >= 0 && src < self.width as i64 {
                self.get(src as u32)
            } else {
                Logic::X
            };
            v.set(i, bit);
        }
        v
    }

    /// Concatenates `self` (high part) with `low`.
    pub fn concat(&self, low: &LogicVec) -> Self {
        let mut v = Self::new(self.width + low.width);
        for i in 0..low.width {
            v.set(i, low.get(i));
        }
        for i in 0..self.width {
            v.set(low.width + i, self.get(i));
        }
        v
    }

    /// Parses a string such as `"10xz"`, most significant bit first.
    ///
    /// Underscores are skipped. Returns `None` on any other character.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let digits: Vec<char> = s.chars().filter(|&c| c != '_').collect();
        let mut v = Self::new(digits.len() as u32);
        for (i, c) in digits.iter().rev().enumerate() {
            v.set(i as u32, Logic::from_char(*c)?);
        }
        Some(v)
    }

    fn clear_unused(&mut self) {
        let used = self.width % VALUES_PER_WORD;
        if used != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1u64 << (used * 2)) - 1;
            }
        }
    }

    fn zip_with(&self, rhs: &LogicVec, f: impl Fn(Logic, Logic) -> Logic) -> LogicVec {
        let width = self.width.max(rhs.width);
        let mut result = LogicVec::new(width);
        for i in 0..width {
            let a = if i < self.width { self.get(i) } else { Logic::Zero };
            let b = if i < rhs.width { rhs.get(i) } else { Logic::Zero };
            result.set(i, f(a, b));
        }
        result
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}

/// Bitwise AND; the narrower operand is zero-extended.
impl BitAnd for &LogicVec {
    type Output = LogicVec;

    fn bitand(self, rhs: Self) -> LogicVec {
        self.zip_with(rhs, |a, b| a & b)
    }
}

/// Bitwise OR; the narrower operand is zero-extended.
impl BitOr for &LogicVec {
    type Output = LogicVec;

    fn bitor(self, rhs: Self) -> LogicVec {
        self.zip_with(rhs, |a, b| a | b)
    }
}

/// Bitwise XOR; the narrower operand is zero-extended.
impl BitXor for &LogicVec {
    type Output = LogicVec;

    fn bitxor(self, rhs: Self) -> LogicVec {
        self.zip_with(rhs, |a, b| a ^ b)
    }
}

impl Not for &LogicVec {
    type Output = LogicVec;

    fn not(self) -> LogicVec {
        let mut result = LogicVec::new(self.width);
        for i in 0..self.width {
            result.set(i, !self.get(i));
        }
        result
    }
}

/// Returns the number of u64 words needed to store `width` logic values.
fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}
