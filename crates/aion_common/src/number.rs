//! Arbitrary-width four-state integers with Verilog arithmetic.
//!
//! [`Number`] is the value domain of constant folding: a [`LogicVec`] plus
//! signedness, a sized/unsized marker (`8'd3` versus `3`), and a string marker
//! for values that came from string literals. Every arithmetic operator
//! returns an all-`x` result when an operand holds an `x` or `z` bit.

use crate::logic::Logic;
use crate::logic_vec::LogicVec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Width of an unsized integer literal or genvar value.
pub const INTEGER_WIDTH: u32 = 32;

/// A four-state integer value of arbitrary width.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Number {
    bits: LogicVec,
    signed: bool,
    sized: bool,
    string: bool,
}

impl Number {
    /// Wraps raw bits.
    pub fn new(bits: LogicVec, signed: bool, sized: bool) -> Self {
        Self {
            bits,
            signed,
            sized,
            string: false,
        }
    }

    /// A signed, unsized integer, at least [`INTEGER_WIDTH`] bits wide.
    pub fn from_i64(value: i64) -> Self {
        let needed = 65 - if value < 0 { (!value).leading_zeros() } else { value.leading_zeros() };
        let width = needed.max(INTEGER_WIDTH);
        Self::new(LogicVec::from_u64(value as u64, width), true, false)
    }

    /// A sized unsigned value holding the low `width` bits of `value`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        Self::new(LogicVec::from_u64(value, width), false, true)
    }

    /// A sized value of `width` bits holding `value` in two's complement.
    pub fn from_i64_width(value: i64, width: u32, signed: bool) -> Self {
        let fill = if value < 0 { Logic::One } else { Logic::Zero };
        let bits = LogicVec::from_u64(value as u64, width.min(64)).resized(width, fill);
        Self::new(bits, signed, true)
    }

    /// A 1-bit unsigned value.
    pub fn from_bool(value: bool) -> Self {
        Self::from_logic(Logic::from_bool(value))
    }

    /// A 1-bit unsigned value holding `bit`.
    pub fn from_logic(bit: Logic) -> Self {
        Self::new(LogicVec::filled(1, bit), false, true)
    }

    /// An all-`x` value of the given width.
    pub fn all_x(width: u32) -> Self {
        Self::new(LogicVec::filled(width, Logic::X), false, true)
    }

    /// An all-zero value of the given width.
    pub fn zero(width: u32) -> Self {
        Self::new(LogicVec::new(width), false, true)
    }

    /// Parses Verilog digits such as `"10xz"` into a sized unsigned value.
    pub fn from_binary_str(digits: &str) -> Option<Self> {
        LogicVec::from_binary_str(digits).map(|bits| Self::new(bits, false, true))
    }

    /// Encodes a string literal, 8 bits per character, first character most significant.
    pub fn from_string(text: &str) -> Self {
        let bytes = text.as_bytes();
        let width = (bytes.len() as u32 * 8).max(8);
        let mut bits = LogicVec::new(width);
        for (i, byte) in bytes.iter().rev().enumerate() {
            for b in 0..8 {
                if byte & (1 << b) != 0 {
                    bits.set(i as u32 * 8 + b, Logic::One);
                }
            }
        }
        Self {
            bits,
            signed: false,
            sized: true,
            string: true,
        }
    }

    /// Rounds a real value to the nearest integer (ties away from zero).
    pub fn from_f64(value: f64) -> Self {
        Self::from_i64(value.round() as i64)
    }

    /// Returns the underlying bits.
    pub fn bits(&self) -> &LogicVec {
        &self.bits
    }

    /// Returns the width in bits.
    pub fn width(&self) -> u32 {
        self.bits.width()
    }

    /// Returns `true` if the value is signed.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns `true` if the value has an explicit width.
    pub fn is_sized(&self) -> bool {
        self.sized
    }

    /// Returns `true` if the value was produced from a string literal.
    pub fn is_string(&self) -> bool {
        self.string
    }

    /// Returns `true` if no bit is `x` or `z`.
    pub fn is_defined(&self) -> bool {
        self.bits.is_defined()
    }

    /// Returns bit `index`, or `x` when out of range.
    pub fn bit(&self, index: u32) -> Logic {
        if index < self.width() {
            self.bits.get(index)
        } else {
            Logic::X
        }
    }

    /// Returns `true` if every bit is a defined zero.
    pub fn is_zero(&self) -> bool {
        self.bits.is_all_zero()
    }

    /// Verilog truth value: `Some(true)` if any bit is `1`, `Some(false)` if
    /// all bits are `0`, `None` otherwise.
    pub fn is_true(&self) -> Option<bool> {
        if self.bits.has_one() {
            Some(true)
        } else if self.is_defined() {
            Some(false)
        } else {
            None
        }
    }

    /// Interprets the value as an `i64`, sign-extending signed values.
    ///
    /// Returns `None` if any bit is undefined or the value does not fit.
    pub fn as_i64(&self) -> Option<i64> {
        if !self.is_defined() {
            return None;
        }
        let width = self.width();
        if width == 0 {
            return Some(0);
        }
        let negative = self.signed && self.bits.get(width - 1) == Logic::One;
        let fill = if negative { Logic::One } else { Logic::Zero };
        for i in 63.min(width)..width {
            if self.bits.get(i) != fill {
                return None;
            }
        }
        let mut value: u64 = if negative { u64::MAX } else { 0 };
        for i in 0..width.min(64) {
            let mask = 1u64 << i;
            match self.bits.get(i) {
                Logic::One => value |= mask,
                _ => value &= !mask,
            }
        }
        Some(value as i64)
    }

    /// Interprets the bits as an unsigned `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        self.bits.to_u64()
    }

    /// Converts a defined value to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_i64().map(|v| v as f64)
    }

    /// Decodes a value built by [`Number::from_string`].
    pub fn as_string(&self) -> String {
        let mut out = String::new();
        let chars = self.width() / 8;
        for c in (0..chars).rev() {
            let mut byte = 0u8;
            for b in 0..8 {
                if self.bits.get(c * 8 + b) == Logic::One {
                    byte |= 1 << b;
                }
            }
            if byte != 0 {
                out.push(byte as char);
            }
        }
        out
    }

    /// Returns a copy with the given signedness.
    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Returns a copy with the given sized marker.
    pub fn with_sized(mut self, sized: bool) -> Self {
        self.sized = sized;
        self
    }

    /// Extends (sign-extending signed values) or truncates to `width` bits.
    ///
    /// Flags are preserved.
    pub fn resized(&self, width: u32) -> Self {
        let fill = self.extension_bit();
        Self {
            bits: self.bits.resized(width, fill),
            signed: self.signed,
            sized: self.sized,
            string: self.string,
        }
    }

    fn extension_bit(&self) -> Logic {
        if self.signed && self.width() > 0 {
            self.bits.get(self.width() - 1)
        } else {
            Logic::Zero
        }
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    /// `self + rhs`.
    pub fn add(&self, rhs: &Number) -> Number {
        self.arith(rhs, |a, b, w| words::add(a, b, w))
    }

    /// `self - rhs`.
    pub fn sub(&self, rhs: &Number) -> Number {
        self.arith(rhs, |a, b, w| words::add(a, &words::negate(b, w), w))
    }

    /// `self * rhs`.
    pub fn mul(&self, rhs: &Number) -> Number {
        self.arith(rhs, |a, b, w| words::mul(a, b, w))
    }

    /// `self / rhs`, truncating toward zero. Division by zero yields all `x`.
    pub fn div(&self, rhs: &Number) -> Number {
        self.divide(rhs, false)
    }

    /// `self % rhs`; the sign follows the dividend. Division by zero yields all `x`.
    pub fn rem(&self, rhs: &Number) -> Number {
        self.divide(rhs, true)
    }

    /// `self ** rhs`.
    pub fn pow(&self, rhs: &Number) -> Number {
        let (width, signed, sized) = self.result_shape(rhs);
        if !self.is_defined() || !rhs.is_defined() {
            return Number::all_x(self.width());
        }
        let base = self.resized(width).with_signed(signed);
        if rhs.signed && rhs.width() > 0 && rhs.bit(rhs.width() - 1) == Logic::One {
            // Negative exponent: only 1 and -1 survive.
            let value = base.as_i64().unwrap_or(0);
            let result = match value {
                1 => 1,
                -1 if rhs.bit(0) == Logic::One => -1,
                -1 => 1,
                _ => 0,
            };
            return Number::from_i64_width(result, width, signed).with_sized(sized);
        }
        let mut result = words::from_u64(1, width);
        let mut acc = words::to_words(base.bits());
        let exponent = words::to_words(rhs.bits());
        for i in 0..rhs.width() {
            if words::test(&exponent, i) {
                result = words::mul(&result, &acc, width);
            }
            acc = words::mul(&acc, &acc, width);
        }
        Number::new(words::to_logic_vec(&result, width), signed, sized)
    }

    /// Two's complement negation, widened by one bit so it cannot overflow.
    ///
    /// The result is always signed.
    pub fn neg(&self) -> Number {
        let width = self.width() + 1;
        if !self.is_defined() {
            return Number::all_x(width).with_signed(true);
        }
        let widened = words::to_words(&self.bits.resized(width, self.extension_bit()));
        let bits = words::to_logic_vec(&words::negate(&widened, width), width);
        Number::new(bits, true, self.sized)
    }

    /// Negation at the operand's own width.
    pub fn neg_wrapping(&self) -> Number {
        let width = self.width();
        self.neg().resized(width).with_signed(self.signed)
    }

    fn result_shape(&self, rhs: &Number) -> (u32, bool, bool) {
        (
            self.width().max(rhs.width()),
            self.signed && rhs.signed,
            self.sized || rhs.sized,
        )
    }

    fn arith(&self, rhs: &Number, op: impl Fn(&[u64], &[u64], u32) -> Vec<u64>) -> Number {
        if !self.is_defined() || !rhs.is_defined() {
            return Number::all_x(self.width());
        }
        let (width, signed, sized) = self.result_shape(rhs);
        let a = words::to_words(&self.resized(width).bits);
        let b = words::to_words(&rhs.resized(width).bits);
        Number::new(words::to_logic_vec(&op(&a, &b, width), width), signed, sized)
    }

    fn divide(&self, rhs: &Number, remainder: bool) -> Number {
        if !self.is_defined() || !rhs.is_defined() || rhs.is_zero() {
            return Number::all_x(self.width());
        }
        let (width, signed, sized) = self.result_shape(rhs);
        let a = self.resized(width).with_signed(signed);
        let b = rhs.resized(width).with_signed(signed);
        let a_neg = signed && a.bit(width - 1) == Logic::One;
        let b_neg = signed && b.bit(width - 1) == Logic::One;
        let mut a_mag = words::to_words(&a.bits);
        let mut b_mag = words::to_words(&b.bits);
        if a_neg {
            a_mag = words::negate(&a_mag, width);
        }
        if b_neg {
            b_mag = words::negate(&b_mag, width);
        }
        let (q, r) = words::divrem(&a_mag, &b_mag, width);
        let (mut result, negative) = if remainder {
            (r, a_neg)
        } else {
            (q, a_neg != b_neg)
        };
        if negative {
            result = words::negate(&result, width);
        }
        Number::new(words::to_logic_vec(&result, width), signed, sized)
    }

    // ------------------------------------------------------------------
    // Bitwise and reduction
    // ------------------------------------------------------------------

    /// Bitwise AND.
    pub fn and(&self, rhs: &Number) -> Number {
        self.bitwise(rhs, |a, b| a & b)
    }

    /// Bitwise OR.
    pub fn or(&self, rhs: &Number) -> Number {
        self.bitwise(rhs, |a, b| a | b)
    }

    /// Bitwise XOR.
    pub fn xor(&self, rhs: &Number) -> Number {
        self.bitwise(rhs, |a, b| a ^ b)
    }

    /// Bitwise XNOR.
    pub fn xnor(&self, rhs: &Number) -> Number {
        self.bitwise(rhs, |a, b| !(a ^ b))
    }

    /// Bitwise NOT.
    pub fn not(&self) -> Number {
        Number::new(!&self.bits, self.signed, self.sized)
    }

    fn bitwise(&self, rhs: &Number, f: impl Fn(Logic, Logic) -> Logic) -> Number {
        let (width, signed, sized) = self.result_shape(rhs);
        let a = self.resized(width);
        let b = rhs.resized(width);
        let mut bits = LogicVec::new(width);
        for i in 0..width {
            bits.set(i, f(a.bits.get(i), b.bits.get(i)));
        }
        Number::new(bits, signed, sized)
    }

    /// Reduction AND.
    pub fn reduce_and(&self) -> Number {
        Number::from_logic(self.bits.iter().fold(Logic::One, |acc, b| acc & b))
    }

    /// Reduction OR.
    pub fn reduce_or(&self) -> Number {
        Number::from_logic(self.bits.iter().fold(Logic::Zero, |acc, b| acc | b))
    }

    /// Reduction XOR.
    pub fn reduce_xor(&self) -> Number {
        Number::from_logic(self.bits.iter().fold(Logic::Zero, |acc, b| acc ^ b))
    }

    // ------------------------------------------------------------------
    // Comparison and logical
    // ------------------------------------------------------------------

    /// Compares two defined values, signed if both operands are signed.
    pub fn compare(&self, rhs: &Number) -> Option<Ordering> {
        if !self.is_defined() || !rhs.is_defined() {
            return None;
        }
        let (width, signed, _) = self.result_shape(rhs);
        let a = self.resized(width);
        let b = rhs.resized(width);
        if signed && width > 0 {
            let a_neg = a.bit(width - 1) == Logic::One;
            let b_neg = b.bit(width - 1) == Logic::One;
            if a_neg != b_neg {
                return Some(if a_neg { Ordering::Less } else { Ordering::Greater });
            }
        }
        for i in (0..width).rev() {
            match (a.bit(i), b.bit(i)) {
                (Logic::One, Logic::Zero) => return Some(Ordering::Greater),
                (Logic::Zero, Logic::One) => return Some(Ordering::Less),
                _ => {}
            }
        }
        Some(Ordering::Equal)
    }

    fn compare_with(&self, rhs: &Number, f: impl Fn(Ordering) -> bool) -> Number {
        match self.compare(rhs) {
            Some(ord) => Number::from_bool(f(ord)),
            None => Number::all_x(1),
        }
    }

    /// `self == rhs` (`x` if either operand is undefined).
    pub fn cmp_eq(&self, rhs: &Number) -> Number {
        self.compare_with(rhs, |o| o == Ordering::Equal)
    }

    /// `self != rhs` (`x` if either operand is undefined).
    pub fn cmp_ne(&self, rhs: &Number) -> Number {
        self.compare_with(rhs, |o| o != Ordering::Equal)
    }

    /// `self < rhs`.
    pub fn cmp_lt(&self, rhs: &Number) -> Number {
        self.compare_with(rhs, |o| o == Ordering::Less)
    }

    /// `self <= rhs`.
    pub fn cmp_le(&self, rhs: &Number) -> Number {
        self.compare_with(rhs, |o| o != Ordering::Greater)
    }

    /// `self > rhs`.
    pub fn cmp_gt(&self, rhs: &Number) -> Number {
        self.compare_with(rhs, |o| o == Ordering::Greater)
    }

    /// `self >= rhs`.
    pub fn cmp_ge(&self, rhs: &Number) -> Number {
        self.compare_with(rhs, |o| o != Ordering::Less)
    }

    /// `self === rhs`: exact four-state identity.
    pub fn case_eq(&self, rhs: &Number) -> Number {
        let width = self.width().max(rhs.width());
        Number::from_bool(self.resized(width).bits == rhs.resized(width).bits)
    }

    /// `self !== rhs`.
    pub fn case_ne(&self, rhs: &Number) -> Number {
        self.case_eq(rhs).not()
    }

    /// `!self`.
    pub fn log_not(&self) -> Number {
        match self.is_true() {
            Some(v) => Number::from_bool(!v),
            None => Number::all_x(1),
        }
    }

    /// `self && rhs`.
    pub fn log_and(&self, rhs: &Number) -> Number {
        match (self.is_true(), rhs.is_true()) {
            (Some(false), _) | (_, Some(false)) => Number::from_bool(false),
            (Some(true), Some(true)) => Number::from_bool(true),
            _ => Number::all_x(1),
        }
    }

    /// `self || rhs`.
    pub fn log_or(&self, rhs: &Number) -> Number {
        match (self.is_true(), rhs.is_true()) {
            (Some(true), _) | (_, Some(true)) => Number::from_bool(true),
            (Some(false), Some(false)) => Number::from_bool(false),
            _ => Number::all_x(1),
        }
    }

    // ------------------------------------------------------------------
    // Shifts and structure
    // ------------------------------------------------------------------

    /// Logical left shift keeping the width; vacated bits are zero.
    pub fn shl(&self, amount: u64) -> Number {
        self.shifted(amount, true, Logic::Zero)
    }

    /// Logical right shift keeping the width; vacated bits are zero.
    pub fn shr(&self, amount: u64) -> Number {
        self.shifted(amount, false, Logic::Zero)
    }

    /// Arithmetic right shift: signed values replicate the sign bit.
    pub fn ashr(&self, amount: u64) -> Number {
        self.shifted(amount, false, self.extension_bit())
    }

    fn shifted(&self, amount: u64, left: bool, fill: Logic) -> Number {
        let width = self.width();
        let mut bits = LogicVec::filled(width, fill);
        if amount < width as u64 {
            let amount = amount as u32;
            for i in 0..width - amount {
                if left {
                    bits.set(i + amount, self.bits.get(i));
                } else {
                    bits.set(i, self.bits.get(i + amount));
                }
            }
        }
        Number::new(bits, self.signed, self.sized)
    }

    /// Concatenates `parts`, the first being most significant.
    ///
    /// The result is sized and unsigned.
    pub fn concat(parts: &[Number]) -> Number {
        let mut bits = LogicVec::new(0);
        for part in parts {
            bits = bits.concat(&part.bits);
        }
        Number::new(bits, false, true)
    }

    /// Concatenates `count` copies of this value.
    pub fn repeat(&self, count: u32) -> Number {
        let copies: Vec<Number> = (0..count).map(|_| self.clone()).collect();
        Number::concat(&copies)
    }

    /// Extracts `width` bits starting at bit `offset`; bits past either end are `x`.
    pub fn slice(&self, offset: i64, width: u32) -> Number {
        Number::new(self.bits.slice(offset, width), false, true)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.string {
            return write!(f, "\"{}\"", self.as_string());
        }
        if !self.sized {
            if let Some(v) = self.as_i64() {
                return write!(f, "{v}");
            }
        }
        let s = if self.signed { "s" } else { "" };
        match self.as_u64() {
            Some(v) if self.width() <= 64 && !self.signed => {
                write!(f, "{}'{s}d{v}", self.width())
            }
            _ => write!(f, "{}'{s}b{}", self.width(), self.bits),
        }
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number({}'{}b{})", self.width(), if self.signed { "s" } else { "" }, self.bits)
    }
}

/// Two-state arithmetic on little-endian `u64` words, masked to a bit width.
mod words {
    use crate::logic::Logic;
    use crate::logic_vec::LogicVec;

    fn len(width: u32) -> usize {
        width.div_ceil(64) as usize
    }

    fn mask(mut w: Vec<u64>, width: u32) -> Vec<u64> {
        w.resize(len(width), 0);
        let used = width % 64;
        if used != 0 {
            if let Some(last) = w.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
        w
    }

    pub fn to_words(bits: &LogicVec) -> Vec<u64> {
        let mut w = vec![0u64; len(bits.width())];
        for (i, bit) in bits.iter().enumerate() {
            if bit == Logic::One {
                w[i / 64] |= 1 << (i % 64);
            }
        }
        w
    }

    pub fn to_logic_vec(w: &[u64], width: u32) -> LogicVec {
        let mut bits = LogicVec::new(width);
        for i in 0..width {
            if test(w, i) {
                bits.set(i, Logic::One);
            }
        }
        bits
    }

    pub fn from_u64(value: u64, width: u32) -> Vec<u64> {
        mask(vec![value], width)
    }

    pub fn test(w: &[u64], bit: u32) -> bool {
        w.get((bit / 64) as usize)
            .is_some_and(|word| (word >> (bit % 64)) & 1 != 0)
    }

    pub fn add(a: &[u64], b: &[u64], width: u32) -> Vec<u64> {
        let n = len(width);
        let mut out = Vec::with_capacity(n);
        let mut carry = 0u128;
        for i in 0..n {
            let sum = *a.get(i).unwrap_or(&0) as u128 + *b.get(i).unwrap_or(&0) as u128 + carry;
            out.push(sum as u64);
            carry = sum >> 64;
        }
        mask(out, width)
    }

    pub fn negate(a: &[u64], width: u32) -> Vec<u64> {
        let inverted: Vec<u64> = (0..len(width)).map(|i| !a.get(i).unwrap_or(&0)).collect();
        add(&mask(inverted, width), &from_u64(1, width), width)
    }

    pub fn mul(a: &[u64], b: &[u64], width: u32) -> Vec<u64> {
        let n = len(width);
        let mut out = vec![0u64; n];
        for i in 0..n {
            let mut carry = 0u128;
            let ai = *a.get(i).unwrap_or(&0) as u128;
            for j in 0..n - i {
                let bj = *b.get(j).unwrap_or(&0) as u128;
                let cur = out[i + j] as u128 + ai * bj + carry;
                out[i + j] = cur as u64;
                carry = cur >> 64;
            }
        }
        mask(out, width)
    }

    fn shl1(w: &mut [u64]) {
        let mut carry = 0;
        for word in w.iter_mut() {
            let next = *word >> 63;
            *word = (*word << 1) | carry;
            carry = next;
        }
    }

    fn ge(a: &[u64], b: &[u64]) -> bool {
        for i in (0..a.len().max(b.len())).rev() {
            let x = *a.get(i).unwrap_or(&0);
            let y = *b.get(i).unwrap_or(&0);
            if x != y {
                return x > y;
            }
        }
        true
    }

    fn sub_in_place(a: &mut [u64], b: &[u64]) {
        let mut borrow = 0u64;
        for (i, word) in a.iter_mut().enumerate() {
            let y = *b.get(i).unwrap_or(&0);
            let (d1, o1) = word.overflowing_sub(y);
            let (d2, o2) = d1.overflowing_sub(borrow);
            *word = d2;
            borrow = (o1 || o2) as u64;
        }
    }

    /// Unsigned restoring division. `b` must be non-zero.
    pub fn divrem(a: &[u64], b: &[u64], width: u32) -> (Vec<u64>, Vec<u64>) {
        let n = len(width) + 1;
        let mut q = vec![0u64; n];
        let mut r = vec![0u64; n];
        for i in (0..width).rev() {
            shl1(&mut r);
            if test(a, i) {
                r[0] |= 1;
            }
            if ge(&r, b) {
                sub_in_place(&mut r, b);
                q[(i / 64) as usize] |= 1 << (i % 64);
            }
        }
        (mask(q, width), mask(r, width))
    }
}
