//! Arbitrary precision integers
//!
//! `ApInt` stores a fixed bit width and the value as little-endian 64-bit
//! words. Bits above the width are always zero. Values wrap modulo
//! 2^width; signedness is an interpretation, not part of the value.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

use irf_common::IrError;

use crate::types::MAX_INT_BITS;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApInt {
    bits: u32,
    words: Vec<u64>,
}

impl ApInt {
    /// Parse `text` in `radix` into a `num_bits` wide integer.
    ///
    /// An optional leading `-` or `+` is accepted. Literals that do not fit
    /// are truncated to two's complement within `num_bits` and a warning is
    /// logged; malformed text is an error.
    pub fn new(num_bits: u32, text: &str, radix: u8) -> Result<Self, IrError> {
        Self::check_width(num_bits)?;
        if !matches!(radix, 2 | 8 | 10 | 16 | 36) {
            return Err(IrError::UnsupportedRadix { radix });
        }

        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        if digits.is_empty() {
            return Err(IrError::invalid_literal(text, "no digits"));
        }

        let mut value = Self::zero(num_bits);
        let mut truncated = false;
        for c in digits.chars() {
            let digit = c.to_digit(radix as u32).ok_or_else(|| {
                IrError::invalid_literal(text, format!("invalid digit '{c}' for radix {radix}"))
            })?;
            truncated |= value.mul_add(radix as u64, digit as u64);
        }

        if negative {
            // The magnitude of a negative literal may be at most 2^(n-1)
            if !truncated && value.top_bit() && !value.is_min_signed() {
                truncated = true;
            }
            value.negate();
        }

        if truncated {
            warn!("integer literal '{text}' does not fit in i{num_bits}, truncated to {value}");
        }
        Ok(value)
    }

    /// `value` truncated to `num_bits`, sign extended first when wider than 64.
    pub fn from_i64(num_bits: u32, value: i64) -> Self {
        if let Err(e) = Self::check_width(num_bits) {
            panic!("{e}");
        }
        let mut result = Self::zero(num_bits);
        let fill = if value < 0 { u64::MAX } else { 0 };
        result.words[0] = value as u64;
        for word in result.words.iter_mut().skip(1) {
            *word = fill;
        }
        result.clear_unused_bits();
        result
    }

    pub fn from_u64(num_bits: u32, value: u64) -> Self {
        if let Err(e) = Self::check_width(num_bits) {
            panic!("{e}");
        }
        let mut result = Self::zero(num_bits);
        result.words[0] = value;
        result.clear_unused_bits();
        result
    }

    fn check_width(num_bits: u32) -> Result<(), IrError> {
        if num_bits == 0 || num_bits > MAX_INT_BITS {
            return Err(IrError::InvalidBitWidth { bits: num_bits, max: MAX_INT_BITS });
        }
        Ok(())
    }

    fn zero(num_bits: u32) -> Self {
        Self {
            bits: num_bits,
            words: vec![0; num_bits.div_ceil(64) as usize],
        }
    }

    pub fn bit_width(&self) -> u32 {
        self.bits
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// True when the sign bit is set
    pub fn is_negative(&self) -> bool {
        self.top_bit()
    }

    /// Unsigned value, `None` if it does not fit in 64 bits
    pub fn zext_value(&self) -> Option<u64> {
        if self.words[1..].iter().any(|&w| w != 0) {
            return None;
        }
        Some(self.words[0])
    }

    /// Signed value, `None` if it does not fit in 64 bits
    pub fn sext_value(&self) -> Option<i64> {
        let negative = self.is_negative();
        if self.bits <= 64 {
            let shift = 64 - self.bits;
            return Some(((self.words[0] << shift) as i64) >> shift);
        }
        // Wider than 64: every bit from 63 up must equal the sign
        let fill = if negative { u64::MAX } else { 0 };
        let mut upper = self.clone();
        if negative {
            upper.fill_unused_bits();
        }
        if upper.words[1..].iter().any(|&w| w != fill) {
            return None;
        }
        let low = upper.words[0] as i64;
        ((low < 0) == negative).then_some(low)
    }

    /// Digits in `radix` (2..=36), with a leading `-` for negative values
    /// when `signed` is set.
    pub fn to_string_radix(&self, radix: u8, signed: bool) -> String {
        assert!((2..=36).contains(&radix), "radix {radix} out of range");

        let mut magnitude = self.clone();
        let negative = signed && self.is_negative();
        if negative {
            // The minimum signed value negates to itself, which still reads
            // correctly as an unsigned magnitude
            magnitude.negate();
        }

        let mut digits = Vec::new();
        if magnitude.is_zero() {
            digits.push(b'0');
        }
        while !magnitude.is_zero() {
            let rem = magnitude.div_rem_small(radix as u64);
            digits.push(std::char::from_digit(rem as u32, radix as u32).unwrap_or('?') as u8);
        }
        if negative {
            digits.push(b'-');
        }
        digits.reverse();
        String::from_utf8(digits).unwrap_or_default()
    }

    // ---- word arithmetic ----

    /// self = self * mul + add. Returns true if bits were lost.
    fn mul_add(&mut self, mul: u64, add: u64) -> bool {
        let mut carry = add as u128;
        for word in self.words.iter_mut() {
            let wide = (*word as u128) * (mul as u128) + carry;
            *word = wide as u64;
            carry = wide >> 64;
        }
        let lost_high = self.unused_bits_set();
        self.clear_unused_bits();
        carry != 0 || lost_high
    }

    /// self = self / d, returns the remainder. Treats the value as unsigned.
    fn div_rem_small(&mut self, d: u64) -> u64 {
        let mut rem: u128 = 0;
        for word in self.words.iter_mut().rev() {
            let cur = (rem << 64) | (*word as u128);
            *word = (cur / d as u128) as u64;
            rem = cur % d as u128;
        }
        rem as u64
    }

    /// Two's complement negation within the bit width
    fn negate(&mut self) {
        let mut carry = true;
        for word in self.words.iter_mut() {
            let (sum, overflow) = (!*word).overflowing_add(carry as u64);
            *word = sum;
            carry = overflow;
        }
        self.clear_unused_bits();
    }

    fn top_bit(&self) -> bool {
        let bit = self.bits - 1;
        (self.words[(bit / 64) as usize] >> (bit % 64)) & 1 == 1
    }

    /// Only the sign bit set
    fn is_min_signed(&self) -> bool {
        let mut copy = self.clone();
        let bit = self.bits - 1;
        copy.words[(bit / 64) as usize] &= !(1u64 << (bit % 64));
        self.top_bit() && copy.is_zero()
    }

    fn unused_mask(&self) -> u64 {
        match self.bits % 64 {
            0 => 0,
            used => !((1u64 << used) - 1),
        }
    }

    fn unused_bits_set(&self) -> bool {
        self.words.last().is_some_and(|&w| w & self.unused_mask() != 0)
    }

    fn clear_unused_bits(&mut self) {
        let mask = self.unused_mask();
        if let Some(last) = self.words.last_mut() {
            *last &= !mask;
        }
    }

    fn fill_unused_bits(&mut self) {
        let mask = self.unused_mask();
        if let Some(last) = self.words.last_mut() {
            *last |= mask;
        }
    }
}

/// Signed decimal, the form used in textual IR
impl fmt::Display for ApInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_radix(10, true))
    }
}
