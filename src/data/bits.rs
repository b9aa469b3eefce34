use crate::error::*;

use std::fmt;

/// A recorded signal value: one character per bit, MSB first, over the
/// four-state alphabet `0`, `1`, `x` (unknown) and `z` (high impedance).
///
/// Upper case `X`/`Z` from the input are normalized to lower case so that
/// values compare equal regardless of how the dumper spelled them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString(String);

impl BitString {
    pub fn new(s: impl AsRef<str>) -> Result<Self> {
        let s = s.as_ref();

        if s.is_empty() || !s.bytes().all(|b| matches!(b, b'0' | b'1' | b'x' | b'X' | b'z' | b'Z')) {
            return Err(Error::InvalidLiteral {
                value: s.to_string(),
                expected: "a non-empty string over 0/1/x/z".to_string(),
            });
        }

        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn width(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_determinate(&self) -> bool {
        !self.0.bytes().any(|b| b == b'x' || b == b'z')
    }

    /// Hexadecimal rendering, MSB-first in groups of four bits. A nibble
    /// containing `x` renders as `x`, otherwise one containing `z` renders
    /// as `z`; an indeterminate nibble can not be resolved partially.
    pub fn to_hex(&self) -> String {
        let bits = self.0.as_bytes();
        let pad = (4 - bits.len() % 4) % 4;
        let padded: Vec<u8> = std::iter::repeat(b'0')
            .take(pad)
            .chain(bits.iter().copied())
            .collect();

        let mut rv = String::with_capacity(padded.len() / 4);
        for nibble in padded.chunks(4) {
            if nibble.contains(&b'x') {
                rv.push('x');
            } else if nibble.contains(&b'z') {
                rv.push('z');
            } else {
                let v = nibble.iter().fold(0u32, |acc, b| (acc << 1) | (b - b'0') as u32);
                rv.push(char::from_digit(v, 16).unwrap().to_ascii_uppercase());
            }
        }

        rv
    }

    /// Decimal rendering. `None` if any bit is indeterminate. Computed over
    /// the digit string directly, so values wider than 64 bit work too.
    pub fn to_decimal(&self) -> Option<String> {
        if !self.is_determinate() {
            return None;
        }

        // little-endian decimal digits, doubled once per bit
        let mut digits: Vec<u8> = vec![0];
        for bit in self.0.bytes() {
            let mut carry = (bit == b'1') as u8;
            for d in digits.iter_mut() {
                let v = *d * 2 + carry;
                *d = v % 10;
                carry = v / 10;
            }
            if carry > 0 {
                digits.push(carry);
            }
        }

        Some(digits.iter().rev().map(|d| (d + b'0') as char).collect())
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
