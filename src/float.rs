use crate::error::*;

use std::str::FromStr;

/// Bit layout of the supported IEEE 754 encodings. `Bfloat16` shares the
/// float32 exponent width; its pattern is the high half of a float32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatFormat {
    Float32,
    Float16,
    Bfloat16,
}

impl FloatFormat {
    pub fn total_bits(self) -> u32 {
        match self {
            Self::Float32 => 32,
            Self::Float16 | Self::Bfloat16 => 16,
        }
    }

    pub fn hex_digits(self) -> usize {
        self.total_bits() as usize / 4
    }

    fn exponent_bits(self) -> u32 {
        match self {
            Self::Float32 | Self::Bfloat16 => 8,
            Self::Float16 => 5,
        }
    }

    fn mantissa_bits(self) -> u32 {
        match self {
            Self::Float32 => 23,
            Self::Float16 => 10,
            Self::Bfloat16 => 7,
        }
    }

    fn bias(self) -> i64 {
        (1 << (self.exponent_bits() - 1)) - 1
    }
}

impl FromStr for FloatFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "float32" => Ok(Self::Float32),
            "float16" => Ok(Self::Float16),
            "bfloat16" => Ok(Self::Bfloat16),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Decode a bit pattern of the format's exact width into a number.
pub fn bits_to_float(bits: u64, format: FloatFormat) -> f64 {
    let mb = format.mantissa_bits();
    let eb = format.exponent_bits();
    let bias = format.bias() as i32;

    let sign = if (bits >> (eb + mb)) & 1 == 1 { -1.0 } else { 1.0 };
    let exponent = ((bits >> mb) & ((1 << eb) - 1)) as i32;
    let mantissa = bits & ((1 << mb) - 1);
    let max_exponent = (1 << eb) - 1;

    if exponent == max_exponent {
        if mantissa == 0 {
            sign * f64::INFINITY
        } else {
            f64::NAN
        }
    } else if exponent == 0 {
        // signed zero or subnormal: mantissa / 2^mb * 2^(1 - bias)
        sign * mantissa as f64 * 2f64.powi(1 - bias - mb as i32)
    } else {
        let significand = 1.0 + mantissa as f64 / (1u64 << mb) as f64;
        sign * significand * 2f64.powi(exponent - bias)
    }
}

/// Encode a number into the format's bit pattern.
///
/// Overflow saturates to signed infinity, underflow rounds to signed
/// zero, NaN maps to a quiet NaN with the sign preserved and the payload
/// dropped. Precision loss rounds to nearest, ties to even.
pub fn float_to_bits(value: f64, format: FloatFormat) -> u64 {
    let mb = format.mantissa_bits();
    let eb = format.exponent_bits();
    let bias = format.bias();

    let sign_bit = if value.is_sign_negative() {
        1u64 << (eb + mb)
    } else {
        0
    };
    let exp_mask = ((1u64 << eb) - 1) << mb;

    if value.is_nan() {
        return sign_bit | exp_mask | (1u64 << (mb - 1));
    }
    if value.is_infinite() {
        return sign_bit | exp_mask;
    }
    if value == 0.0 {
        return sign_bit;
    }

    let bits64 = value.abs().to_bits();
    let exp64 = ((bits64 >> 52) & 0x7ff) as i64;
    let man64 = bits64 & ((1u64 << 52) - 1);

    // f64 subnormals sit far below the smallest subnormal of every
    // narrower format
    if exp64 == 0 {
        return sign_bit;
    }

    let target_exp = exp64 - 1023 + bias;
    let max_exp = (1i64 << eb) - 1;

    if target_exp >= max_exp {
        return sign_bit | exp_mask;
    }

    if target_exp <= 0 {
        // subnormal in the target: shift the full significand, implicit
        // one included; a round-up into exponent 1 is the smallest normal
        let shift = (52 - mb as i64) + 1 - target_exp;
        if shift >= 64 {
            return sign_bit;
        }
        let full = (1u64 << 52) | man64;
        return sign_bit | round_shift_even(full, shift as u32);
    }

    // mantissa rounding may carry into the exponent; carrying out of the
    // largest normal exponent lands exactly on the infinity pattern
    let rounded = round_shift_even(man64, 52 - mb);
    sign_bit | (((target_exp as u64) << mb) + rounded)
}

fn round_shift_even(v: u64, shift: u32) -> u64 {
    if shift == 0 {
        return v;
    }
    if shift > 63 {
        return 0;
    }

    let q = v >> shift;
    let rem = v & ((1u64 << shift) - 1);
    let half = 1u64 << (shift - 1);

    if rem > half || (rem == half && q & 1 == 1) {
        q + 1
    } else {
        q
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    match s.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&s[prefix.len()..]),
        _ => None,
    }
}

/// Parse a hex literal into a bit pattern of the format's width. Shorter
/// inputs are left-padded with zeros to the exact nibble count; longer
/// inputs are rejected.
pub fn parse_hex_bits(hex: &str, format: FloatFormat) -> Result<u64> {
    let trimmed = hex.trim();
    let digits = strip_prefix_ci(trimmed, "0x").unwrap_or(trimmed);

    let bad = || Error::InvalidLiteral {
        value: hex.trim().to_string(),
        expected: format!("up to {} hex digits", format.hex_digits()),
    };

    if digits.is_empty() || digits.len() > format.hex_digits() {
        return Err(bad());
    }

    u64::from_str_radix(digits, 16).map_err(|_| bad())
}

/// Parse a binary literal into a bit pattern. The bit count must match
/// the format exactly; nothing is truncated or padded.
pub fn parse_bin_bits(bin: &str, format: FloatFormat) -> Result<u64> {
    let trimmed = bin.trim();
    let digits = strip_prefix_ci(trimmed, "0b")
        .or_else(|| strip_prefix_ci(trimmed, "b"))
        .unwrap_or(trimmed);

    let bad = || Error::InvalidLiteral {
        value: bin.trim().to_string(),
        expected: format!("exactly {} binary digits", format.total_bits()),
    };

    if digits.len() != format.total_bits() as usize {
        return Err(bad());
    }

    u64::from_str_radix(digits, 2).map_err(|_| bad())
}

pub fn hex_to_float(hex: &str, format: FloatFormat) -> Result<f64> {
    Ok(bits_to_float(parse_hex_bits(hex, format)?, format))
}

pub fn bin_to_float(bin: &str, format: FloatFormat) -> Result<f64> {
    Ok(bits_to_float(parse_bin_bits(bin, format)?, format))
}

pub fn float_to_hex(value: f64, format: FloatFormat) -> String {
    format!(
        "{:0width$X}",
        float_to_bits(value, format),
        width = format.hex_digits()
    )
}

pub fn float_to_bin(value: f64, format: FloatFormat) -> String {
    format!(
        "{:0width$b}",
        float_to_bits(value, format),
        width = format.total_bits() as usize
    )
}


#[cfg(test)]
mod test {
    use super::*;
    use super::FloatFormat::*;

    #[test]
    fn test_decode_float32_basics() {
        assert_eq!(1.0, hex_to_float("3F800000", Float32).unwrap());
        assert_eq!(-2.0, hex_to_float("C0000000", Float32).unwrap());
        assert_eq!(0.0, hex_to_float("00000000", Float32).unwrap());
        assert!(hex_to_float("80000000", Float32)
            .unwrap()
            .is_sign_negative());
        assert_eq!(
            std::f32::consts::PI as f64,
            hex_to_float("40490FDB", Float32).unwrap()
        );
    }

    #[test]
    fn test_decode_special_values() {
        assert_eq!(f64::INFINITY, hex_to_float("7F800000", Float32).unwrap());
        assert_eq!(f64::NEG_INFINITY, hex_to_float("FF800000", Float32).unwrap());
        assert!(hex_to_float("FFC00000", Float32).unwrap().is_nan());
        assert!(hex_to_float("7F800001", Float32).unwrap().is_nan());

        assert_eq!(f64::INFINITY, hex_to_float("7C00", Float16).unwrap());
        assert!(hex_to_float("7E00", Float16).unwrap().is_nan());
        assert_eq!(f64::INFINITY, hex_to_float("7F80", Bfloat16).unwrap());
    }

    #[test]
    fn test_decode_subnormals() {
        // smallest float32 subnormal: 2^-149
        assert_eq!(2f64.powi(-149), hex_to_float("00000001", Float32).unwrap());
        // smallest float16 subnormal: 2^-24
        assert_eq!(2f64.powi(-24), hex_to_float("0001", Float16).unwrap());
        // largest float16 subnormal
        assert_eq!(
            1023.0 * 2f64.powi(-24),
            hex_to_float("03FF", Float16).unwrap()
        );
    }

    #[test]
    fn test_decode_float16_and_bfloat16() {
        assert_eq!(3.140625, hex_to_float("4248", Float16).unwrap());
        assert_eq!(65504.0, hex_to_float("7BFF", Float16).unwrap());
        assert_eq!(3.140625, hex_to_float("4049", Bfloat16).unwrap());
        assert_eq!(1.0, hex_to_float("3F80", Bfloat16).unwrap());
    }

    #[test]
    fn test_encode_basics() {
        assert_eq!("3F800000", float_to_hex(1.0, Float32));
        assert_eq!("C0000000", float_to_hex(-2.0, Float32));
        assert_eq!("00000000", float_to_hex(0.0, Float32));
        assert_eq!("80000000", float_to_hex(-0.0, Float32));
        assert_eq!("4248", float_to_hex(3.140625, Float16));
        assert_eq!("3F80", float_to_hex(1.0, Bfloat16));
    }

    #[test]
    fn test_encode_special_values() {
        assert_eq!("7F800000", float_to_hex(f64::INFINITY, Float32));
        assert_eq!("FF800000", float_to_hex(f64::NEG_INFINITY, Float32));
        assert_eq!("7FC00000", float_to_hex(f64::NAN, Float32));
        assert_eq!("7E00", float_to_hex(f64::NAN, Float16));
        assert_eq!("7FC0", float_to_hex(f64::NAN, Bfloat16));
    }

    #[test]
    fn test_encode_overflow_saturates() {
        assert_eq!("7C00", float_to_hex(1.0e6, Float16));
        assert_eq!("FC00", float_to_hex(-1.0e6, Float16));
        assert_eq!("7F800000", float_to_hex(1.0e39, Float32));
        // 65520 is the first value rounding up past the largest normal
        assert_eq!("7C00", float_to_hex(65520.0, Float16));
        assert_eq!("7BFF", float_to_hex(65504.0, Float16));
    }

    #[test]
    fn test_encode_underflow_to_signed_zero() {
        assert_eq!("0000", float_to_hex(1.0e-12, Float16));
        assert_eq!("8000", float_to_hex(-1.0e-12, Float16));
        // exactly half the smallest subnormal ties to even zero
        assert_eq!("0000", float_to_hex(2f64.powi(-25), Float16));
        // anything above half rounds up to the smallest subnormal
        assert_eq!("0001", float_to_hex(1.5 * 2f64.powi(-25), Float16));
    }

    #[test]
    fn test_encode_rounds_ties_to_even() {
        // 1 + 2^-11 sits exactly between two float16 mantissas
        assert_eq!("3C00", float_to_hex(1.0 + 2f64.powi(-11), Float16));
        // 1 + 3*2^-11 ties upward to the even mantissa 2
        assert_eq!("3C02", float_to_hex(1.0 + 3.0 * 2f64.powi(-11), Float16));
        // bfloat16 rounds, unlike a plain truncation of float32 bits
        assert_eq!("4049", float_to_hex(3.14, Bfloat16));
    }

    #[test]
    fn test_roundtrip_representable_values() {
        let cases: &[(f64, FloatFormat)] = &[
            (0.0, Float32),
            (-0.0, Float32),
            (1.0, Float32),
            (-1.5, Float32),
            (std::f32::consts::PI as f64, Float32),
            (2f64.powi(-149), Float32),
            (3.4028234663852886e38, Float32),
            (1.0, Float16),
            (3.140625, Float16),
            (65504.0, Float16),
            (2f64.powi(-24), Float16),
            (-2f64.powi(-24), Float16),
            (1.0, Bfloat16),
            (3.140625, Bfloat16),
            (2f64.powi(-133), Bfloat16),
        ];

        for &(x, fmt) in cases {
            let back = bits_to_float(float_to_bits(x, fmt), fmt);
            assert_eq!(x, back, "round-trip of {} in {:?}", x, fmt);
            assert_eq!(x.is_sign_negative(), back.is_sign_negative());
        }
    }

    #[test]
    fn test_hex_input_forms() {
        assert_eq!(1.0, hex_to_float("0x3F800000", Float32).unwrap());
        assert_eq!(1.0, hex_to_float("  3f800000  ", Float32).unwrap());
        // short inputs are left-padded
        assert_eq!(
            2f64.powi(-149),
            hex_to_float("1", Float32).unwrap()
        );
        assert!(hex_to_float("13F800000", Float32).is_err());
        assert!(hex_to_float("zz800000", Float32).is_err());
        assert!(hex_to_float("", Float32).is_err());
    }

    #[test]
    fn test_bin_input_forms() {
        assert_eq!(
            1.0,
            bin_to_float("00111111100000000000000000000000", Float32).unwrap()
        );
        assert_eq!(
            1.0,
            bin_to_float("0b00111111100000000000000000000000", Float32).unwrap()
        );
        assert_eq!(3.140625, bin_to_float("b0100001001001000", Float16).unwrap());
        // exact bit count required
        assert!(bin_to_float("0111111110000000", Float32).is_err());
        assert!(bin_to_float("2111111110000000", Float16).is_err());
    }

    #[test]
    fn test_bin_output() {
        assert_eq!(
            "00111111100000000000000000000000",
            float_to_bin(1.0, Float32)
        );
        assert_eq!("0100001001001000", float_to_bin(3.140625, Float16));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(Float32, "float32".parse().unwrap());
        assert_eq!(Float16, "Float16".parse().unwrap());
        assert_eq!(Bfloat16, "bfloat16".parse().unwrap());
        assert!("float64".parse::<FloatFormat>().is_err());
    }
}
