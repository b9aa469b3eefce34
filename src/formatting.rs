use crate::data::BitString;
use crate::error::*;

use std::str::FromStr;

/// Output format for rendered signal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Bin,
    Hex,
    Dec,
}

impl FromStr for ValueFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bin" => Ok(Self::Bin),
            "hex" => Ok(Self::Hex),
            "dec" => Ok(Self::Dec),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Render a value in the requested format.
///
/// Binary passes the raw four-state string through unchanged and hex
/// resolves nibble-wise, so indeterminate bits survive both. Decimal can
/// not represent x/z at all; such values fall back to the raw binary
/// string and the returned warning says so.
pub fn format_value(value: &BitString, format: ValueFormat) -> (String, Option<String>) {
    match format {
        ValueFormat::Bin => (value.as_str().to_string(), None),
        ValueFormat::Hex => (value.to_hex(), None),
        ValueFormat::Dec => match value.to_decimal() {
            Some(dec) => (dec, None),
            None => (
                value.as_str().to_string(),
                Some(format!(
                    "value '{}' contains x/z bits, reported as binary",
                    value
                )),
            ),
        },
    }
}
