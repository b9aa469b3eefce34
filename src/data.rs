mod bits;
mod timescale;

pub use bits::*;
pub use timescale::*;

use std::fmt;

/// Declared variable type of a signal. Informational only; it never
/// changes how value changes are parsed or stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKind {
    Wire,
    Reg,
    Integer,
    Real,
    Parameter,
    Supply0,
    Supply1,
    Tri,
    Event,
    Time,
    Other(String),
}

impl SignalKind {
    pub fn from_token(s: impl AsRef<str>) -> Self {
        match s.as_ref() {
            "wire"      => Self::Wire,
            "reg"       => Self::Reg,
            "integer"   => Self::Integer,
            "real"      => Self::Real,
            "parameter" => Self::Parameter,
            "supply0"   => Self::Supply0,
            "supply1"   => Self::Supply1,
            "tri"       => Self::Tri,
            "event"     => Self::Event,
            "time"      => Self::Time,
            other       => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Wire      => "wire",
            Self::Reg       => "reg",
            Self::Integer   => "integer",
            Self::Real      => "real",
            Self::Parameter => "parameter",
            Self::Supply0   => "supply0",
            Self::Supply1   => "supply1",
            Self::Tri       => "tri",
            Self::Event     => "event",
            Self::Time      => "time",
            Self::Other(o)  => o,
        };
        write!(f, "{}", s)
    }
}

/// An entry of the signal table. The hierarchical path is a snapshot of
/// the scope stack at declaration time plus the leaf name; `path` is the
/// dot-joined form the query layer matches against. Identity within a
/// document is the declaration index.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub scopes: Vec<String>,
    pub name: String,
    pub path: String,
    pub width: u32,
    pub kind: SignalKind,
}

impl Signal {
    pub fn new(scopes: &[String], name: impl Into<String>, width: u32, kind: SignalKind) -> Self {
        let name = name.into();
        let path = scopes
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name.as_str()))
            .collect::<Vec<_>>()
            .join(".");

        Self {
            scopes: scopes.to_vec(),
            name,
            path,
            width,
            kind,
        }
    }
}

/// One recorded change of a signal, in document time units.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    pub time: u64,
    pub value: BitString,
}
