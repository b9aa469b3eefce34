use crate::error::*;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Fs, Ps, Ns, Us, Ms, S,
}

impl TimeUnit {
    pub fn from_string(s: impl AsRef<str>) -> Result<Self> {
        let s = s.as_ref();

        match s {
            "s"  => Ok(Self::S ),
            "ms" => Ok(Self::Ms),
            "us" => Ok(Self::Us),
            "ns" => Ok(Self::Ns),
            "ps" => Ok(Self::Ps),
            "fs" => Ok(Self::Fs),
            _    => Err(Error::InvalidTime(s.to_string()))
        }
    }

    /// Femtoseconds per tick of this unit.
    pub fn to_multiplier(&self) -> u64 {
        use TimeUnit::*;
        match self {
            S  => 1_000_000_000_000_000,
            Ms =>     1_000_000_000_000,
            Us =>         1_000_000_000,
            Ns =>             1_000_000,
            Ps =>                 1_000,
            Fs =>                     1
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TimeUnit::*;
        let s = match self {
            S  => "s",
            Ms => "ms",
            Us => "us",
            Ns => "ns",
            Ps => "ps",
            Fs => "fs",
        };
        write!(f, "{}", s)
    }
}

/// Duration of one tick of document time, from the `$timescale` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timescale {
    magnitude: u32,
    unit: TimeUnit,
}

impl Timescale {
    pub const fn new(magnitude: u32, unit: TimeUnit) -> Self {
        Self { magnitude, unit }
    }

    pub fn get_magnitude(&self) -> u32 {
        self.magnitude
    }

    pub fn get_unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn to_femtos(&self) -> u64 {
        self.magnitude as u64 * self.unit.to_multiplier()
    }
}

impl fmt::Display for Timescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}
