use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// A generated 64-bit identifier.
///
/// The raw value is always non-negative; the sign bit is never set by the
/// generator. Fields are only meaningful through the [`Codec`] of the layout
/// that produced the ID.
///
/// [`Codec`]: crate::Codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Id(i64);

impl Id {
    #[inline(always)]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for Id {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<Id> for i64 {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Id {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
