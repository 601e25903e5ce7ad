use ordered_float::NotNan;
use serde::{Serialize, Serializer};

/// A non-NaN f64 value in the range [0, 100].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Score(NotNan<f64>);

impl Score {
    pub const ZERO: Self = Self(unsafe { NotNan::new_unchecked(0.0) });
    pub const MAX: Self = Self(unsafe { NotNan::new_unchecked(100.0) });

    pub fn new(value: f64) -> Option<Self> {
        let value = NotNan::new(value).ok()?;
        if *value < 0.0 || *value > 100.0 {
            return None;
        }
        Some(Self(value))
    }

    /// Clamp `value` into [0, 100]. NaN maps to zero.
    pub fn saturating(value: f64) -> Self {
        match NotNan::new(value.clamp(0.0, 100.0)) {
            Ok(value) => Self(value),
            Err(_) => Self::ZERO,
        }
    }

    /// Round to two decimal places, half away from zero.
    pub fn rounded(&self) -> Self {
        Self::saturating((self.as_f64() * 100.0).round() / 100.0)
    }

    pub fn as_inner(&self) -> NotNan<f64> {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0.into_inner()
    }

    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }
}

impl std::cmp::PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for Score {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Debug for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// A finite, non-negative, non-NaN f64 value
#[derive(Clone, Copy, PartialEq)]
pub struct Weight(NotNan<f64>);

impl Weight {
    pub const ZERO: Self = Self(unsafe { NotNan::new_unchecked(0.0) });
    pub const ONE: Self = Self(unsafe { NotNan::new_unchecked(1.0) });

    pub fn new(value: f64) -> Option<Self> {
        let value = NotNan::new(value).ok()?;
        if value.is_sign_negative() || value.is_infinite() {
            return None;
        }
        Some(Self(value))
    }

    /// Weight for a whole percentage. Values above 100 saturate to `ONE`.
    pub fn from_percent(percent: u8) -> Self {
        NotNan::new(f64::from(percent.min(100)) / 100.0)
            .map(Self)
            .unwrap_or(Self::ZERO)
    }

    pub fn as_f64(&self) -> f64 {
        self.0.into_inner()
    }

    /// Nearest whole percentage, as shown to people.
    pub fn percent(&self) -> u32 {
        (self.as_f64() * 100.0).round() as u32
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl std::fmt::Debug for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

#[track_caller]
pub fn assert_within(value: f64, expected: f64, tolerance: f64) {
    let diff = (value - expected).abs();
    assert!(
        diff <= tolerance,
        "Expected value of {expected} +- {tolerance} but got {value} which is off by {diff}",
    );
}
