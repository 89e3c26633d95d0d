//! Identifiers and the engine clock.

use std::borrow::Borrow;
use std::fmt;
use std::time::Duration;

/// Unique identifier of an enemy agent managed by the engine.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EnemyId(String);

impl EnemyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EnemyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EnemyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EnemyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a skill, shared by enemy abilities and opponent skills so
/// that an ability can name the opponent skill it counters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SkillId(String);

impl SkillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SkillId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine clock reading in milliseconds.
///
/// The clock starts at zero when the engine is built and advances by the
/// delta passed to every update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub const fn since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Whole milliseconds in a total elapsed duration.
    ///
    /// Callers accumulate the exact elapsed time and convert once, so
    /// sub-millisecond ticks still add up.
    pub fn from_elapsed(elapsed: Duration) -> Self {
        Self(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

impl std::ops::Add<u64> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_since_saturates() {
        assert_eq!(Timestamp(5_000).since(Timestamp(2_000)), 3_000);
        assert_eq!(Timestamp(1_000).since(Timestamp(2_000)), 0);
    }

    #[test]
    fn timestamp_from_elapsed_floors_to_millis() {
        let t = Timestamp::from_elapsed(Duration::from_micros(16_900));
        assert_eq!(t, Timestamp(16));
        assert_eq!(t + 4, Timestamp(20));
    }
}
