//! Monotonic counters used to tag in-flight requests.

/// A version number for a piece of session state.
///
/// Every change to the tracked state advances the generation; a result tagged
/// with an older generation is stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Generation(u64);

impl Generation {
    /// The generation a fresh piece of state starts at.
    pub const INITIAL: Self = Self(0);

    /// Move to the next generation.
    pub fn advance(&mut self) -> Self {
        self.0 = self.0.wrapping_add(1);
        *self
    }

    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
