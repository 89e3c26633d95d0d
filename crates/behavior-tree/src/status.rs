//! Status returned by behavior nodes.

/// The result of evaluating a behavior node.
///
/// Every node completes within the tick it is evaluated in:
/// - Conditions report whether they hold for the current snapshot
/// - Actions report whether they did anything observable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The node holds (condition) or completed (action).
    Success,

    /// The node does not hold (condition) or had nothing to do (action).
    Failure,
}

impl Status {
    /// Returns `true` if this status is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Maps a boolean predicate result onto a status.
    #[inline]
    pub fn from_bool(holds: bool) -> Self {
        if holds {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

impl From<bool> for Status {
    fn from(holds: bool) -> Self {
        Status::from_bool(holds)
    }
}
