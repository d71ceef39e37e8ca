use std::fmt;

/// Result of ticking a behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Never ticked, or interrupted by its parent.
    #[default]
    Invalid,
    Running,
    Success,
    Failure,
}

impl Status {
    /// `Success` or `Failure`.
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(self, Status::Success | Status::Failure)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Invalid => "INVALID",
            Status::Running => "RUNNING",
            Status::Success => "SUCCESS",
            Status::Failure => "FAILURE",
        };
        f.write_str(s)
    }
}
