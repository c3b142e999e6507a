use thiserror::Error;

/// Distance-bound violations raised by the three-phase homing sequence.
///
/// Each variant names the phase that exhausted its step budget. All three are
/// non-fatal: the controller's position tracking is left untouched so callers
/// can surface a diagnostic and retry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HomingError {
    #[error("homing phase 1: home sensor not detected within {max_steps} forward steps")]
    Seek { max_steps: u32 },
    #[error("homing phase 2: home sensor still active after {max_steps} reverse steps")]
    Backoff { max_steps: u32 },
    #[error("homing phase 3: home sensor not re-detected within {max_steps} slow steps")]
    Approach { max_steps: u32 },
}

/// Closed outcome of a homing attempt: success or one of three phase errors.
pub type HomingOutcome = std::result::Result<(), HomingError>;

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
