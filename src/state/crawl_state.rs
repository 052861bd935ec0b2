/// Crawl run state definitions
///
/// This module defines the lifecycle of a crawl run and the transitions
/// between its states.
use crate::MirrorError;
use std::fmt;

/// Represents the current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Engine constructed, loop not yet started
    Idle,

    /// Popping and processing tasks
    Running,

    /// Cancellation observed; saving the frontier before exit
    Draining,

    // ===== Terminal States =====
    /// Frontier exhausted and checkpoint cleared
    Completed,

    /// A fatal fetch, filesystem, or checkpoint error ended the run
    Failed,
}

impl CrawlState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the engine may still pop tasks
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// | From | To |
    /// |------|----|
    /// | Idle | Running, Failed |
    /// | Running | Draining, Completed, Failed |
    /// | Draining | Failed |
    ///
    /// Draining has no success successor: once the interrupt checkpoint is
    /// written the run simply ends in that state.
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Failed)
                | (Self::Running, Self::Draining)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
                | (Self::Draining, Self::Failed)
        )
    }

    /// Performs a checked transition
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlState)` - The new state
    /// * `Err(MirrorError::InvalidTransition)` - The transition is not allowed
    pub fn transition(self, next: CrawlState) -> Result<CrawlState, MirrorError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(MirrorError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible crawl states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Running,
            Self::Draining,
            Self::Completed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
