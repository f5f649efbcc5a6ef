use std::sync::{Arc, OnceLock};

/// How a fade ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FadeOutcome {
    /// The fade reached its target value.
    Completed,
    /// The fade was removed before reaching its target. Not an error.
    Cancelled,
}

/// Completion signal returned by [`FadeEngine::start`](super::FadeEngine::start).
///
/// Resolves exactly once. Clones observe the same outcome.
#[derive(Debug, Clone, Default)]
pub struct FadeSignal {
    outcome: Arc<OnceLock<FadeOutcome>>,
}

impl FadeSignal {
    pub(super) fn pending() -> Self {
        Self::default()
    }

    pub(super) fn resolve(&self, outcome: FadeOutcome) {
        // First resolution wins.
        let _ = self.outcome.set(outcome);
    }

    pub fn outcome(&self) -> Option<FadeOutcome> {
        self.outcome.get().copied()
    }
}
