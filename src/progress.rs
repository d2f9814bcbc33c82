//! Progress reporting callbacks.
//!
//! The pipeline reports through a [`Reporter`] passed in by the caller, so
//! the CLI can drive a progress bar while tests stay silent.

/// A progress update.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Percentage complete, 0 to 100.
    pub value: u8,
    pub status: String,
}

impl Progress {
    /// Progress for `done` of `total` steps.
    pub fn of(done: usize, total: usize, status: impl Into<String>) -> Self {
        let value = if total == 0 {
            100
        } else {
            ((done.min(total) * 100) / total) as u8
        };
        Self {
            value,
            status: status.into(),
        }
    }
}

type MessageFn = Box<dyn Fn(&str) + Send + Sync>;
type ProgressFn = Box<dyn Fn(Progress) + Send + Sync>;

/// Pair of callbacks for status messages and progress updates.
pub struct Reporter {
    message: MessageFn,
    progress: ProgressFn,
}

impl Reporter {
    pub fn new<M, P>(message: M, progress: P) -> Self
    where
        M: Fn(&str) + Send + Sync + 'static,
        P: Fn(Progress) + Send + Sync + 'static,
    {
        Self {
            message: Box::new(message),
            progress: Box::new(progress),
        }
    }

    /// Reporter that discards everything.
    pub fn silent() -> Self {
        Self::new(|_| {}, |_| {})
    }

    pub fn message(&self, text: &str) {
        (self.message)(text);
    }

    pub fn progress(&self, update: Progress) {
        (self.progress)(update);
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::silent()
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}
