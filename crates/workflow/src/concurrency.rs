/// How many tasks the runner may have in flight at once.
///
/// Deliberately just the two levels the reference runner supports; there is
/// no `Other(u32)` escape hatch. [`ConcurrencyLevel::from_raw`] exists for
/// callers that still carry an integer level in from storage or an older
/// wire format and must reject anything else loudly rather than silently
/// clamp it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyLevel {
    Sequential,
    Parallel,
}

/// Raw level values, matching the reference workflow runner's own constants.
pub const SEQUENTIAL: i32 = 1;
pub const PARALLEL: i32 = 2;

impl ConcurrencyLevel {
    /// Converts a raw integer level, panicking on anything unrecognised.
    /// An unknown level is a programmer error, not a runtime condition a
    /// caller can meaningfully recover from, so this aborts loudly rather
    /// than returning a `Result`.
    pub fn from_raw(level: i32) -> Self {
        match level {
            SEQUENTIAL => ConcurrencyLevel::Sequential,
            PARALLEL => ConcurrencyLevel::Parallel,
            other => panic!("unknown concurrency level: {other}"),
        }
    }

    pub(crate) fn permits(self, task_count: usize) -> u32 {
        match self {
            ConcurrencyLevel::Sequential => 1,
            ConcurrencyLevel::Parallel => task_count.max(1) as u32,
        }
    }
}
