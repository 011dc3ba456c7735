/// The task runner's own aggregate error, mirroring `coordinator::Error`'s
/// single-variant wrap of a [`fanout::Error`]. The invalid-concurrency-level
/// condition is deliberately not a variant here: it is a programmer error
/// surfaced by [`crate::ConcurrencyLevel::from_raw`] panicking, not something
/// a caller recovers from via `Result`.
#[derive(Debug, thiserror::Error)]
pub enum Error<E: std::error::Error + 'static> {
    #[error(transparent)]
    Tasks(#[from] fanout::Error<E>),
}
