/// Reduces a set of per-participant errors to one.
///
/// Zero errors is success. Exactly one error is returned bare, with no
/// aggregation wrapper, so a single-participant failure looks identical to a
/// plain propagated error at every call site. Two or more are kept as
/// separate children so the caller can see what happened to each participant.
#[derive(Debug, thiserror::Error)]
pub enum Error<E: std::error::Error + 'static> {
    #[error(transparent)]
    Single(E),
    #[error("{} of {} participants failed: {}", .0.len(), .0.len(), join(.0))]
    Aggregate(Vec<E>),
}

fn join<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl<E: std::error::Error + 'static> Error<E> {
    /// Folds a batch of collected errors down to `Ok(())`, a bare `Single`,
    /// or an `Aggregate`, mirroring the error-aggregator's reduction rule.
    pub fn reduce(mut errors: Vec<E>) -> Result<(), Self> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(Error::Single(errors.pop().expect("len checked above"))),
            _ => Err(Error::Aggregate(errors)),
        }
    }

    /// All child errors, in the order they were recorded.
    pub fn children(&self) -> &[E] {
        match self {
            Error::Single(e) => std::slice::from_ref(e),
            Error::Aggregate(errors) => errors,
        }
    }
}
