#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed precondition: {0}")]
    FailedPrecondition(&'static str),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Gateway(#[from] gateway::Error),

    #[error(transparent)]
    Fanout(#[from] fanout::Error<gateway::Error>),
}
