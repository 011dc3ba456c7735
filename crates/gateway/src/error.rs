use crate::target::Target;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("rpc against {target} failed: {source}")]
    Rpc {
        target: Target,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid dtid: {0}")]
    InvalidDtid(String),
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    pub fn rpc(target: Target, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Rpc {
            target,
            source: Box::new(source),
        }
    }
}

impl From<fanout::Elapsed> for Error {
    fn from(_: fanout::Elapsed) -> Self {
        Error::DeadlineExceeded
    }
}
