#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("unknown congestion control algorithm: {0:?}")]
    UnknownAlgorithm(String),

    #[error("SYN interval must be non-zero")]
    ZeroSynInterval,
}

pub type Result<T> = std::result::Result<T, Error>;
