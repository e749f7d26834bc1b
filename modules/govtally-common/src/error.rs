use thiserror::Error;

#[derive(Error, Debug)]
pub enum GovTallyError {
    #[error("Store error: {0}")]
    Store(String),

    /// A tally accumulator would wrap. Silent wraparound would corrupt all
    /// downstream quorum math, so ingestion halts here.
    #[error("Tally overflow: {0}")]
    TallyOverflow(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
