use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failure of a single upstream analytics request.
///
/// Never escalated past the aggregate: the fan-out turns it into a `null`
/// field after logging it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{endpoint} responded with status {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("{endpoint} request failed: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },

    #[error("{endpoint} response could not be decoded: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}
