//! Errors raised by the channel itself (as opposed to its slots).

/// Signal dispatch errors
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("{channel} exceeded the maximum dispatch depth of {limit}")]
    DepthExceeded { channel: String, limit: usize },
}
