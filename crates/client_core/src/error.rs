use shared::error::DecodeError;
use thiserror::Error;

/// Failures talking to the remote movie store.
///
/// Every variant is a network-class failure from the controller's point of
/// view: a malformed body is handled the same way as a refused connection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to remote store failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote store answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("failed to decode remote store response: {0}")]
    Decode(#[from] DecodeError),
    #[error("movie id '{0}' cannot address a store record")]
    InvalidMovieId(String),
    #[error("invalid store url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("invalid movie: {0}")]
    Validation(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}
