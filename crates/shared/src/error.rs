use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected movie collection shape: {0}")]
    UnexpectedShape(&'static str),
    #[error("malformed movie record {key}: {source}")]
    MalformedRecord {
        key: String,
        source: serde_json::Error,
    },
}
