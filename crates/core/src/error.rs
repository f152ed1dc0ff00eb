use buslive_transit::identifiers::LineIdentifier;
use buslive_transit::models::TransitError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transit api request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed api payload: {0}")]
    Payload(String),

    #[error(transparent)]
    Transit(#[from] TransitError),

    #[error("unknown line: {0}")]
    UnknownLine(LineIdentifier),

    #[error("line is not selected: {0}")]
    NotSelected(LineIdentifier),

    #[error("cannot watch more than {0} lines at once")]
    SelectionFull(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
