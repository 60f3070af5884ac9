use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimeItemError {
    FetchFailure(String),
    ReadOnly,
    PermissionDenied(String),
    ValidationFailure(String),
    MissingEntityId,
    BadConfig(String),
}

impl Error for AnimeItemError {}

impl fmt::Display for AnimeItemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FetchFailure(url) => write!(f, "could not fetch {url}"),
            Self::ReadOnly => write!(f, "the wiki is in read-only mode"),
            Self::PermissionDenied(right) => write!(f, "user lacks the '{right}' right"),
            Self::ValidationFailure(msg) => write!(f, "invalid form data: {msg}"),
            Self::MissingEntityId => write!(f, "edit API response has no entity ID"),
            Self::BadConfig(msg) => write!(f, "bad configuration: {msg}"),
        }
    }
}
