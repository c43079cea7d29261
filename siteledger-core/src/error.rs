use thiserror::Error;

/// Failures when turning raw text into one of the core value types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid project code '{0}': expected 7 digits starting with 2")]
    InvalidProjectCode(String),

    #[error("unknown project type '{0}'")]
    UnknownProjectType(String),

    #[error("unknown record kind '{0}': expected invoice or bill")]
    UnknownRecordKind(String),

    #[error("unrecognized date '{0}'")]
    InvalidDate(String),
}
