use thiserror::Error;

/// Why a font descriptor was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontParseError {
    /// Neither a family nor any attribute was given.
    #[error("font descriptor is empty")]
    Empty,

    /// The family name contains the attribute separator.
    #[error("font family '{0}' must not contain ':'")]
    FamilyContainsColon(String),

    /// Two separators with nothing between them, or a trailing separator.
    #[error("font descriptor '{0}' contains an empty attribute")]
    EmptyAttribute(String),

    /// An attribute other than `h<number>`, `b`, `l` or `i`.
    #[error("unknown font attribute '{0}'")]
    UnknownAttribute(String),

    /// The `h` attribute is not a positive integer or decimal.
    #[error("invalid font height '{0}': expected a positive number of points")]
    InvalidHeight(String),
}
