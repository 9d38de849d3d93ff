use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

/// Every failure a command can produce. The `Display` form is what the
/// client sees after the `[ERROR] ` prefix.
#[derive(Clone, PartialEq, Debug, Error)]
pub enum DbError {
    #[error("LexicalError: {reason} at position {position}")]
    Lexical { reason: LexErrorKind, position: usize },

    #[error("GrammarError: expected {expected} at position {position}")]
    Grammar {
        expected: &'static str,
        position: usize,
    },

    #[error("DatabaseNotSelected: no database selected")]
    DatabaseNotSelected,

    #[error("DatabaseNotFound: {0}")]
    DatabaseNotFound(String),

    #[error("DatabaseAlreadyExists: {0}")]
    DatabaseAlreadyExists(String),

    #[error("TableNotFound: {0}")]
    TableNotFound(String),

    #[error("TableAlreadyExists: {0}")]
    TableAlreadyExists(String),

    #[error("AttributeNotFound: {0}")]
    AttributeNotFound(String),

    #[error("AttributeExists: {0}")]
    AttributeExists(String),

    #[error("ProtectedAttribute: {0}")]
    ProtectedAttribute(String),

    #[error("AttributeCountMismatch: expected {expected}, got {actual}")]
    AttributeCountMismatch { expected: usize, actual: usize },

    #[error("StorageIOError: {0}")]
    StorageIo(String),
}

#[derive(Clone, PartialEq, Debug, Error)]
pub enum LexErrorKind {
    #[error("unexpected '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("tab inside string")]
    TabInString,
    #[error("line break inside string")]
    LineBreakInString,
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::StorageIo(err.to_string())
    }
}

impl DbError {
    pub fn grammar(expected: &'static str, position: usize) -> Self {
        DbError::Grammar { expected, position }
    }

    pub fn lexical(reason: LexErrorKind, position: usize) -> Self {
        DbError::Lexical { reason, position }
    }
}
