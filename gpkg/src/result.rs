use std::io;

/// The result returned by many methods within the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The blob is truncated or carries a value the format reserves
    #[error("Malformed geometry blob: {0}")]
    FormatError(String),
    /// No factory is registered for the decoded type code
    #[error("Unsupported WKB geometry type {0}")]
    UnsupportedGeometryType(u32),
    /// A geometry was built from values it cannot hold
    #[error("Invalid geometry: {0}")]
    ValidationError(String),
    #[error("Could not register geometry factory: {0}")]
    RegistrationError(String),
    #[error("Error writing geometry bytes")]
    IoError(#[source] io::Error),
    #[error("Error when accessing the SQLite database")]
    SQLiteError(#[from] rusqlite::Error),
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        match value.kind() {
            io::ErrorKind::UnexpectedEof => {
                Error::FormatError("unexpected end of buffer".to_string())
            }
            _ => Error::IoError(value),
        }
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(_: std::num::TryFromIntError) -> Self {
        Error::ValidationError("element count does not fit in a u32".to_string())
    }
}
