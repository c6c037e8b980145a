use std::fmt;

/// Custom error types for telemetry extraction and track conversion
#[derive(Debug)]
pub enum TelemetryError {
    /// I/O errors
    Io(std::io::Error),
    /// UTF-8 parsing errors
    Utf8(std::str::Utf8Error),
    /// Invalid MP4 container structure
    InvalidContainer(String),
    /// Invalid GPMF stream data
    InvalidStream(String),
    /// End of data reached unexpectedly
    UnexpectedEof,
    /// The telemetry track yielded zero GPS samples
    NoTelemetry,
    /// Video metadata probe failure
    Probe(String),
    /// Creation time missing or not valid ISO-8601
    CreationTime(String),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Io(err) => write!(f, "I/O error: {}", err),
            TelemetryError::Utf8(err) => write!(f, "UTF-8 error: {}", err),
            TelemetryError::InvalidContainer(msg) => write!(f, "Invalid container: {}", msg),
            TelemetryError::InvalidStream(msg) => write!(f, "Invalid GPMF stream: {}", msg),
            TelemetryError::UnexpectedEof => write!(f, "Unexpected end of data"),
            TelemetryError::NoTelemetry => write!(f, "No GPS data found in telemetry track"),
            TelemetryError::Probe(msg) => write!(f, "Metadata probe failed: {}", msg),
            TelemetryError::CreationTime(msg) => write!(f, "Invalid creation time: {}", msg),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Io(err) => Some(err),
            TelemetryError::Utf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::Io(err)
    }
}

impl From<std::str::Utf8Error> for TelemetryError {
    fn from(err: std::str::Utf8Error) -> Self {
        TelemetryError::Utf8(err)
    }
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
