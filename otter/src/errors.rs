/// Errors produced by the oblivious transfer protocols.
#[derive(Debug)]
pub enum Error {
    /// A matrix or vector size contract was violated.
    InvalidDimensions {
        /// Number of rows requested.
        rows: usize,
        /// Number of columns requested.
        cols: usize,
    },
    /// The input length is invalid.
    InvalidInputLength,
    /// The peer closed the connection mid-session.
    ProtocolAborted,
    /// An I/O error has occurred.
    IoError(std::io::Error),
    /// A malformed encoding was encountered.
    SerializationError(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        // A clean EOF in the middle of a protocol message means the peer
        // went away; there is no recovery path mid-transcript.
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::ProtocolAborted
        } else {
            Error::IoError(e)
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidDimensions { rows, cols } => {
                write!(f, "invalid matrix dimensions: {} x {}", rows, cols)
            }
            Error::InvalidInputLength => "invalid input length".fmt(f),
            Error::ProtocolAborted => "peer aborted the session".fmt(f),
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::SerializationError(s) => write!(f, "serialization error: {}", s),
        }
    }
}
