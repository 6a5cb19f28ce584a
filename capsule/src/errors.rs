/// Errors produced by the private set operation protocols.
#[derive(Debug)]
pub enum Error {
    /// The underlying oblivious transfer failed.
    OtError(otter::Error),
    /// An input/output error occurred.
    IoError(std::io::Error),
    /// The peer closed the connection mid-session.
    ProtocolAborted,
    /// An input set size does not match the public parameters.
    InvalidInputLength,
    /// A malformed encoding was encountered.
    SerializationError(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OtError(e) => Some(e),
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<otter::Error> for Error {
    #[inline]
    fn from(e: otter::Error) -> Error {
        Error::OtError(e)
    }
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(e: std::io::Error) -> Error {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::ProtocolAborted
        } else {
            Error::IoError(e)
        }
    }
}

impl From<barnacle::bloomfilter::Error> for Error {
    #[inline]
    fn from(e: barnacle::bloomfilter::Error) -> Error {
        Error::SerializationError(e.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::OtError(e) => write!(f, "oblivious transfer error: {}", e),
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ProtocolAborted => "peer aborted the session".fmt(f),
            Error::InvalidInputLength => {
                "input set size does not match public parameters".fmt(f)
            }
            Error::SerializationError(s) => write!(f, "serialization error: {}", s),
        }
    }
}
