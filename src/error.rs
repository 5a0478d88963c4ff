use thiserror::Error;

/// Failures raised by a character source while the scanner refills its
/// window.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The wrapped stream failed.
    #[error("I/O failure while reading the character source: {0}")]
    Io(#[from] std::io::Error),

    /// The byte stream is not valid in the detected encoding.
    #[error("malformed {encoding} byte sequence near input offset {offset}")]
    Decode {
        encoding: &'static str,
        offset: usize,
    },
}

/// Scanner-level error with the position reached when the failure surfaced.
///
/// Malformed playlist syntax is never an error; it is encoded in the token
/// stream (see `TokenType::UnexpectedData`). The only error surfaces are the
/// character source itself and a lookahead window that can no longer grow.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("character source failed at line {line}, column {column}: {source}")]
    Source {
        line: usize,
        column: usize,
        #[source]
        source: SourceError,
    },

    /// A single token required more lookahead than the platform can address.
    #[error("lookahead window exhausted at line {line}, column {column}")]
    WindowExhausted { line: usize, column: usize },
}

impl ScanError {
    pub(crate) fn source(line: usize, column: usize, source: SourceError) -> Self {
        ScanError::Source {
            line,
            column,
            source,
        }
    }

    pub(crate) fn window_exhausted(line: usize, column: usize) -> Self {
        ScanError::WindowExhausted { line, column }
    }

    /// Line where the failure surfaced (1-based).
    pub fn line(&self) -> usize {
        match self {
            ScanError::Source { line, .. } | ScanError::WindowExhausted { line, .. } => *line,
        }
    }

    /// Column where the failure surfaced (1-based).
    pub fn column(&self) -> usize {
        match self {
            ScanError::Source { column, .. } | ScanError::WindowExhausted { column, .. } => *column,
        }
    }
}

/// Resultado estándar del scanner.
pub type ScanResult<T> = Result<T, ScanError>;
