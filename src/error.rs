use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChecksumError {
    #[error("File not found or not a regular file: {}", .path.display())]
    FileNotFound { path: PathBuf },
    #[error("I/O error while reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported algorithm: {name:?}")]
    UnsupportedAlgorithm { name: String },
    #[error("Chunk size must be between 1 byte and 64 MiB")]
    InvalidChunkSize,
    #[error("Checksum worker panicked")]
    WorkerPanicked,
    #[error("Report error: {message}")]
    Report { message: String },
}

impl ChecksumError {
    /// Maps an open/read failure, keeping `NotFound` distinct from other I/O errors.
    pub fn from_io(path: impl Into<PathBuf>, e: std::io::Error) -> Self {
        let path = path.into();
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            _ => Self::Io { path, source: e },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_file_not_found() {
        let e = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            ChecksumError::from_io("/nope", e),
            ChecksumError::FileNotFound { .. }
        ));
    }

    #[test]
    fn other_kinds_map_to_io() {
        let e = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ChecksumError::from_io("/secret", e);
        assert!(matches!(err, ChecksumError::Io { .. }));
        assert!(err.to_string().contains("/secret"));
    }
}
