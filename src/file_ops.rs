use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::ChecksumError;
use crate::hashers::{self, DEFAULT_CHUNK_SIZE};
use crate::models::Algorithm;

/// Fails with `FileNotFound` unless `path` names an existing regular file.
pub fn ensure_regular_file(path: &Path) -> Result<(), ChecksumError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ChecksumError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(ChecksumError::from_io(path, e)),
    }
}

/// Compute hash of the file at path using streaming read.
/// This is synchronous; call it from a worker thread to keep the caller responsive.
pub fn compute(algorithm: Algorithm, path: &Path) -> Result<String, ChecksumError> {
    compute_with_chunk_size(algorithm, path, DEFAULT_CHUNK_SIZE)
}

pub fn compute_with_chunk_size(
    algorithm: Algorithm,
    path: &Path,
    chunk_size: usize,
) -> Result<String, ChecksumError> {
    let f = File::open(path).map_err(|e| ChecksumError::from_io(path, e))?;
    hashers::compute_hash_for_reader(f, algorithm, chunk_size)
        .map_err(|e| e.into_checksum_error(path))
}

/// Something a job can open once per stage.
pub trait ContentSource: Send {
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;

    /// Path used in error messages and reports.
    fn path(&self) -> &Path;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentSource for FileSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        let f = File::open(&self.path)?;
        // buffer sized to the hashing chunk so small chunk sizes still read in bulk
        Ok(Box::new(BufReader::with_capacity(DEFAULT_CHUNK_SIZE, f)))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
