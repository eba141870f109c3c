use crate::error::ChecksumError;
use crate::models::Algorithm;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::io::{self, Read};
use thiserror::Error;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
/// Upper bound for the read buffer, allocated once per pass.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Running digest state for one algorithm.
pub enum StreamingHasher {
    Md5(md5::Context),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
    Crc32(crc32fast::Hasher),
}

impl StreamingHasher {
    pub fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Md5 => StreamingHasher::Md5(md5::Context::new()),
            Algorithm::Sha1 => StreamingHasher::Sha1(Sha1::new()),
            Algorithm::Sha256 => StreamingHasher::Sha256(Sha256::new()),
            Algorithm::Sha512 => StreamingHasher::Sha512(Sha512::new()),
            // seeded at 0, each chunk continues the previous state
            Algorithm::Crc32 => StreamingHasher::Crc32(crc32fast::Hasher::new()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            StreamingHasher::Md5(_) => Algorithm::Md5,
            StreamingHasher::Sha1(_) => Algorithm::Sha1,
            StreamingHasher::Sha256(_) => Algorithm::Sha256,
            StreamingHasher::Sha512(_) => Algorithm::Sha512,
            StreamingHasher::Crc32(_) => Algorithm::Crc32,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            StreamingHasher::Md5(ctx) => ctx.consume(data),
            StreamingHasher::Sha1(h) => h.update(data),
            StreamingHasher::Sha256(h) => h.update(data),
            StreamingHasher::Sha512(h) => h.update(data),
            StreamingHasher::Crc32(h) => h.update(data),
        }
    }

    /// Lowercase hex for the cryptographic hashes, unpadded uppercase hex for CRC32.
    pub fn finalize(self) -> String {
        match self {
            StreamingHasher::Md5(ctx) => format!("{:x}", ctx.finalize()),
            StreamingHasher::Sha1(h) => hex::encode(h.finalize()),
            StreamingHasher::Sha256(h) => hex::encode(h.finalize()),
            StreamingHasher::Sha512(h) => hex::encode(h.finalize()),
            StreamingHasher::Crc32(h) => format!("{:X}", h.finalize()),
        }
    }
}

pub fn check_chunk_size(chunk_size: usize) -> Result<(), ChecksumError> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        return Err(ChecksumError::InvalidChunkSize);
    }
    Ok(())
}

/// Feeds `reader` to every hasher, `chunk_size` bytes at a time.
fn stream_into<R: Read>(
    mut reader: R,
    hashers: &mut [StreamingHasher],
    chunk_size: usize,
) -> io::Result<u64> {
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        for hasher in hashers.iter_mut() {
            hasher.update(&buf[..n]);
        }
        total += n as u64;
    }
    Ok(total)
}

/// Computes one digest over everything `reader` yields.
pub fn compute_hash_for_reader<R: Read>(
    reader: R,
    algorithm: Algorithm,
    chunk_size: usize,
) -> Result<String, HashError> {
    check_chunk_size(chunk_size).map_err(HashError::Config)?;
    let mut hashers = [StreamingHasher::new(algorithm)];
    stream_into(reader, &mut hashers, chunk_size).map_err(HashError::Read)?;
    let [hasher] = hashers;
    Ok(hasher.finalize())
}

/// Computes all five digests in a single read, returned in stage order.
pub fn compute_all_for_reader<R: Read>(
    reader: R,
    chunk_size: usize,
) -> Result<Vec<(Algorithm, String)>, HashError> {
    check_chunk_size(chunk_size).map_err(HashError::Config)?;
    let mut hashers: Vec<StreamingHasher> =
        Algorithm::ORDER.iter().map(|a| StreamingHasher::new(*a)).collect();
    stream_into(reader, &mut hashers, chunk_size).map_err(HashError::Read)?;
    Ok(hashers
        .into_iter()
        .map(|h| (h.algorithm(), h.finalize()))
        .collect())
}

/// Reader-level failure; callers attach the path when turning it into a `ChecksumError`.
#[derive(Error, Debug)]
pub enum HashError {
    #[error(transparent)]
    Config(ChecksumError),
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
}

impl HashError {
    pub fn into_checksum_error(self, path: impl Into<std::path::PathBuf>) -> ChecksumError {
        match self {
            HashError::Config(e) => e,
            HashError::Read(source) => ChecksumError::Io {
                path: path.into(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
    const EMPTY_SHA512: &str = "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e";

    fn hash(data: &[u8], algorithm: Algorithm) -> String {
        compute_hash_for_reader(Cursor::new(data), algorithm, DEFAULT_CHUNK_SIZE).unwrap()
    }

    #[test]
    fn empty_input_vectors() {
        assert_eq!(hash(b"", Algorithm::Md5), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(hash(b"", Algorithm::Sha1), EMPTY_SHA1);
        assert_eq!(
            hash(b"", Algorithm::Sha256),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash(b"", Algorithm::Sha512), EMPTY_SHA512);
        assert_eq!(hash(b"", Algorithm::Crc32), "0");
    }

    #[test]
    fn single_byte_vectors() {
        assert_eq!(hash(b"a", Algorithm::Md5), "0cc175b9c0f1b6a831c399e269772661");
        assert_eq!(hash(b"a", Algorithm::Crc32), "E8B7BE43");
    }

    #[test]
    fn crc32_check_value_is_uppercase() {
        assert_eq!(hash(b"123456789", Algorithm::Crc32), "CBF43926");
    }

    #[test]
    fn chunk_size_does_not_change_digest() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i * 31 % 251) as u8).collect();
        for algorithm in Algorithm::all() {
            let reference = hash(&data, algorithm);
            for chunk_size in [1, 16, 8192, 65536] {
                let got =
                    compute_hash_for_reader(Cursor::new(&data), algorithm, chunk_size).unwrap();
                assert_eq!(got, reference, "{algorithm} with chunk size {chunk_size}");
            }
        }
    }

    #[test]
    fn single_pass_matches_individual_digests() {
        let data = b"The quick brown fox jumps over the lazy dog".repeat(1000);
        let all = compute_all_for_reader(Cursor::new(&data), 4096).unwrap();
        let order: Vec<Algorithm> = all.iter().map(|(a, _)| *a).collect();
        assert_eq!(order, Algorithm::all());
        for (algorithm, hex) in all {
            assert_eq!(hex, hash(&data, algorithm));
        }
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = compute_hash_for_reader(Cursor::new(b"x"), Algorithm::Md5, 0).unwrap_err();
        assert!(matches!(
            err,
            HashError::Config(ChecksumError::InvalidChunkSize)
        ));
    }

    #[test]
    fn oversized_chunk_size_is_rejected() {
        for chunk_size in [MAX_CHUNK_SIZE + 1, usize::MAX] {
            let err = compute_all_for_reader(Cursor::new(b"x"), chunk_size).unwrap_err();
            assert!(matches!(
                err,
                HashError::Config(ChecksumError::InvalidChunkSize)
            ));
        }
        assert!(check_chunk_size(MAX_CHUNK_SIZE).is_ok());
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.served {
                self.served = true;
                buf[0] = b'x';
                return Ok(1);
            }
            Err(io::Error::new(io::ErrorKind::Other, "device error"))
        }
    }

    #[test]
    fn read_error_mid_stream_is_reported() {
        let err = compute_hash_for_reader(FailingReader { served: false }, Algorithm::Sha256, 8)
            .unwrap_err()
            .into_checksum_error("/dev/broken");
        assert!(matches!(err, ChecksumError::Io { .. }));
        assert!(err.to_string().contains("device error"));
    }

    #[test]
    fn hash_error_displays_its_cause() {
        let read = HashError::Read(io::Error::new(io::ErrorKind::Other, "disk gone"));
        assert_eq!(read.to_string(), "read failed: disk gone");
        let config = HashError::Config(ChecksumError::InvalidChunkSize);
        assert_eq!(config.to_string(), ChecksumError::InvalidChunkSize.to_string());
    }
}
