use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChecksumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    Crc32,
}

impl Algorithm {
    /// Stage order of a checksum job. Never reordered.
    pub const ORDER: [Algorithm; 5] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha256,
        Algorithm::Sha512,
        Algorithm::Crc32,
    ];

    pub fn all() -> Vec<Algorithm> {
        Self::ORDER.to_vec()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha512 => "SHA512",
            Algorithm::Crc32 => "CRC32",
        }
    }

    /// Lowercase stage name, e.g. `sha256`.
    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha512 => "sha512",
            Algorithm::Crc32 => "crc32",
        }
    }

    fn slot(&self) -> usize {
        match self {
            Algorithm::Md5 => 0,
            Algorithm::Sha1 => 1,
            Algorithm::Sha256 => 2,
            Algorithm::Sha512 => 3,
            Algorithm::Crc32 => 4,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Algorithm::Md5),
            "sha1" | "sha-1" => Ok(Algorithm::Sha1),
            "sha256" | "sha-256" => Ok(Algorithm::Sha256),
            "sha512" | "sha-512" => Ok(Algorithm::Sha512),
            "crc32" | "crc" => Ok(Algorithm::Crc32),
            _ => Err(ChecksumError::UnsupportedAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// Digests of one job, one write-once slot per algorithm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumResult {
    slots: [Option<String>; 5],
}

impl ChecksumResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a digest. Returns `false` and leaves the slot untouched if it was already populated.
    pub fn insert(&mut self, algorithm: Algorithm, hex: String) -> bool {
        let slot = &mut self.slots[algorithm.slot()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(hex);
        true
    }

    pub fn get(&self, algorithm: Algorithm) -> Option<&str> {
        self.slots[algorithm.slot()].as_deref()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.len() == Algorithm::ORDER.len()
    }

    /// Populated entries in stage order.
    pub fn iter(&self) -> impl Iterator<Item = (Algorithm, &str)> + '_ {
        Algorithm::ORDER
            .iter()
            .filter_map(move |a| self.get(*a).map(|hex| (*a, hex)))
    }
}

impl Serialize for ChecksumResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (algorithm, hex) in self.iter() {
            map.serialize_entry(algorithm.id(), hex)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JobState {
    Idle,
    Running(Algorithm),
    Cancelled,
    Completed,
    Failed(String),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Cancelled | JobState::Completed | JobState::Failed(_)
        )
    }
}

/// Terminal outcome of a job. Partial digests survive cancellation and failure.
#[derive(Debug)]
pub enum JobOutcome {
    Completed(ChecksumResult),
    Cancelled(ChecksumResult),
    Failed {
        stage: Algorithm,
        cause: ChecksumError,
        partial: ChecksumResult,
    },
}

impl JobOutcome {
    pub fn result(&self) -> &ChecksumResult {
        match self {
            JobOutcome::Completed(r) | JobOutcome::Cancelled(r) => r,
            JobOutcome::Failed { partial, .. } => partial,
        }
    }

    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::Completed(_) => JobState::Completed,
            JobOutcome::Cancelled(_) => JobState::Cancelled,
            JobOutcome::Failed { cause, .. } => JobState::Failed(cause.to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }
}
