use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use checksum::hashers::{self, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use checksum::{utils, JobConfig, PassMode};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Compute MD5, SHA1, SHA256, SHA512 and CRC32 checksums of a file", long_about = None)]
pub struct Args {
    /// The file to checksum.
    pub path: PathBuf,

    /// Read the file once and feed all five digests from that single read.
    /// Cancellation is then only honored before the read starts.
    #[arg(long, default_value_t = false)]
    pub single_pass: bool,

    /// Size of each read while streaming the file.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_name = "BYTES")]
    pub chunk_size: usize,

    /// Expected checksum, or a path to a hash file containing it.
    /// Any of the five digests may match. Exits with code 3 on mismatch.
    #[arg(short, long, value_name = "HASH|FILE")]
    pub expect: Option<String>,

    /// Print a JSON report on stdout instead of one line per digest.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Also write the JSON report to this file.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Do not print progress lines on stderr.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn", value_name = "FILTER")]
    pub log_level: String,
}

impl Args {
    pub fn job_config(&self) -> Result<JobConfig> {
        if hashers::check_chunk_size(self.chunk_size).is_err() {
            bail!("--chunk-size must be between 1 and {MAX_CHUNK_SIZE} bytes");
        }
        Ok(JobConfig {
            chunk_size: self.chunk_size,
            pass_mode: if self.single_pass {
                PassMode::SinglePass
            } else {
                PassMode::PerAlgorithm
            },
        })
    }

    /// Resolves `--expect`: an existing file is read as a hash file, anything else is the hash itself.
    pub fn expected_hash(&self) -> Result<Option<String>> {
        let Some(value) = &self.expect else {
            return Ok(None);
        };
        let candidate = PathBuf::from(value);
        if candidate.is_file() {
            let txt = std::fs::read_to_string(&candidate)
                .with_context(|| format!("Failed to read hash file {}", candidate.display()))?;
            return match utils::parse_first_hash_from_text(&txt) {
                Some(h) => Ok(Some(h)),
                None => bail!("No hash found in {}", candidate.display()),
            };
        }
        Ok(Some(value.trim().to_string()))
    }
}
