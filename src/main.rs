mod args;
mod logging;

use std::process::ExitCode;

use anyhow::Result;
use checksum::{job::ValueUpdate, report::ChecksumReport, Algorithm, ChecksumJob, JobOutcome};
use clap::Parser;
use tracing::{info, warn};

use args::Args;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_MISMATCH: u8 = 3;
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = logging::setup_logging(&args.log_level) {
        eprintln!("checksum: failed to initialize logging: {e}");
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("checksum: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = args.job_config()?;
    let expected = args.expected_hash()?;

    let mut job = ChecksumJob::new(&args.path)?.with_config(config);
    if !args.quiet {
        job = job.on_progress(|p| {
            eprintln!("[{}/{}] calculating: {}", p.stage_index, p.total_stages, p.stage_name)
        });
    }
    if !args.json {
        job = job.on_value(|v| println!("{}", value_line(&v)));
    }

    let handle = job.start()?;
    let token = handle.cancel_token();
    let mut worker = tokio::task::spawn_blocking(move || handle.join());

    let outcome = tokio::select! {
        joined = &mut worker => joined??,
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("interrupt received, stopping after the current stage");
            token.cancel();
            tokio::select! {
                joined = &mut worker => joined??,
                Ok(()) = tokio::signal::ctrl_c() => {
                    // the blocking worker would hold the runtime open until its pass ends
                    eprintln!("checksum: interrupted again, exiting");
                    std::process::exit(i32::from(EXIT_CANCELLED));
                }
            }
        }
    };

    let report = ChecksumReport::from_outcome(&args.path, &outcome, expected.clone());
    if let Some(out) = &args.output {
        report.save(out)?;
        info!(path = %out.display(), "report written");
    }
    if args.json {
        println!("{}", report.to_json()?);
    }

    let summary = summarize(&outcome, expected.as_deref(), report.matched, args.json);
    if let Some(line) = &summary.stdout {
        println!("{line}");
    }
    if let Some(line) = &summary.stderr {
        eprintln!("{line}");
    }
    Ok(ExitCode::from(summary.code))
}

/// `LABEL: hex`, printed as each digest completes.
fn value_line(v: &ValueUpdate) -> String {
    format!("{}: {}", v.algorithm.name(), v.hex_value)
}

#[derive(Debug, PartialEq, Eq)]
struct Summary {
    code: u8,
    stdout: Option<String>,
    stderr: Option<String>,
}

/// Final lines and exit code for a finished job.
fn summarize(
    outcome: &JobOutcome,
    expected: Option<&str>,
    matched: Option<Algorithm>,
    json: bool,
) -> Summary {
    match outcome {
        JobOutcome::Completed(_) => match (expected, matched) {
            (Some(exp), None) => Summary {
                code: EXIT_MISMATCH,
                stdout: None,
                stderr: Some(format!("checksum: no digest matches expected value {exp}")),
            },
            (Some(_), Some(algorithm)) => Summary {
                code: EXIT_SUCCESS,
                stdout: None,
                stderr: Some(format!(
                    "checksum: {} matches expected value",
                    algorithm.name()
                )),
            },
            (None, _) => Summary {
                code: EXIT_SUCCESS,
                stdout: None,
                stderr: None,
            },
        },
        JobOutcome::Cancelled(_) => Summary {
            code: EXIT_CANCELLED,
            stdout: (!json).then(|| "cancelled".to_string()),
            stderr: None,
        },
        JobOutcome::Failed { stage, cause, .. } => Summary {
            code: EXIT_FAILURE,
            stdout: None,
            stderr: Some(format!("checksum: {} failed: {}", stage.name(), cause)),
        },
    }
}
