//! Checksum job: runs the five digests for one file on a worker thread, reporting progress
//! through listeners and stopping at stage boundaries when cancelled.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::error::ChecksumError;
use crate::file_ops::{self, ContentSource, FileSource};
use crate::hashers::{self, DEFAULT_CHUNK_SIZE};
use crate::models::{Algorithm, ChecksumResult, JobOutcome, JobState};

pub const TOTAL_STAGES: usize = Algorithm::ORDER.len();

/// Shared cancellation flag. Set from any thread, polled by the worker between stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassMode {
    /// One full read of the file per algorithm.
    #[default]
    PerAlgorithm,
    /// One read feeding all five accumulators. Cancellation is only observed before the read.
    SinglePass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobConfig {
    pub chunk_size: usize,
    pub pass_mode: PassMode,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pass_mode: PassMode::default(),
        }
    }
}

/// Events in emission order: `Started`, then per stage `StageStarted`, `Value`, `StageFinished`,
/// then exactly one of `Ended`, `Cancelled`, `Failed`. Stage indexes are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Started { total: usize },
    StageStarted { algorithm: Algorithm, index: usize, total: usize },
    Value { algorithm: Algorithm, hex: String },
    StageFinished { algorithm: Algorithm, index: usize, total: usize },
    Ended,
    Cancelled,
    Failed { algorithm: Algorithm, cause: String },
}

impl JobEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobEvent::Ended | JobEvent::Cancelled | JobEvent::Failed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub stage_name: &'static str,
    pub stage_index: usize,
    pub total_stages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueUpdate {
    pub algorithm: Algorithm,
    pub hex_value: String,
}

type EventListener = Box<dyn FnMut(&JobEvent) + Send>;
type DoneListener = Box<dyn FnOnce(&JobOutcome) + Send>;

pub struct ChecksumJob {
    source: Box<dyn ContentSource>,
    config: JobConfig,
    listeners: Vec<EventListener>,
    done_listeners: Vec<DoneListener>,
    state: JobState,
}

impl ChecksumJob {
    /// Fails with `FileNotFound` before anything runs if `path` is not a regular file.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ChecksumError> {
        let path = path.as_ref();
        file_ops::ensure_regular_file(path)?;
        Ok(Self::from_source(Box::new(FileSource::new(path))))
    }

    pub fn from_source(source: Box<dyn ContentSource>) -> Self {
        Self {
            source,
            config: JobConfig::default(),
            listeners: Vec::new(),
            done_listeners: Vec::new(),
            state: JobState::Idle,
        }
    }

    pub fn with_config(mut self, config: JobConfig) -> Self {
        self.config = config;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    pub fn pass_mode(mut self, pass_mode: PassMode) -> Self {
        self.config.pass_mode = pass_mode;
        self
    }

    pub fn path(&self) -> &Path {
        self.source.path()
    }

    /// Receives every event.
    pub fn on_event(mut self, listener: impl FnMut(&JobEvent) + Send + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Called when each stage starts.
    pub fn on_progress(self, mut listener: impl FnMut(Progress) + Send + 'static) -> Self {
        self.on_event(move |event| {
            if let JobEvent::StageStarted {
                algorithm,
                index,
                total,
            } = event
            {
                listener(Progress {
                    stage_name: algorithm.id(),
                    stage_index: *index,
                    total_stages: *total,
                });
            }
        })
    }

    /// Called as each digest completes.
    pub fn on_value(self, mut listener: impl FnMut(ValueUpdate) + Send + 'static) -> Self {
        self.on_event(move |event| {
            if let JobEvent::Value { algorithm, hex } = event {
                listener(ValueUpdate {
                    algorithm: *algorithm,
                    hex_value: hex.clone(),
                });
            }
        })
    }

    /// Called exactly once with the terminal outcome, after the terminal event.
    pub fn on_done(mut self, listener: impl FnOnce(&JobOutcome) + Send + 'static) -> Self {
        self.done_listeners.push(Box::new(listener));
        self
    }

    /// Runs the job on a dedicated worker thread.
    pub fn start(self) -> Result<JobHandle, ChecksumError> {
        let token = CancelToken::new();
        let worker_token = token.clone();
        let path = self.path().to_path_buf();
        let worker = thread::Builder::new()
            .name("checksum-worker".to_string())
            .spawn(move || self.run(&worker_token))
            .map_err(|e| ChecksumError::Io {
                path: path.clone(),
                source: e,
            })?;
        debug!(path = %path.display(), "checksum worker spawned");
        Ok(JobHandle {
            token,
            path,
            worker: Some(worker),
        })
    }

    /// Runs the job to completion on the current thread.
    pub fn run(mut self, token: &CancelToken) -> JobOutcome {
        info!(path = %self.path().display(), mode = ?self.config.pass_mode, "checksum job started");
        self.emit(JobEvent::Started {
            total: TOTAL_STAGES,
        });

        let outcome = match self.config.pass_mode {
            PassMode::PerAlgorithm => self.run_per_algorithm(token),
            PassMode::SinglePass => self.run_single_pass(token),
        };

        let terminal = match &outcome {
            JobOutcome::Completed(_) => JobEvent::Ended,
            JobOutcome::Cancelled(partial) => {
                info!(computed = partial.len(), "checksum job cancelled");
                JobEvent::Cancelled
            }
            JobOutcome::Failed { stage, cause, .. } => {
                warn!(stage = stage.id(), error = %cause, "checksum job failed");
                JobEvent::Failed {
                    algorithm: *stage,
                    cause: cause.to_string(),
                }
            }
        };
        self.set_state(outcome.state());
        self.emit(terminal);
        for listener in self.done_listeners.drain(..) {
            listener(&outcome);
        }
        outcome
    }

    fn run_per_algorithm(&mut self, token: &CancelToken) -> JobOutcome {
        let mut result = ChecksumResult::new();
        for (i, algorithm) in Algorithm::ORDER.iter().copied().enumerate() {
            if token.is_cancelled() {
                return JobOutcome::Cancelled(result);
            }
            let index = i + 1;
            self.begin_stage(algorithm, index);
            match self.digest(algorithm) {
                Ok(hex) => self.finish_stage(&mut result, algorithm, index, hex),
                Err(cause) => {
                    return JobOutcome::Failed {
                        stage: algorithm,
                        cause,
                        partial: result,
                    }
                }
            }
        }
        JobOutcome::Completed(result)
    }

    fn run_single_pass(&mut self, token: &CancelToken) -> JobOutcome {
        let mut result = ChecksumResult::new();
        if token.is_cancelled() {
            return JobOutcome::Cancelled(result);
        }
        let first = Algorithm::ORDER[0];
        self.begin_stage(first, 1);
        let digests = match self.digest_all() {
            Ok(digests) => digests,
            Err(cause) => {
                return JobOutcome::Failed {
                    stage: first,
                    cause,
                    partial: result,
                }
            }
        };
        for (i, (algorithm, hex)) in digests.into_iter().enumerate() {
            let index = i + 1;
            if index > 1 {
                self.begin_stage(algorithm, index);
            }
            self.finish_stage(&mut result, algorithm, index, hex);
        }
        JobOutcome::Completed(result)
    }

    fn begin_stage(&mut self, algorithm: Algorithm, index: usize) {
        self.set_state(JobState::Running(algorithm));
        self.emit(JobEvent::StageStarted {
            algorithm,
            index,
            total: TOTAL_STAGES,
        });
    }

    fn finish_stage(
        &mut self,
        result: &mut ChecksumResult,
        algorithm: Algorithm,
        index: usize,
        hex: String,
    ) {
        if !result.insert(algorithm, hex.clone()) {
            warn!(stage = algorithm.id(), "digest already present, keeping first value");
        }
        self.emit(JobEvent::Value { algorithm, hex });
        self.emit(JobEvent::StageFinished {
            algorithm,
            index,
            total: TOTAL_STAGES,
        });
    }

    fn digest(&self, algorithm: Algorithm) -> Result<String, ChecksumError> {
        let path = self.source.path();
        let reader = self.source.open().map_err(|e| ChecksumError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        hashers::compute_hash_for_reader(reader, algorithm, self.config.chunk_size)
            .map_err(|e| e.into_checksum_error(path))
    }

    fn digest_all(&self) -> Result<Vec<(Algorithm, String)>, ChecksumError> {
        let path = self.source.path();
        let reader = self.source.open().map_err(|e| ChecksumError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        hashers::compute_all_for_reader(reader, self.config.chunk_size)
            .map_err(|e| e.into_checksum_error(path))
    }

    fn set_state(&mut self, state: JobState) {
        debug!(from = ?self.state, to = ?state, "job state");
        self.state = state;
    }

    fn emit(&mut self, event: JobEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

/// Handle to a job running on its worker thread.
pub struct JobHandle {
    token: CancelToken,
    path: PathBuf,
    worker: Option<JoinHandle<JobOutcome>>,
}

impl JobHandle {
    /// Requests cooperative cancellation. Safe to call repeatedly; no-op once the job is done.
    pub fn cancel(&self) {
        if self.is_finished() {
            return;
        }
        debug!(path = %self.path.display(), "cancellation requested");
        self.token.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    /// Blocks until the worker returns its outcome.
    pub fn join(mut self) -> Result<JobOutcome, ChecksumError> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| ChecksumError::WorkerPanicked),
            None => Err(ChecksumError::WorkerPanicked),
        }
    }
}

/// Validates `path` and starts a job with no listeners.
pub fn start_job(path: impl AsRef<Path>) -> Result<JobHandle, ChecksumError> {
    ChecksumJob::new(path)?.start()
}
