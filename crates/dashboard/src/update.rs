use crate::error::DashboardError;
use async_trait::async_trait;
use configuration::DashboardConfig;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Why a pipeline step did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Exit code of the step, if it ran to completion.
    pub code: Option<i32>,
    /// Everything the step wrote to stderr, unmodified.
    pub stderr: String,
}

/// One stage of the update pipeline.
#[async_trait]
pub trait PipelineStep: Send + Sync {
    fn name(&self) -> &str;
    async fn execute(&self) -> Result<(), StepFailure>;
}

/// Runs a pipeline binary as a child process and waits for it to exit.
#[derive(Debug, Clone)]
pub struct ProcessStep {
    name: String,
    program: PathBuf,
}

impl ProcessStep {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
        }
    }

    /// Uses `configured` if given, otherwise the binary called `name` in the
    /// directory of the running executable.
    pub fn locate(name: &str, configured: Option<&Path>) -> Result<Self, DashboardError> {
        let program = match configured {
            Some(path) => path.to_path_buf(),
            None => {
                let exe = std::env::current_exe().map_err(DashboardError::io(name))?;
                exe.with_file_name(format!("{name}{}", std::env::consts::EXE_SUFFIX))
            }
        };
        Ok(Self::new(name, program))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl PipelineStep for ProcessStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<(), StepFailure> {
        tracing::debug!(program = %self.program.display(), "Spawning pipeline step.");
        let output = Command::new(&self.program)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| StepFailure {
                code: None,
                stderr: format!("failed to start {}: {e}", self.program.display()),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(StepFailure {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

/// Holds the update lock file for as long as it lives.
#[derive(Debug)]
pub struct RunGuard {
    path: PathBuf,
}

impl RunGuard {
    /// Creates the lock file, failing with `UpdateInProgress` if another run
    /// holds it. A lock older than `stale_after` is assumed to belong to a
    /// crashed run and is taken over.
    pub fn acquire(path: &Path, stale_after: Duration) -> Result<Self, DashboardError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(DashboardError::io(parent))?;
        }

        match Self::create(path) {
            Ok(guard) => Ok(guard),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                match stale_holder(path, stale_after) {
                    Some(holder) => Self::take_over(path, &holder),
                    None => Err(DashboardError::UpdateInProgress(path.to_path_buf())),
                }
            }
            Err(e) => Err(DashboardError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Replaces a stale lock only while it still holds `holder`. A trigger
    /// that took it over first has already written its own pid there.
    fn take_over(path: &Path, holder: &str) -> Result<Self, DashboardError> {
        let in_progress = || DashboardError::UpdateInProgress(path.to_path_buf());

        match fs::read_to_string(path) {
            Ok(current) if current == holder => {}
            Ok(_) => return Err(in_progress()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DashboardError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        }

        tracing::warn!(
            path = %path.display(),
            holder = holder.trim(),
            "Taking over stale update lock."
        );
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DashboardError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        }

        Self::create(path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => in_progress(),
            _ => DashboardError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })
    }

    fn create(path: &Path) -> io::Result<Self> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        writeln!(file, "{}", std::process::id())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release update lock.");
        }
    }
}

/// The contents of the lock file if it is older than `stale_after`.
fn stale_holder(path: &Path, stale_after: Duration) -> Option<String> {
    let holder = fs::read_to_string(path).ok()?;
    let age = fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()?
        .elapsed()
        .ok()?;
    (age > stale_after).then_some(holder)
}

/// Runs fetch then analyze, one update at a time.
#[derive(Debug, Clone)]
pub struct UpdateRunner {
    lock_file: PathBuf,
    stale_lock_after: Duration,
}

impl UpdateRunner {
    pub fn new(lock_file: impl Into<PathBuf>, stale_lock_after: Duration) -> Self {
        Self {
            lock_file: lock_file.into(),
            stale_lock_after,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(&config.lock_file, config.stale_lock_after)
    }

    /// Runs `fetch`, and `analyze` only if the fetch succeeded. Either failure
    /// aborts the update with that step's exit code and stderr; the files the
    /// dashboard reads are left as they were.
    pub async fn run(
        &self,
        fetch: &dyn PipelineStep,
        analyze: &dyn PipelineStep,
    ) -> Result<(), DashboardError> {
        let _guard = RunGuard::acquire(&self.lock_file, self.stale_lock_after)?;

        for step in [fetch, analyze] {
            tracing::info!(step = step.name(), "Running pipeline step.");
            step.execute()
                .await
                .map_err(|failure| DashboardError::StepFailed {
                    step: step.name().to_string(),
                    code: failure.code,
                    stderr: failure.stderr,
                })?;
        }

        tracing::info!("Update complete.");
        Ok(())
    }
}
