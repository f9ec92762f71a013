// src/process/leaf.rs

//! A single supervised command and its lifecycle.
//!
//! State machine:
//!
//! ```text
//!   Idle ──start fails──────────────▶ Errored
//!   Idle ──started, pattern───────▶ Running ──line matches──▶ Ready
//!   Idle ──started, no pattern────▶ Ready
//!   Running|Ready ──exit 0────────▶ Exited
//!   Running|Ready ──exit ≠ 0/kill─▶ Errored
//! ```
//!
//! Background workers (two stream readers and one waiter per run) never touch
//! the leaf directly. They push into the run's queues, and the owner of the
//! leaf applies them in [`LeafProcess::drain`].

use std::path::PathBuf;
use std::process::ExitStatus;

use regex::Regex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::errors::{Result, SheepdogError};
use crate::launch::{self, LaunchSpec, Launched};
use crate::process::stream::{StreamSinks, spawn_stream_worker};
use crate::types::{LogEntry, LogLevel, Status};

/// Capacity of the per-run log queue; lines beyond it are dropped until the
/// consumer drains.
pub const LOG_QUEUE_CAPACITY: usize = 64;

/// Capacity of the per-run status queue.
pub const STATUS_QUEUE_CAPACITY: usize = 16;

/// Receiving ends of the queues fed by a run's workers.
#[derive(Debug)]
struct RunQueues {
    log_rx: mpsc::Receiver<LogEntry>,
    status_rx: mpsc::Receiver<Status>,
}

/// Handle to the OS process of the current run.
///
/// Dropping it closes the cancellation channel, which the waiter treats like
/// an explicit kill.
#[derive(Debug)]
struct RunHandle {
    pid: u32,
    cancel: Option<oneshot::Sender<()>>,
}

#[derive(Debug)]
pub struct LeafProcess {
    command: Vec<String>,
    cwd: Option<String>,
    ready_pattern: Option<Regex>,

    status: Status,
    log: Vec<LogEntry>,

    queues: Option<RunQueues>,
    run: Option<RunHandle>,
}

impl LeafProcess {
    /// Create an idle leaf.
    ///
    /// An invalid readiness pattern is not fatal: readiness detection is
    /// disabled for this leaf and the compile error is recorded in its log.
    pub fn new(
        name: &str,
        command: Vec<String>,
        cwd: Option<String>,
        ready_pattern: Option<&str>,
    ) -> Self {
        let mut log = Vec::new();

        let ready_pattern = ready_pattern.and_then(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(
                    process = %name,
                    pattern = %pattern,
                    error = %e,
                    "invalid ready pattern; readiness detection disabled"
                );
                log.push(LogEntry::error(format!(
                    "invalid ready pattern {pattern:?}: {e}"
                )));
                None
            }
        });

        Self {
            command,
            cwd,
            ready_pattern,
            status: Status::Idle,
            log,
            queues: None,
            run: None,
        }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn cwd(&self) -> Option<&str> {
        self.cwd.as_deref()
    }

    pub fn ready_pattern(&self) -> Option<&Regex> {
        self.ready_pattern.as_ref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Durable log, in arrival order, across every run of this leaf.
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Pid of the current run's process, if one is alive (or being killed).
    pub fn pid(&self) -> Option<u32> {
        self.run.as_ref().map(|r| r.pid)
    }

    /// Start the command.
    ///
    /// Returns `true` when a process was started and the leaf wants to be
    /// ticked. Calling this while already `Running`/`Ready` only appends a
    /// warning to the log.
    pub fn run(&mut self, name: &str) -> bool {
        if self.status.is_active() {
            warn!(process = %name, "run requested but process is already running");
            self.log.push(LogEntry::error(format!(
                "Process {name:?} is already running."
            )));
            return false;
        }

        // Pick up anything the previous run left behind before its queues
        // are replaced.
        self.drain(name);

        let mut launched = match self.launch() {
            Ok(launched) => launched,
            Err(e) => {
                error!(process = %name, error = %e, "failed to start process");
                self.log.push(LogEntry::error(e.to_string()));
                self.status = Status::Errored;
                return false;
            }
        };

        let pid = launched.pid();
        let (log_tx, log_rx) = mpsc::channel(LOG_QUEUE_CAPACITY);
        let (status_tx, status_rx) = mpsc::channel(STATUS_QUEUE_CAPACITY);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let sinks = StreamSinks {
            log_tx: log_tx.clone(),
            status_tx: status_tx.clone(),
            ready_pattern: self.ready_pattern.clone(),
        };
        if let Some(stdout) = launched.take_stdout() {
            spawn_stream_worker(name.to_string(), stdout, LogLevel::Info, sinks.clone());
        }
        if let Some(stderr) = launched.take_stderr() {
            spawn_stream_worker(name.to_string(), stderr, LogLevel::Error, sinks);
        }

        tokio::spawn(wait_for_exit(
            name.to_string(),
            launched,
            log_tx,
            status_tx,
            cancel_rx,
        ));

        self.queues = Some(RunQueues { log_rx, status_rx });
        self.run = Some(RunHandle {
            pid,
            cancel: Some(cancel_tx),
        });
        self.status = if self.ready_pattern.is_some() {
            Status::Running
        } else {
            Status::Ready
        };

        info!(process = %name, pid, status = %self.status, "process started");
        true
    }

    fn launch(&self) -> Result<Launched> {
        let spec = LaunchSpec::from_argv(&self.command, self.working_dir()?)
            .ok_or_else(|| SheepdogError::ConfigError("empty command".to_string()))?;
        launch::start(&spec)
    }

    /// Absolute working directory: `cwd` joined onto the supervisor's own
    /// working directory (an absolute `cwd` replaces it).
    fn working_dir(&self) -> Result<PathBuf> {
        let base = std::env::current_dir()?;
        Ok(match self.cwd.as_deref() {
            Some(dir) if !dir.is_empty() => base.join(dir),
            _ => base,
        })
    }

    /// Request forceful termination of the running process tree.
    ///
    /// No-op unless `Running`/`Ready`. The status change arrives later through
    /// the waiter, like any other exit.
    pub fn kill(&mut self, name: &str) {
        if !self.status.is_active() {
            return;
        }

        let Some(run) = self.run.as_mut() else {
            return;
        };

        match run.cancel.take() {
            Some(cancel) => {
                info!(process = %name, pid = run.pid, "kill requested");
                if cancel.send(()).is_err() {
                    debug!(process = %name, "process already finished while killing");
                }
            }
            None => {
                debug!(process = %name, "kill already requested for this run");
            }
        }
    }

    /// Move everything queued by the workers into durable state.
    ///
    /// Statuses are drained before log lines: the waiter enqueues its final
    /// log line before the final status, so seeing the status guarantees the
    /// line is already queued.
    pub fn drain(&mut self, name: &str) {
        let Some(queues) = self.queues.as_mut() else {
            return;
        };

        let mut statuses = Vec::new();
        while let Ok(status) = queues.status_rx.try_recv() {
            statuses.push(status);
        }
        while let Ok(entry) = queues.log_rx.try_recv() {
            self.log.push(entry);
        }

        for status in statuses {
            self.apply_status(name, status);
        }
    }

    fn apply_status(&mut self, name: &str, status: Status) {
        match status {
            // Readiness only promotes a live run; a match racing the exit
            // notification must not resurrect a finished one.
            Status::Ready => {
                if self.status == Status::Running {
                    info!(process = %name, "process is ready");
                    self.status = Status::Ready;
                }
            }
            Status::Exited | Status::Errored => {
                info!(process = %name, status = %status, "process finished");
                self.status = status;
                self.run = None;
            }
            Status::Idle | Status::Running => {
                self.status = status;
            }
        }
    }

    /// Whether queued events are still waiting to be drained.
    pub fn has_pending(&self) -> bool {
        self.queues
            .as_ref()
            .is_some_and(|q| !q.log_rx.is_empty() || !q.status_rx.is_empty())
    }

    /// Whether another tick is needed after a drain.
    pub fn needs_tick(&self) -> bool {
        self.has_pending() || self.status.is_active()
    }

    /// Release the run handle; a still-running process tree is killed by its
    /// waiter as a consequence.
    pub fn clean_up(&mut self, name: &str) {
        self.drain(name);
        if let Some(run) = self.run.take() {
            debug!(process = %name, pid = run.pid, "releasing run handle");
        }
    }
}

/// Waiter worker: the only place that observes cancellation.
///
/// Process exit and cancellation race inside one `select!`, so the process
/// tree is terminated at most once per run, and never after a natural exit.
async fn wait_for_exit(
    name: String,
    mut launched: Launched,
    log_tx: mpsc::Sender<LogEntry>,
    status_tx: mpsc::Sender<Status>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let pid = launched.pid();

    let exit = tokio::select! {
        res = launched.wait() => res,

        cancel = &mut cancel_rx => {
            match cancel {
                Ok(()) => info!(process = %name, pid, "killing process tree"),
                Err(_) => debug!(process = %name, pid, "run handle released; killing process tree"),
            }
            launched.kill_tree().await;
            launched.wait().await
        }
    };

    let (entry, status) = match exit {
        Ok(exit_status) if exit_status.success() => {
            (LogEntry::info("exited with code 0"), Status::Exited)
        }
        Ok(exit_status) => (LogEntry::error(describe_failure(exit_status)), Status::Errored),
        Err(e) => (
            LogEntry::error(format!("failed waiting for process: {e}")),
            Status::Errored,
        ),
    };

    info!(process = %name, pid, message = %entry.message, "process exited");

    if log_tx.send(entry).await.is_err() || status_tx.send(status).await.is_err() {
        debug!(process = %name, pid, "leaf dropped its queues before exit was reported");
    }
}

fn describe_failure(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with code {code}"),
        None => status.to_string(),
    }
}
