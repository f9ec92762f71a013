// src/launch/mod.rs

//! OS process launching and process-tree termination.
//!
//! Every command is started as the leader of its own process group (POSIX) or
//! in a new process group (Windows), so that [`Launched::kill_tree`] can take
//! down the command *and* everything it forked: shells, build tools, dev
//! servers that spawn workers, and so on.
//!
//! The platform specific parts live in [`unix`] and [`windows`]; the rest of
//! the crate only sees [`start`] and [`Launched`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, info};

use crate::errors::{Result, SheepdogError};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as platform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as platform;

/// Everything needed to start one command.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Program name or path, resolved through `PATH` (or relative to `cwd`
    /// when it contains a path separator).
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Extra variables layered over the inherited environment.
    pub env: Vec<(OsString, OsString)>,
}

impl LaunchSpec {
    /// Build a spec from an argv vector (`argv[0]` is the program).
    ///
    /// Returns `None` for an empty argv.
    pub fn from_argv(argv: &[String], cwd: impl Into<PathBuf>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd: cwd.into(),
            env: Vec::new(),
        })
    }
}

/// A started OS process with piped stdout/stderr.
#[derive(Debug)]
pub struct Launched {
    child: Child,
    pid: u32,
}

/// Resolve `program` to an executable path.
pub fn resolve_program(program: &str, cwd: &Path) -> Result<PathBuf> {
    which::which_in(program, std::env::var_os("PATH"), cwd).map_err(|e| {
        SheepdogError::ExecutableNotFound {
            program: program.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Start the command described by `spec` in its own process group.
pub fn start(spec: &LaunchSpec) -> Result<Launched> {
    let program = resolve_program(&spec.program, &spec.cwd)?;

    let mut cmd = Command::new(&program);
    cmd.args(&spec.args)
        .current_dir(&spec.cwd)
        .envs(spec.env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    platform::detach(&mut cmd);

    let child = cmd.spawn().map_err(|e| SheepdogError::StartFailed {
        program: spec.program.clone(),
        reason: e.to_string(),
    })?;

    let pid = child.id().ok_or_else(|| SheepdogError::StartFailed {
        program: spec.program.clone(),
        reason: "spawned child did not report a pid".to_string(),
    })?;

    info!(
        program = %program.display(),
        args = ?spec.args,
        cwd = %spec.cwd.display(),
        pid,
        "started process"
    );

    Ok(Launched { child, pid })
}

impl Launched {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for the direct child to exit.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Forcefully terminate the process and all of its descendants.
    ///
    /// Must only be called while the child has not been reaped yet; the pid
    /// (and process group id) could otherwise have been reused.
    pub async fn kill_tree(&mut self) {
        debug!(pid = self.pid, "terminating process tree");
        platform::kill_tree(&mut self.child, self.pid).await;
    }
}
