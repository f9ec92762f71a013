// src/launch/windows.rs

//! Windows backend: new process group at spawn, `taskkill /T /F` to end the
//! whole tree.

use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, warn};

const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

pub(super) fn detach(cmd: &mut Command) {
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

pub(super) async fn kill_tree(child: &mut Child, pid: u32) {
    let pid_arg = pid.to_string();
    let result = Command::new("taskkill")
        .args(["/T", "/F", "/PID", pid_arg.as_str()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match result {
        Ok(status) if status.success() => {
            debug!(pid, "taskkill terminated process tree");
        }
        Ok(status) => {
            warn!(pid, %status, "taskkill failed; killing direct child only");
            if let Err(e) = child.start_kill() {
                debug!(pid, error = %e, "direct kill failed (process likely exited)");
            }
        }
        Err(e) => {
            warn!(pid, error = %e, "could not run taskkill; killing direct child only");
            if let Err(e) = child.start_kill() {
                debug!(pid, error = %e, "direct kill failed (process likely exited)");
            }
        }
    }
}
