// src/launch/unix.rs

//! POSIX backend: one process group per command, `SIGKILL` to the group.

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Make the child the leader of a fresh process group (pgid == pid).
pub(super) fn detach(cmd: &mut Command) {
    cmd.process_group(0);
}

pub(super) async fn kill_tree(child: &mut Child, pid: u32) {
    let pgid = Pid::from_raw(pid as i32);

    match killpg(pgid, Signal::SIGKILL) {
        Ok(()) => {
            debug!(pgid = pid, "sent SIGKILL to process group");
        }
        Err(Errno::ESRCH) => {
            debug!(pgid = pid, "process group already gone");
        }
        Err(e) => {
            warn!(
                pgid = pid,
                error = %e,
                "failed to signal process group; killing direct child only"
            );
            if let Err(e) = child.start_kill() {
                debug!(pid, error = %e, "direct kill failed (process likely exited)");
            }
        }
    }
}
