use tracing::{debug, warn};

/// Kill the whole process tree rooted at `pid`.
///
/// The sandbox is spawned as a process group leader, so its PGID equals its
/// PID. Falls back to signalling the pid alone if the group kill fails.
#[cfg(unix)]
pub(crate) fn kill_process_tree(pid: u32) {
    use nix::sys::signal::{kill, killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!(pid, "Sandbox pid does not fit a pid_t, not signalling");
        return;
    };
    let target = Pid::from_raw(raw);

    match killpg(target, Signal::SIGKILL) {
        Ok(()) => debug!(pid, "Killed sandbox process group"),
        Err(e) => {
            warn!(pid, error = %e, "killpg failed, falling back to SIGTERM");
            if let Err(e) = kill(target, Signal::SIGTERM) {
                warn!(pid, error = %e, "Failed to terminate sandbox process");
            }
        }
    }
}

#[cfg(windows)]
pub(crate) fn kill_process_tree(pid: u32) {
    use std::process::Command;

    let pid_arg = pid.to_string();
    let tree = Command::new("taskkill").args(["/PID", &pid_arg, "/T", "/F"]).status();
    match tree {
        Ok(status) if status.success() => debug!(pid, "Killed sandbox process tree"),
        other => {
            warn!(pid, result = ?other, "taskkill /T failed, falling back to plain termination");
            if let Err(e) = Command::new("taskkill").args(["/PID", &pid_arg, "/F"]).status() {
                warn!(pid, error = %e, "Failed to terminate sandbox process");
            }
        }
    }
}

/// Human-readable reason for an abnormal exit, `None` for a clean one
pub(crate) fn describe_exit(status: &std::process::ExitStatus) -> Option<String> {
    if status.success() {
        return None;
    }
    if let Some(code) = status.code() {
        return Some(format!("Sandbox server exited with code {}", code));
    }
    match crate::build::exit_signal(status) {
        Some(signal) => Some(format!("Sandbox server terminated by signal {}", signal)),
        None => Some("Sandbox server exited abnormally".to_string()),
    }
}
