use proctor_core::SimulationError;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info, warn};

/// Upper bound on build output carried in the error message
pub(crate) const MAX_BUILD_OUTPUT_CHARS: usize = 4000;

/// Run the build command to completion on a blocking thread
pub(crate) async fn run_build(program: String, args: Vec<String>, working_dir: PathBuf) -> Result<(), SimulationError> {
    info!(program = %program, args = ?args, dir = %working_dir.display(), "Building sandbox server");

    let command_line = format!("{} {}", program, args.join(" "));
    let output = tokio::task::spawn_blocking(move || Command::new(&program).args(&args).current_dir(&working_dir).output())
        .await
        .map_err(|e| SimulationError::Internal(format!("Build task panicked: {}", e)))?;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            warn!(command = %command_line, error = %e, "Failed to launch sandbox build");
            return Err(SimulationError::BuildFailed {
                output: truncate_output(&format!("Failed to run `{}`: {}", command_line, e)),
                exit_code: None,
                signal: None,
            });
        }
    };

    if output.status.success() {
        debug!(command = %command_line, "Sandbox build finished");
        return Ok(());
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    let exit_code = output.status.code();
    let signal = exit_signal(&output.status);
    warn!(command = %command_line, ?exit_code, ?signal, "Sandbox build failed");

    Err(SimulationError::BuildFailed {
        output: truncate_output(&combined),
        exit_code,
        signal,
    })
}

/// Keep the last `MAX_BUILD_OUTPUT_CHARS` characters; compiler errors land at the end
pub(crate) fn truncate_output(output: &str) -> String {
    let trimmed = output.trim_end();
    let count = trimmed.chars().count();
    if count <= MAX_BUILD_OUTPUT_CHARS {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - MAX_BUILD_OUTPUT_CHARS).collect()
}

#[cfg(unix)]
pub(crate) fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
pub(crate) fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
