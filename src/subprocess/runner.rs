use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ProcessError;

#[derive(Debug, Clone)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ProcessCommand {
    fn display(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// Everything a subordinate process left behind: exit status plus both output
/// streams accumulated in full.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Timeout,
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the command to completion, capturing stdout and stderr in full.
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;
}

pub struct TokioProcessRunner;

impl TokioProcessRunner {
    fn configure_command(command: &ProcessCommand) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        // Dropping the child (timeout expiry, caller disconnect) must take the
        // process down with it.
        cmd.kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            ExitStatus::Success
        } else if let Some(code) = status.code() {
            ExitStatus::Error(code)
        } else {
            Self::parse_signal_status(status)
        }
    }

    #[cfg(unix)]
    fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            ExitStatus::Signal(signal)
        } else {
            ExitStatus::Error(1)
        }
    }

    #[cfg(not(unix))]
    fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
        ExitStatus::Error(1)
    }

    fn map_spawn_error(error: std::io::Error, command: &ProcessCommand) -> ProcessError {
        if error.kind() == std::io::ErrorKind::NotFound {
            ProcessError::CommandNotFound(command.program.clone())
        } else {
            ProcessError::SpawnFailed {
                command: command.display(),
                source: error,
            }
        }
    }

    fn log_result(result: &ProcessOutput, command: &ProcessCommand) {
        match &result.status {
            ExitStatus::Success => {
                tracing::debug!(
                    "Subprocess completed successfully in {:?}: {}",
                    result.duration,
                    command.display()
                );
            }
            ExitStatus::Error(code) => {
                tracing::debug!(
                    "Subprocess failed with exit code {} in {:?}: {}",
                    code,
                    result.duration,
                    command.display()
                );
                if !result.stderr.is_empty() {
                    tracing::trace!("Stderr: {}", result.stderr);
                }
            }
            ExitStatus::Signal(signal) => {
                tracing::warn!(
                    "Subprocess terminated by signal {} in {:?}: {}",
                    signal,
                    result.duration,
                    command.display()
                );
            }
            ExitStatus::Timeout => {
                tracing::warn!(
                    "Subprocess killed after exceeding deadline {:?}: {}",
                    command.timeout,
                    command.display()
                );
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let start = std::time::Instant::now();

        tracing::debug!("Executing subprocess: {}", command.display());

        let mut cmd = Self::configure_command(&command);
        let child = cmd
            .spawn()
            .map_err(|e| Self::map_spawn_error(e, &command))?;

        // wait_with_output drains both pipes incrementally, so model output
        // larger than a single pipe buffer cannot deadlock the child. On
        // timeout the dropped child handle is killed via kill_on_drop.
        let result = match command.timeout {
            Some(deadline) => {
                match tokio::time::timeout(deadline, child.wait_with_output()).await {
                    Ok(output) => output.map_err(ProcessError::Io)?,
                    Err(_) => {
                        let timed_out = ProcessOutput {
                            status: ExitStatus::Timeout,
                            stdout: String::new(),
                            stderr: String::new(),
                            duration: start.elapsed(),
                        };
                        Self::log_result(&timed_out, &command);
                        return Ok(timed_out);
                    }
                }
            }
            None => child.wait_with_output().await.map_err(ProcessError::Io)?,
        };

        let output = ProcessOutput {
            status: Self::parse_exit_status(result.status),
            stdout: String::from_utf8_lossy(&result.stdout).to_string(),
            stderr: String::from_utf8_lossy(&result.stderr).to_string(),
            duration: start.elapsed(),
        };

        Self::log_result(&output, &command);

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::ProcessCommandBuilder;

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", "printf hello"])
            .build();

        let output = TokioProcessRunner.run(command).await.unwrap();
        assert_eq!(output.status, ExitStatus::Success);
        assert_eq!(output.stdout, "hello");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn captures_stderr_and_exit_code_on_failure() {
        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", "echo boom >&2; exit 3"])
            .build();

        let output = TokioProcessRunner.run(command).await.unwrap();
        assert_eq!(output.status, ExitStatus::Error(3));
        assert_eq!(output.stderr.trim(), "boom");
    }

    #[tokio::test]
    async fn accumulates_output_larger_than_a_pipe_buffer() {
        // 256 KiB of output, well past the usual 64 KiB pipe capacity.
        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", "i=0; while [ $i -lt 4096 ]; do printf '%064d\\n' $i; i=$((i+1)); done"])
            .build();

        let output = TokioProcessRunner.run(command).await.unwrap();
        assert_eq!(output.status, ExitStatus::Success);
        assert_eq!(output.stdout.len(), 4096 * 65);
    }

    #[tokio::test]
    async fn deadline_expiry_kills_the_child() {
        let command = ProcessCommandBuilder::new("sh")
            .args(["-c", "sleep 30"])
            .timeout(Duration::from_millis(100))
            .build();

        let start = std::time::Instant::now();
        let output = TokioProcessRunner.run(command).await.unwrap();
        assert_eq!(output.status, ExitStatus::Timeout);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_program_is_command_not_found() {
        let command = ProcessCommandBuilder::new("demandcast-no-such-program").build();

        let err = TokioProcessRunner.run(command).await.unwrap_err();
        match err {
            ProcessError::CommandNotFound(program) => {
                assert_eq!(program, "demandcast-no-such-program");
            }
            other => panic!("Expected CommandNotFound, got {other:?}"),
        }
    }
}
