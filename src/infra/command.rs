//! # Command Execution Module / 命令执行模块
//!
//! Builds the simulation's process invocation from a case definition and runs
//! it with captured output, an optional timeout, and cancellation.
//!
//! 根据用例定义构建模拟的进程调用，并在捕获输出、可选超时和取消支持下运行它。

use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::core::config::ComparisonCase;
use crate::core::error::{ComparisonError, ComparisonResult};

/// A structured process invocation: executable plus argument list.
/// 结构化的进程调用：可执行文件加参数列表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchSpec {
    /// Derives the invocation from a case. A `command` string gets `~`/`$VAR`
    /// expansion and shell-word splitting; `program` + `args` are used verbatim.
    pub fn from_case(case: &ComparisonCase) -> ComparisonResult<Self> {
        if let Some(program) = &case.program {
            return Ok(Self {
                program: program.clone(),
                args: case.args.clone(),
            });
        }

        let raw = case.command.as_deref().unwrap_or_default();
        let spawn_error = |msg: String| ComparisonError::Spawn {
            command: raw.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, msg),
        };

        let expanded = shellexpand::full(raw)
            .map_err(|e| spawn_error(format!("failed to expand command: {e}")))?
            .to_string();
        let mut parts = shlex::split(&expanded)
            .ok_or_else(|| spawn_error(format!("failed to parse command: {expanded}")))?
            .into_iter();
        let program = parts
            .next()
            .ok_or_else(|| spawn_error("empty command after parsing".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Shell-quoted rendering, for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|s| shlex::try_quote(s).map(|q| q.into_owned()).unwrap_or_else(|_| s.to_string()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// What a finished simulation run left behind.
#[derive(Debug)]
pub struct CommandOutcome {
    pub status: ExitStatus,
    pub output: String,
    pub duration: Duration,
}

/// Runs `spec` in `workdir` and waits for it.
///
/// # Errors
/// * `Spawn` - the process could not be started
/// * `Timeout` - `timeout` elapsed; the process is killed
/// * `ExternalCommand` - the process exited unsuccessfully
/// * `Cancelled` - `cancel` fired; the process is killed
pub async fn run_launch(
    spec: &LaunchSpec,
    workdir: &Path,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> ComparisonResult<CommandOutcome> {
    let mut cmd = tokio::process::Command::new(&spec.program);
    cmd.args(&spec.args).kill_on_drop(true).current_dir(workdir);

    log::debug!("launching `{}` in {}", spec.display(), workdir.display());
    let start = Instant::now();
    let run = spawn_and_capture(cmd);

    let (status, output) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ComparisonError::Cancelled),
        res = maybe_timeout(run, timeout) => match res {
            Some(pair) => pair,
            None => {
                return Err(ComparisonError::Timeout {
                    command: spec.display(),
                    secs: timeout.map(|d| d.as_secs()).unwrap_or_default(),
                });
            }
        },
    };

    let status = status.map_err(|source| ComparisonError::Spawn {
        command: spec.display(),
        source,
    })?;
    let duration = start.elapsed();

    if !status.success() {
        return Err(ComparisonError::ExternalCommand {
            command: spec.display(),
            status: status.to_string(),
            output,
        });
    }

    Ok(CommandOutcome {
        status,
        output,
        duration,
    })
}

async fn maybe_timeout<F: std::future::Future>(fut: F, timeout: Option<Duration>) -> Option<F::Output> {
    match timeout {
        Some(d) => tokio::time::timeout(d, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Spawns a command, captures its stdout and stderr.
/// The output streams are read concurrently and combined into a single string.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取并合并到一个字符串中。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (std::io::Result<ExitStatus>, String) {
    let mut child = match cmd
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(std::io::Error::other("failed to capture child output")),
            String::new(),
        );
    };

    // Both readers append to the same buffer so lines keep their arrival order.
    // 两个读取任务写入同一个缓冲区，使各行保持到达顺序。
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let status = child.wait().await;

    if let Err(e) = stdout_handle.await {
        log::warn!("failed to join stdout reader: {e}");
    }
    if let Err(e) = stderr_handle.await {
        log::warn!("failed to join stderr reader: {e}");
    }

    (status, output.lock().await.clone())
}
