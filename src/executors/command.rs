use crate::core::errors::{ExecError, PhishError};
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

const STDERR_TAIL_LINES: usize = 10;

pub struct CommandResult {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stderr_tail: String,
    pub duration_ms: u128,
    pub pid: Option<u32>,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn to_exec_error(&self, tool: &str, args: &[String], cwd: &Path) -> ExecError {
        ExecError {
            tool: tool.to_string(),
            args: args.to_vec(),
            cwd: cwd.display().to_string(),
            exit_code: self.exit_code,
            stderr_tail: self.stderr_tail.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Run `tool` to completion, echoing its output as it arrives.
///
/// No timeout: a hung child blocks the caller. Dropping the returned future
/// kills the child.
pub async fn execute_streaming(tool: &str, args: &[String], cwd: &Path) -> Result<CommandResult> {
    let start = Instant::now();

    tracing::debug!("Executing: {} {:?} in {:?}", tool, args, cwd);

    let mut cmd = Command::new(tool);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {}", tool))?;

    let pid = child.id();

    let stdout_handle = child.stdout.take().context("child stdout was not captured")?;
    let stderr_handle = child.stderr.take().context("child stderr was not captured")?;

    let (stdout_result, stderr_result, wait_result) = tokio::join!(
        echo_lines(BufReader::new(stdout_handle), false),
        echo_lines(BufReader::new(stderr_handle), true),
        child.wait()
    );

    let duration_ms = start.elapsed().as_millis();

    let status = wait_result.map_err(|e| {
        PhishError::Exec(ExecError {
            tool: tool.to_string(),
            args: args.to_vec(),
            cwd: cwd.display().to_string(),
            exit_code: None,
            stderr_tail: format!("Process error: {}", e),
            duration_ms,
        })
    })?;
    stdout_result?;
    let stderr_tail = stderr_result?;

    Ok(CommandResult {
        exit_code: status.code(),
        stderr_tail: Vec::from(stderr_tail).join("\n"),
        duration_ms,
        pid,
    })
}

async fn echo_lines<R>(reader: BufReader<R>, is_stderr: bool) -> Result<VecDeque<String>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if is_stderr {
            eprintln!("{}", line);
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        } else {
            println!("{}", line);
        }
    }

    Ok(tail)
}
