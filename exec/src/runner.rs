use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::process::Command;

use crate::error::ExecError;
use crate::error::Result;
use crate::invocation::Invocation;
use crate::output::STDERR_TAIL_BYTES;
use crate::output::stderr_tail;

/// Seam between the migration pipeline and the operating system.
///
/// Implementations must not return until the child has exited.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` to completion; `Ok` only on exit status 0.
    async fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Spawns real child processes.
///
/// Child stdout is forwarded line by line to this process's stdout while the
/// child runs; stderr is captured and returned inside [`ExecError::Failed`].
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    stderr_budget: usize,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            stderr_budget: STDERR_TAIL_BYTES,
        }
    }

    pub fn with_stderr_budget(mut self, bytes: usize) -> Self {
        self.stderr_budget = bytes;
        self
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<()> {
        let program = invocation.program_name();
        tracing::debug!(
            "spawning `{}` in {}",
            invocation.command_line(),
            invocation.cwd.display()
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Pipes are drained while waiting so a chatty child never blocks.
        let (forwarded, captured, status) =
            tokio::join!(forward_stdout(stdout), capture(stderr), child.wait());

        if let Err(err) = forwarded {
            tracing::warn!("lost output from `{program}`: {err}");
        }
        let captured = captured.unwrap_or_else(|err| format!("<stderr unavailable: {err}>"));
        let status = status.map_err(|source| ExecError::Wait {
            program: program.clone(),
            source,
        })?;

        if status.success() {
            if !captured.trim().is_empty() {
                tracing::debug!("`{program}` stderr:\n{}", captured.trim_end());
            }
            return Ok(());
        }

        Err(ExecError::Failed {
            program,
            code: status.code(),
            stderr: stderr_tail(&captured, self.stderr_budget).to_string(),
        })
    }
}

async fn forward_stdout<R>(stream: Option<R>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return Ok(());
    };
    let mut reader = BufReader::new(stream);
    let mut out = tokio::io::stdout();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        out.write_all(&line).await?;
        out.flush().await?;
    }
    Ok(())
}

async fn capture<R>(stream: Option<R>) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(mut stream) = stream else {
        return Ok(String::new());
    };
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
