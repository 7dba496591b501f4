// Helper for running the extractor process

use std::io::ErrorKind as IoErrorKind;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command as TokioCommand};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::downloader::errors::DownloadError;

/// Run a program to completion, bounded by `timeout` and `cancel`.
///
/// stdout and stderr are drained concurrently so a chatty child cannot block
/// on a full pipe. The child is killed on timeout, on cancellation, and when
/// the returned future is dropped. The deadline also covers draining the
/// pipes, which a backgrounded grandchild may hold open after the child exits.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Output, DownloadError> {
    let deadline = Instant::now() + timeout;

    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::ExtractorFailed(format!("Failed to capture stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::ExtractorFailed(format!("Failed to capture stderr from {}", program)))?;

    let mut stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let mut stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let waited = tokio::select! {
        waited = tokio::time::timeout_at(deadline, child.wait()) => match waited {
            Ok(status) => Waited::Exited(status),
            Err(_) => Waited::TimedOut,
        },
        _ = cancel.cancelled() => Waited::Cancelled,
    };

    let status = match waited {
        Waited::Exited(status) => status.map_err(|e| {
            DownloadError::ExtractorFailed(format!("Failed to wait for {}: {}", program, e))
        })?,
        Waited::TimedOut => {
            stop_child(&mut child, [&stdout_task, &stderr_task]).await;
            return Err(DownloadError::Timeout(timeout));
        }
        Waited::Cancelled => {
            stop_child(&mut child, [&stdout_task, &stderr_task]).await;
            return Err(DownloadError::Cancelled);
        }
    };

    let drained = tokio::select! {
        drained = tokio::time::timeout_at(deadline, async {
            let stdout = join_pipe(&mut stdout_task, "stdout").await?;
            let stderr = join_pipe(&mut stderr_task, "stderr").await?;
            Ok::<_, DownloadError>((stdout, stderr))
        }) => drained.map_err(|_| DownloadError::Timeout(timeout)),
        _ = cancel.cancelled() => Err(DownloadError::Cancelled),
    };

    match drained {
        Ok(pipes) => {
            let (stdout, stderr) = pipes?;
            Ok(Output { status, stdout, stderr })
        }
        Err(error) => {
            stdout_task.abort();
            stderr_task.abort();
            Err(error)
        }
    }
}

type PipeReader = JoinHandle<std::io::Result<Vec<u8>>>;

enum Waited {
    Exited(std::io::Result<std::process::ExitStatus>),
    TimedOut,
    Cancelled,
}

async fn stop_child(child: &mut Child, readers: [&PipeReader; 2]) {
    let _ = child.kill().await;
    for reader in readers {
        reader.abort();
    }
}

async fn join_pipe(
    task: &mut PipeReader,
    name: &str,
) -> Result<Vec<u8>, DownloadError> {
    task.await
        .map_err(|e| DownloadError::ExtractorFailed(format!("{} task failed: {}", name, e)))?
        .map_err(|e| DownloadError::ExtractorFailed(format!("Failed to read {}: {}", name, e)))
}

fn spawn_error(program: &str, e: std::io::Error) -> DownloadError {
    match e.kind() {
        IoErrorKind::NotFound => DownloadError::ToolNotFound(format!("{}: {}", program, e)),
        IoErrorKind::PermissionDenied => {
            DownloadError::ToolPermissionDenied(format!("{}: {}", program, e))
        }
        _ => DownloadError::ExtractorFailed(format!("Failed to start {}: {}", program, e)),
    }
}
