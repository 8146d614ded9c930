//! Launching registry entries.
//!
//! The `Launcher` resolves an ordinal against its registry snapshot, builds the
//! argument vector from its configuration snapshot and starts the process.
//! Detached launches return as soon as the process is spawned. Attached
//! launches drain stdout and stderr on two tasks and return once both streams
//! reach end-of-file, whether or not the child itself has exited.

use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::command::{build_command, format_command};
use crate::config::LaunchConfig;
use crate::output::{OutputLine, StreamKind};
use crate::registry::{Entry, Registry};

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("exe number {ordinal}: not in list")]
    NotFound { ordinal: i64 },

    #[error("could not execute {program}: {source}")]
    Execution {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Whether the caller stays attached to the child's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Start the process and return without capturing anything.
    Detach,
    /// Stream stdout and stderr until both are closed.
    Attach,
}

/// Launches entries from a registry snapshot.
#[derive(Debug, Clone)]
pub struct Launcher {
    config: LaunchConfig,
    registry: Registry,
}

impl Launcher {
    pub fn new(config: LaunchConfig, registry: Registry) -> Self {
        Self { config, registry }
    }

    /// Finds the entry for a 1-based ordinal.
    pub fn resolve(&self, ordinal: i64) -> Result<&Entry, LaunchError> {
        self.registry
            .get(ordinal)
            .ok_or(LaunchError::NotFound { ordinal })
    }

    /// Launches the entry at `ordinal`.
    ///
    /// In attached mode every line is sent to `sink` tagged with its stream, and
    /// all lines have been sent by the time this returns. Detached launches
    /// never write to `sink`.
    pub async fn launch(
        &self,
        ordinal: i64,
        mode: LaunchMode,
        sink: mpsc::UnboundedSender<OutputLine>,
    ) -> Result<(), LaunchError> {
        let entry = self.resolve(ordinal)?;
        log::debug!("launch {}: resolved {} -> {}", ordinal, entry.name, entry.path);

        let argv = build_command(&self.config.program, &self.config.program_args, &entry.path);
        let mut command = Command::new(&argv[0]);
        command.args(&argv[1..]);

        match mode {
            LaunchMode::Detach => self.detach(ordinal, command, &argv),
            LaunchMode::Attach => self.attach(ordinal, command, &argv, sink).await,
        }
    }

    fn detach(&self, ordinal: i64, mut command: Command, argv: &[String]) -> Result<(), LaunchError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group, so a Ctrl-C aimed at winela leaves the child alone.
        #[cfg(unix)]
        unsafe {
            command.pre_exec(|| {
                let _ = libc::setpgid(0, 0);
                Ok(())
            });
        }

        let child = command.spawn().map_err(|source| self.execution_error(source))?;
        log::info!(
            "launch {}: detached {} (pid {})",
            ordinal,
            format_command(argv),
            child.id().unwrap_or(0)
        );
        Ok(())
    }

    async fn attach(
        &self,
        ordinal: i64,
        mut command: Command,
        argv: &[String],
        sink: mpsc::UnboundedSender<OutputLine>,
    ) -> Result<(), LaunchError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| self.execution_error(source))?;
        log::debug!(
            "launch {}: started {} (pid {})",
            ordinal,
            format_command(argv),
            child.id().unwrap_or(0)
        );

        let mut drains = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            drains.push(tokio::spawn(drain_stream(StreamKind::Stdout, stdout, sink.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            drains.push(tokio::spawn(drain_stream(StreamKind::Stderr, stderr, sink)));
        }
        for drain in drains {
            if let Err(err) = drain.await {
                log::warn!("launch {}: output drain task failed: {}", ordinal, err);
            }
        }

        match child.try_wait() {
            Ok(Some(status)) => log::debug!("launch {}: drained, child exited {}", ordinal, status),
            Ok(None) => log::debug!("launch {}: drained, child still running", ordinal),
            Err(err) => log::debug!("launch {}: drained, child status unknown: {}", ordinal, err),
        }
        Ok(())
    }

    fn execution_error(&self, source: std::io::Error) -> LaunchError {
        LaunchError::Execution {
            program: self.config.program.clone(),
            source,
        }
    }
}

// Reads newline-separated lines until EOF. Lines are decoded lossily and a
// trailing carriage return is dropped.
async fn drain_stream<R>(stream: StreamKind, reader: R, sink: mpsc::UnboundedSender<OutputLine>)
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(reader).split(b'\n');
    let mut sink_open = true;
    loop {
        match segments.next_segment().await {
            Ok(Some(mut bytes)) => {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                if !sink_open {
                    continue;
                }
                let text = String::from_utf8_lossy(&bytes).into_owned();
                // Keep reading after the receiver is gone so the child never
                // blocks on a full pipe.
                if sink.send(OutputLine { stream, text }).is_err() {
                    sink_open = false;
                }
            }
            Ok(None) => break,
            Err(err) => {
                log::warn!("stream read error on {}: {}", stream.marker(), err);
                break;
            }
        }
    }
}
