//! Child process execution with live output streaming.

use std::io::{self, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;

use crate::command::ToolCommand;
use crate::logging::RunLogger;
use crate::orchestrator::{StepError, StepResult};

use super::CommandExecutor;

/// Runs commands as real child processes.
///
/// `run` points stdout and stderr at one pipe, so the logger sees lines in
/// the order the child wrote them. `capture` keeps the streams apart: stdout
/// becomes the return value, stderr is logged.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn prepare(&self, command: &ToolCommand, logger: &RunLogger) -> Command {
        logger.command(&command.display());
        if logger.wants_command_json() {
            logger.log_args_json(&command.arg_strings());
        }
        logger.clear_tail();
        tracing::debug!("Running {}: {}", command.tool_name(), command.display());

        let mut cmd = command.to_command();
        cmd.stdin(Stdio::null())
            .env("LC_ALL", "C.UTF-8")
            .env("LANG", "C.UTF-8");
        cmd
    }

    fn run_merged(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<()> {
        let tool = command.tool_name();
        let mut cmd = self.prepare(command, logger);

        let (reader, writer) =
            io::pipe().map_err(|e| StepError::io_error(format!("creating pipe for {}", tool), e))?;
        let err_writer = writer
            .try_clone()
            .map_err(|e| StepError::io_error(format!("creating pipe for {}", tool), e))?;
        cmd.stdout(writer).stderr(err_writer);

        let mut child = spawn(&mut cmd, &tool)?;
        // The write ends live on in `cmd` until dropped; the reader needs EOF.
        drop(cmd);

        if let Err(err) = read_lines(reader, |line| logger.output_line(&line)) {
            logger.warn(&format!("{} output read error: {}", tool, err));
        }

        finish(&mut child, &tool, logger)
    }

    fn run_capturing(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<String> {
        let tool = command.tool_name();
        let mut cmd = self.prepare(command, logger);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = spawn(&mut cmd, &tool)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| not_piped(&tool, Stream::Stdout))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| not_piped(&tool, Stream::Stderr))?;

        let mut captured = Vec::new();
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            let stdout_tx = tx.clone();
            scope.spawn(move || forward(stdout, Stream::Stdout, stdout_tx));
            scope.spawn(move || forward(stderr, Stream::Stderr, tx));

            // Ends once both readers hit EOF and drop their senders
            for event in rx {
                match event {
                    StreamEvent::Line(Stream::Stdout, line) => {
                        logger.debug(&line);
                        captured.push(line);
                    }
                    StreamEvent::Line(Stream::Stderr, line) => logger.output_line(&line),
                    StreamEvent::ReadError(stream, err) => {
                        logger.warn(&format!("{} {} read error: {}", tool, stream.label(), err))
                    }
                }
            }
        });

        finish(&mut child, &tool, logger)?;
        Ok(captured.join("\n"))
    }
}

impl CommandExecutor for ProcessRunner {
    fn run(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<()> {
        self.run_merged(command, logger)
    }

    fn capture(&self, command: &ToolCommand, logger: &RunLogger) -> StepResult<String> {
        self.run_capturing(command, logger)
    }
}

fn spawn(cmd: &mut Command, tool: &str) -> StepResult<Child> {
    cmd.spawn()
        .map_err(|e| StepError::io_error(format!("spawning {}", tool), e))
}

/// Wait for the child and map a non-zero exit to `ExternalToolFailure`.
fn finish(child: &mut Child, tool: &str, logger: &RunLogger) -> StepResult<()> {
    let status = child
        .wait()
        .map_err(|e| StepError::io_error(format!("waiting for {}", tool), e))?;

    let exit_code = exit_code(status);
    if exit_code != 0 {
        logger.show_tail(tool);
        let last_line = logger.get_tail().pop().unwrap_or_default();
        return Err(StepError::tool_failed(tool, exit_code, last_line));
    }
    Ok(())
}

fn not_piped(tool: &str, stream: Stream) -> StepError {
    StepError::io_error(
        format!("capturing {} {}", tool, stream.label()),
        io::Error::other("stream was not piped"),
    )
}

/// Exit code, or -1 when terminated by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn label(&self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

enum StreamEvent {
    Line(Stream, String),
    ReadError(Stream, String),
}

/// Send every line of `reader` through `tx`, tagged with its stream.
fn forward<R: Read>(reader: R, stream: Stream, tx: mpsc::Sender<StreamEvent>) {
    let result = read_lines(reader, |line| {
        let _ = tx.send(StreamEvent::Line(stream, line));
    });
    if let Err(err) = result {
        let _ = tx.send(StreamEvent::ReadError(stream, err.to_string()));
    }
}

/// Read `reader` to EOF, calling `on_line` for each `\n`- or `\r`-terminated
/// line as soon as it is complete.
fn read_lines<R: Read>(reader: R, mut on_line: impl FnMut(String)) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = [0_u8; 4096];
    let mut splitter = LineSplitter::default();

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => splitter.push(&buf[..read]).into_iter().for_each(&mut on_line),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                if let Some(line) = splitter.finish() {
                    on_line(line);
                }
                return Err(err);
            }
        }
    }

    if let Some(line) = splitter.finish() {
        on_line(line);
    }
    Ok(())
}

/// Splits a byte stream on `\n` and `\r`, dropping empty lines.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    fn push(&mut self, data: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in data {
            if byte == b'\n' || byte == b'\r' {
                if let Some(line) = self.flush() {
                    lines.push(line);
                }
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        self.flush()
    }

    fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).to_string();
        self.pending.clear();
        Some(line)
    }
}
