use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is checked for exit.
const POLL_STEP: Duration = Duration::from_millis(10);

/// Error type for bounded external process runs
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("io error talking to {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
}

/// Captured output of a successful run
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// A single external invocation.
#[derive(Debug, Clone)]
pub struct ProcessSpec<'a> {
    pub program: &'a str,
    pub args: Vec<String>,
    pub envs: Vec<(&'a str, String)>,
    pub cwd: Option<&'a Path>,
    pub timeout: Duration,
}

impl<'a> ProcessSpec<'a> {
    pub fn new(program: &'a str, timeout: Duration) -> Self {
        ProcessSpec {
            program,
            args: Vec::new(),
            envs: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Run a process to completion, killing it when `timeout` elapses.
/// A non-zero exit is reported as `ProcessError::Failed` with stderr.
pub fn run(spec: &ProcessSpec<'_>) -> Result<ProcessOutput, ProcessError> {
    let started = Instant::now();
    let program = spec.program.to_string();
    let mut cmd = Command::new(spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (k, v) in &spec.envs {
        cmd.env(k, v);
    }
    if let Some(dir) = spec.cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let deadline = started + spec.timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program = %program, args = ?spec.args, "process timed out");
                return Err(ProcessError::Timeout {
                    program,
                    timeout: spec.timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_STEP),
            Err(source) => return Err(ProcessError::Io { program, source }),
        }
    };

    let stdout = stdout_reader.map(join_reader).unwrap_or_default();
    let stderr = stderr_reader.map(join_reader).unwrap_or_default();
    tracing::debug!(
        program = %program,
        args = ?spec.args,
        elapsed_ms = started.elapsed().as_millis() as u64,
        success = status.success(),
        "process finished"
    );

    if !status.success() {
        return Err(ProcessError::Failed {
            program,
            status,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }
    Ok(ProcessOutput { stdout, stderr })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let spec = ProcessSpec::new("sh", Duration::from_secs(5)).args(["-c", "printf hello"]);
        let out = run(&spec).unwrap();
        assert_eq!(out.stdout_text(), "hello");
    }

    #[test]
    fn stdin_is_closed_so_readers_do_not_hang() {
        let spec = ProcessSpec::new("cat", Duration::from_secs(5));
        let out = run(&spec).unwrap();
        assert_eq!(out.stdout_text(), "");
    }

    #[test]
    fn non_zero_exit_reports_stderr() {
        let spec = ProcessSpec::new("sh", Duration::from_secs(5))
            .args(["-c", "echo broken >&2; exit 3"]);
        match run(&spec) {
            Err(ProcessError::Failed { stderr, .. }) => assert_eq!(stderr, "broken"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn slow_process_times_out() {
        let spec = ProcessSpec::new("sleep", Duration::from_millis(100)).args(["5"]);
        let started = Instant::now();
        assert!(matches!(run(&spec), Err(ProcessError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let spec = ProcessSpec::new("definitely-not-a-real-binary-xyz", Duration::from_secs(1));
        assert!(matches!(run(&spec), Err(ProcessError::Spawn { .. })));
    }
}
