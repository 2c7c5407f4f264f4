//! External command execution with a hard timeout

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured result of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to launch {program}: {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} did not finish within {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Runs OS utilities on behalf of the search backends
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], timeout: Duration)
        -> Result<CommandOutput, CommandError>;
}

/// Spawns real processes with a fixed argument vector; nothing goes through a shell
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        log::debug!("running {} {:?} (timeout {}s)", program, args, timeout.as_secs());

        let mut child = command.spawn().map_err(|source| CommandError::LaunchFailed {
            program: program.to_string(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_deadline(&mut child, program, timeout)?;

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout: join_output(stdout),
            stderr: join_output(stderr),
        })
    }
}

fn wait_with_deadline(
    child: &mut Child,
    program: &str,
    timeout: Duration,
) -> Result<std::process::ExitStatus, CommandError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::TimedOut {
                    program: program.to_string(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(CommandError::Wait {
                    program: program.to_string(),
                    source,
                });
            }
        }
    }
}

/// Reads a pipe to the end on a helper thread so a chatty child never blocks on a full pipe
fn drain<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_output(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Escapes a value for interpolation inside a double-quoted PowerShell string.
///
/// Backtick goes first since it is the escape character itself.
#[allow(dead_code)]
pub fn escape_powershell(value: &str) -> String {
    value
        .replace('`', "``")
        .replace('"', "`\"")
        .replace('$', "`$")
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Replays canned results and records every invocation
    pub struct FakeRunner {
        reply: RefCell<Option<Result<CommandOutput, CommandError>>>,
        pub calls: RefCell<Vec<(String, Vec<String>, Duration)>>,
    }

    impl FakeRunner {
        pub fn replying(exit_code: i32, stdout: &str) -> Self {
            Self::with(Ok(CommandOutput {
                exit_code: Some(exit_code),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }))
        }

        pub fn failing(error: CommandError) -> Self {
            Self::with(Err(error))
        }

        fn with(reply: Result<CommandOutput, CommandError>) -> Self {
            FakeRunner {
                reply: RefCell::new(Some(reply)),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &self,
            program: &str,
            args: &[&str],
            timeout: Duration,
        ) -> Result<CommandOutput, CommandError> {
            self.calls.borrow_mut().push((
                program.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
                timeout,
            ));
            self.reply
                .borrow_mut()
                .take()
                .unwrap_or_else(|| Ok(CommandOutput::default()))
        }
    }
}
