//! External source formatter.
//!
//! Formatting is best effort: callers fall back to the unformatted text on
//! any [`FormatError`].

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, sleep};
use std::time::{Duration, Instant};

use resync_core::FormatterConfig;

use crate::error::FormatError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub trait Formatter {
    /// Format `source`, the full contents of `path`.
    fn format(&self, path: &Path, source: &str) -> Result<String, FormatError>;
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, _path: &Path, source: &str) -> Result<String, FormatError> {
        Ok(source.to_string())
    }
}

/// Runs a command with the source on stdin and reads the result from
/// stdout. `{dir}` in the arguments is replaced by the working directory.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    command: Vec<String>,
    dir: PathBuf,
    timeout: Duration,
}

impl CommandFormatter {
    pub fn new(command: Vec<String>, dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        CommandFormatter {
            command,
            dir: dir.into(),
            timeout,
        }
    }

    pub fn from_config(config: &FormatterConfig, dir: &Path) -> Self {
        CommandFormatter::new(config.command.clone(), dir, config.timeout())
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, path: &Path, source: &str) -> Result<String, FormatError> {
        let (program, args) = self.command.split_first().ok_or(FormatError::EmptyCommand)?;
        let dir = self.dir.to_string_lossy();
        let mut cmd = Command::new(program);
        cmd.args(args.iter().map(|a| a.replace("{dir}", &dir)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if self.dir.is_dir() {
            cmd.current_dir(&self.dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own group, so a timeout also reaches processes the formatter forks.
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|e| FormatError::Spawn {
            program: program.clone(),
            source: e,
        })?;
        tracing::debug!("formatting {} with {program}", path.display());

        // The child may fill stdout before it has read all of stdin.
        let stdin = child.stdin.take();
        let input = source.to_string();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });
        let stdout = child.stdout.take();
        let out_reader = thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            if let Some(mut stdout) = stdout {
                stdout.read_to_end(&mut buf)?;
            }
            Ok(buf)
        });
        let stderr = child.stderr.take();
        let err_reader = thread::spawn(move || -> Vec<u8> {
            let mut buf = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_end(&mut buf);
            }
            buf
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                terminate(&mut child);
                let _ = writer.join();
                let _ = out_reader.join();
                let _ = err_reader.join();
                tracing::warn!("{program} timed out after {:?}", self.timeout);
                return Err(FormatError::TimedOut {
                    timeout: self.timeout,
                });
            }
            sleep(POLL_INTERVAL);
        };

        // EPIPE here means the child exited without reading its input.
        let _ = writer.join();
        let stdout = out_reader.join().map_err(|_| {
            FormatError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "stdout reader panicked",
            ))
        })??;
        let stderr = err_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(FormatError::Failed {
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        String::from_utf8(stdout).map_err(|_| FormatError::NotUtf8)
    }
}

/// Kill the child and reap it. On unix the whole process group goes, so no
/// descendant keeps the output pipes open.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        let _ = Command::new("sh")
            .arg("-c")
            .arg(format!("kill -KILL -{}", child.id()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> CommandFormatter {
        CommandFormatter::new(
            vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            std::env::temp_dir(),
            timeout,
        )
    }

    #[test]
    fn noop_returns_input() {
        let out = NoopFormatter.format(Path::new("a.go"), "package a\n").unwrap();
        assert_eq!(out, "package a\n");
    }

    #[test]
    #[cfg(unix)]
    fn pipes_source_through_command() {
        let fmt = sh("tr a-z A-Z", Duration::from_secs(5));
        let out = fmt.format(Path::new("a.go"), "package a\n").unwrap();
        assert_eq!(out, "PACKAGE A\n");
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_failed_with_stderr() {
        let fmt = sh("echo boom >&2; exit 3", Duration::from_secs(5));
        let err = fmt.format(Path::new("a.go"), "x").unwrap_err();
        match err {
            FormatError::Failed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn slow_formatter_times_out() {
        let fmt = sh("sleep 5", Duration::from_millis(200));
        let started = Instant::now();
        let err = fmt.format(Path::new("a.go"), "x").unwrap_err();
        assert!(matches!(err, FormatError::TimedOut { .. }), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    #[cfg(unix)]
    fn timeout_reaps_background_children_holding_stdout() {
        let fmt = sh("sleep 5 & sleep 5", Duration::from_millis(200));
        let started = Instant::now();
        let err = fmt.format(Path::new("a.go"), "x").unwrap_err();
        assert!(matches!(err, FormatError::TimedOut { .. }), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let fmt = CommandFormatter::new(
            vec!["resync-no-such-formatter".to_string()],
            ".",
            Duration::from_secs(1),
        );
        let err = fmt.format(Path::new("a.go"), "x").unwrap_err();
        assert!(matches!(err, FormatError::Spawn { .. }));
    }

    #[test]
    fn empty_command_is_rejected() {
        let fmt = CommandFormatter::new(vec![], ".", Duration::from_secs(1));
        assert!(matches!(
            fmt.format(Path::new("a.go"), "x"),
            Err(FormatError::EmptyCommand)
        ));
    }

    #[test]
    #[cfg(unix)]
    fn dir_placeholder_is_substituted() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fmt = CommandFormatter::new(
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "cat >/dev/null; printf %s \"$0\"".to_string(),
                "{dir}".to_string(),
            ],
            tmp.path(),
            Duration::from_secs(5),
        );
        let out = fmt.format(Path::new("a.go"), "x").unwrap();
        assert_eq!(out, tmp.path().to_string_lossy());
    }
}
