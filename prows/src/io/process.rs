//! Helpers for running child processes: timed probes, pass-through runs, and
//! stdout tee-ing.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Exit code to report for a finished child.
///
/// Signal deaths map to `128 + signal` on Unix, as a shell would report them.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Run a command with all stdio discarded, killing it after `timeout`.
///
/// Returns `None` when the command timed out.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs()))]
pub fn run_probe(mut cmd: Command, timeout: Duration) -> Result<Option<ExitStatus>> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    debug!("spawning probe");
    let mut child = cmd.spawn().context("spawn probe")?;
    match child.wait_timeout(timeout).context("wait for probe")? {
        Some(status) => {
            debug!(exit_code = ?status.code(), "probe finished");
            Ok(Some(status))
        }
        None => {
            debug!(timeout_secs = timeout.as_secs(), "probe timed out, killing");
            child.kill().context("kill probe")?;
            child.wait().context("wait probe after kill")?;
            Ok(None)
        }
    }
}

/// Run a command to completion, forwarding its stdout and stderr to our stderr.
///
/// Our own stdout is kept for the command's result (e.g. the bundle path).
#[instrument(skip_all)]
pub fn run_passthrough(mut cmd: Command) -> Result<ExitStatus> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::from(io::stderr()))
        .stderr(Stdio::inherit());

    debug!("spawning child process");
    let status = match cmd.status() {
        Ok(status) => status,
        Err(e) => {
            debug!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };
    debug!(exit_code = ?status.code(), "command finished");
    Ok(status)
}

/// Run a command with `stdin_path` as its stdin, duplicating stdout to both
/// the terminal and `tee_path`. Stderr is inherited.
///
/// `tee_path` is truncated only once the child has spawned, so a command that
/// cannot start leaves the previous output in place.
#[instrument(skip_all, fields(stdin = %stdin_path.display(), tee = %tee_path.display()))]
pub fn run_with_tee(mut cmd: Command, stdin_path: &Path, tee_path: &Path) -> Result<ExitStatus> {
    let input =
        File::open(stdin_path).with_context(|| format!("open {}", stdin_path.display()))?;

    cmd.stdin(Stdio::from(input))
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            debug!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let output = match File::create(tee_path) {
        Ok(file) => file,
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e).with_context(|| format!("create {}", tee_path.display()));
        }
    };

    let stdout = child
        .stdout
        .take()
        .context("child stdout was not piped")?;

    // Stdin is a file and stderr is inherited, so draining stdout here cannot deadlock.
    let copied = tee_stream(stdout, io::stdout(), BufWriter::new(output));
    let status = child.wait().context("wait for command")?;
    let bytes = copied.with_context(|| format!("tee output to {}", tee_path.display()))?;

    debug!(exit_code = ?status.code(), bytes, "command finished");
    Ok(status)
}

/// Copy `reader` into both sinks until EOF, returning the byte count.
///
/// The terminal sink is flushed after every chunk. If it goes away (e.g. a
/// closed pipe), copying continues into the file sink alone.
fn tee_stream<R: Read, T: Write, F: Write>(
    mut reader: R,
    mut terminal: T,
    mut file: F,
) -> Result<u64> {
    let mut chunk = [0u8; 8192];
    let mut total = 0u64;
    let mut terminal_open = true;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("read child stdout"),
        };
        file.write_all(&chunk[..n]).context("write output file")?;
        if terminal_open
            && let Err(e) = terminal
                .write_all(&chunk[..n])
                .and_then(|()| terminal.flush())
        {
            warn!(err = %e, "terminal closed, continuing with output file only");
            terminal_open = false;
        }
        total += n as u64;
    }

    file.flush().context("flush output file")?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tee_writes_identical_bytes_to_both_sinks() {
        let payload = b"3\n1 2 3\n".repeat(5000);
        let mut terminal = Vec::new();
        let mut file = Vec::new();

        let n = tee_stream(Cursor::new(payload.clone()), &mut terminal, &mut file).expect("tee");
        assert_eq!(n, payload.len() as u64);
        assert_eq!(terminal, payload);
        assert_eq!(file, payload);
    }

    #[test]
    fn tee_keeps_output_without_trailing_newline() {
        let mut terminal = Vec::new();
        let mut file = Vec::new();

        tee_stream(Cursor::new(b"42".to_vec()), &mut terminal, &mut file).expect("tee");
        assert_eq!(file, b"42");
    }

    #[test]
    fn tee_survives_closed_terminal() {
        let mut file = Vec::new();

        tee_stream(Cursor::new(b"a\nb\n".to_vec()), ClosedPipe, &mut file).expect("tee");
        assert_eq!(file, b"a\nb\n");
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_passes_through_status() {
        let status = Command::new("sh")
            .args(["-c", "exit 5"])
            .status()
            .expect("run sh");
        assert_eq!(exit_code(status), 5);
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_maps_signals() {
        let status = Command::new("sh")
            .args(["-c", "kill -TERM $$"])
            .status()
            .expect("run sh");
        assert_eq!(exit_code(status), 128 + 15);
    }

    #[cfg(unix)]
    #[test]
    fn probe_times_out() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let status = run_probe(cmd, Duration::from_millis(100)).expect("probe");
        assert!(status.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn tee_run_feeds_stdin_and_writes_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = temp.path().join("input.txt");
        let output = temp.path().join("output.txt");
        std::fs::write(&input, "3\n1 2 3\n").expect("write input");
        std::fs::write(&output, "stale contents that must disappear\n").expect("write output");

        let status = run_with_tee(Command::new("cat"), &input, &output).expect("run");
        assert!(status.success());
        assert_eq!(std::fs::read_to_string(&output).expect("read"), "3\n1 2 3\n");
    }

    #[test]
    fn tee_run_that_cannot_spawn_keeps_previous_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = temp.path().join("input.txt");
        let output = temp.path().join("output.txt");
        std::fs::write(&input, "1\n").expect("write input");
        std::fs::write(&output, "previous good output\n").expect("write output");

        let cmd = Command::new(temp.path().join("no-such-python"));
        let err = run_with_tee(cmd, &input, &output).unwrap_err();
        assert!(format!("{err:#}").contains("spawn command"));
        assert_eq!(
            std::fs::read_to_string(&output).expect("read"),
            "previous good output\n"
        );
    }
}
