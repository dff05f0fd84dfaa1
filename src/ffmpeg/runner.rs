use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::SigId;
use tracing::{debug, warn};

use crate::error::{HvecError, Result};
use super::command::CommandSpec;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A signal we watch while the child runs, and whether it has been passed on.
struct Watched {
    signal: i32,
    received: Arc<AtomicBool>,
    forwarded: bool,
}

impl Watched {
    fn received(&self) -> bool {
        self.received.load(Ordering::Relaxed)
    }
}

/// Run `spec` with `executable` in place of its program name. The child shares
/// our stdin/stdout/stderr, so its progress shows up live.
///
/// SIGINT and SIGTERM received by the wrapper are passed on to ffmpeg once each,
/// so ffmpeg finalizes the output and exits whether the signal came from the
/// terminal's process group or was aimed at the wrapper alone.
pub fn run(spec: &CommandSpec, executable: &Path) -> Result<()> {
    let (mut watched, handlers) = watch_signals();

    debug!("spawning {} as {:?} with {} arguments", spec.program(), executable, spec.args().len());
    let result = Command::new(executable)
        .args(spec.args())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .and_then(|mut child| wait_forwarding(&mut child, &mut watched));

    for id in handlers {
        signal_hook::low_level::unregister(id);
    }

    let status = result.map_err(|err| spawn_error(executable, err))?;
    let interrupted = watched.iter().any(Watched::received);
    outcome(status, interrupted, spec.target().unwrap_or_default())
}

fn watch_signals() -> (Vec<Watched>, Vec<SigId>) {
    let mut watched = vec![];
    let mut ids = vec![];
    for signal in [SIGINT, SIGTERM] {
        let received = Arc::new(AtomicBool::new(false));
        match signal_hook::flag::register(signal, Arc::clone(&received)) {
            Ok(id) => ids.push(id),
            Err(err) => warn!("unable to watch signal {}: {}", signal, err),
        }
        watched.push(Watched { signal, received, forwarded: false });
    }
    (watched, ids)
}

fn wait_forwarding(child: &mut Child, watched: &mut [Watched]) -> io::Result<ExitStatus> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        for entry in watched.iter_mut().filter(|w| w.received() && !w.forwarded) {
            debug!("passing signal {} on to pid {}", entry.signal, child.id());
            if let Err(err) = forward(child, entry.signal) {
                warn!("unable to pass signal {} on to ffmpeg: {}", entry.signal, err);
            }
            entry.forwarded = true;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn forward(child: &mut Child, signal: i32) -> io::Result<()> {
    let pid = child.id() as libc::pid_t;
    // SAFETY: kill(2) has no memory-safety preconditions; the pid is our own unreaped child.
    match unsafe { libc::kill(pid, signal) } {
        0 => Ok(()),
        _ => Err(io::Error::last_os_error()),
    }
}

#[cfg(not(unix))]
fn forward(child: &mut Child, _signal: i32) -> io::Result<()> {
    child.kill()
}

/// A child that exits cleanly wins over any signal we saw while it ran.
fn outcome(status: ExitStatus, interrupted: bool, output: &str) -> Result<()> {
    if interrupted && !status.success() {
        return Err(HvecError::Interrupted { output: output.to_string() });
    }
    check_status(status)
}

fn spawn_error(executable: &Path, err: io::Error) -> HvecError {
    debug!("unable to run {:?}: {}", executable, err);
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => HvecError::EncodeToolMissing {
            tool: executable.display().to_string(),
        },
        _ => HvecError::Io(err),
    }
}

fn check_status(status: ExitStatus) -> Result<()> {
    match status.success() {
        true => Ok(()),
        false => match status.code() {
            Some(code) => Err(HvecError::EncodeFailed { code }),
            None => Err(HvecError::EncodeTerminated),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use crate::ffmpeg::command::build;
    use crate::transcode_request::TranscodeRequest;

    fn spec() -> CommandSpec {
        build(&TranscodeRequest::new(PathBuf::from("in.mp4")).output(Some(PathBuf::from("out.mkv")))).unwrap()
    }

    #[test]
    fn test_missing_executable() {
        let err = run(&spec(), Path::new("/nonexistent/bin/ffmpeg")).unwrap_err();
        assert!(matches!(err, HvecError::EncodeToolMissing { ref tool } if tool == "/nonexistent/bin/ffmpeg"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_mapping() {
        // `true` and `false` ignore the ffmpeg arguments
        assert!(run(&spec(), Path::new("true")).is_ok());
        assert!(matches!(run(&spec(), Path::new("false")), Err(HvecError::EncodeFailed { code: 1 })));
    }

    #[cfg(unix)]
    #[test]
    fn test_terminated_by_signal() {
        use std::os::unix::process::ExitStatusExt;
        assert!(matches!(check_status(ExitStatus::from_raw(9)), Err(HvecError::EncodeTerminated)));
        assert!(matches!(check_status(ExitStatus::from_raw(3 << 8)), Err(HvecError::EncodeFailed { code: 3 })));
    }

    #[cfg(unix)]
    #[test]
    fn test_interrupted_only_when_child_failed() {
        use std::os::unix::process::ExitStatusExt;
        assert!(outcome(ExitStatus::from_raw(0), true, "out.mkv").is_ok());
        assert!(matches!(
            outcome(ExitStatus::from_raw(15), true, "out.mkv"),
            Err(HvecError::Interrupted { ref output }) if output == "out.mkv"));
        assert!(matches!(
            outcome(ExitStatus::from_raw(255 << 8), true, "out.mkv"),
            Err(HvecError::Interrupted { .. })));
        assert!(matches!(outcome(ExitStatus::from_raw(15), false, "out.mkv"), Err(HvecError::EncodeTerminated)));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_forwarded_to_child() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let received = Arc::new(AtomicBool::new(true));
        let mut watched = [Watched { signal: SIGTERM, received, forwarded: false }];
        let status = wait_forwarding(&mut child, &mut watched).unwrap();
        assert!(watched[0].forwarded);
        assert!(!status.success());
        assert_eq!(status.code(), None);
    }
}
