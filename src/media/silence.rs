//! Scoped redirection of the process stdout/stderr to the null device

use nix::fcntl::{OFlag, open};
use nix::libc::{STDERR_FILENO, STDOUT_FILENO};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup, dup2};
use std::io::Write;
use std::os::fd::RawFd;

/// Silences stdout and stderr until dropped
///
/// Both descriptors are restored on drop, so every exit path of the guarded
/// scope (including `?` and panics) gets the original streams back. Guards
/// must not be nested or held from several threads at once.
pub struct StdioSilencer {
    saved_stdout: RawFd,
    saved_stderr: RawFd,
}

impl StdioSilencer {
    pub fn acquire() -> nix::Result<Self> {
        flush_std();

        let saved_stdout = dup(STDOUT_FILENO)?;
        let saved_stderr = match dup(STDERR_FILENO) {
            Ok(fd) => fd,
            Err(e) => {
                let _ = close(saved_stdout);
                return Err(e);
            }
        };
        let guard = Self {
            saved_stdout,
            saved_stderr,
        };

        // From here on the guard owns the saved descriptors; an early return
        // restores whatever was already redirected.
        let null = open("/dev/null", OFlag::O_WRONLY, Mode::empty())?;
        let redirected = dup2(null, STDOUT_FILENO).and_then(|_| dup2(null, STDERR_FILENO));
        let _ = close(null);
        redirected?;

        Ok(guard)
    }
}

impl Drop for StdioSilencer {
    fn drop(&mut self) {
        flush_std();
        let _ = dup2(self.saved_stdout, STDOUT_FILENO);
        let _ = dup2(self.saved_stderr, STDERR_FILENO);
        let _ = close(self.saved_stdout);
        let _ = close(self.saved_stderr);
    }
}

fn flush_std() {
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
}
