//! Wraps one live viewer process.
//!
//! The supervisor's watcher task is the sole owner of a handle; nothing else
//! may signal or wait on the child.

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use smol::Timer;
use smol::process::Child;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;

/// How long a viewer gets to act on a cooperative cancel before SIGKILL.
pub const GRACE: Duration = Duration::from_secs(2);

pub struct ViewerHandle {
    child: Child,
    pid: Pid,
}

impl ViewerHandle {
    #[must_use]
    pub fn new(child: Child) -> Self {
        let pid = Pid::from_raw(child.id().try_into().expect("pid won't go that large"));
        Self { child, pid }
    }

    /// Waits for the viewer to exit on its own.
    ///
    /// # Errors
    /// Errors of the underlying wait are passed through.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.status().await
    }

    /// Asks the viewer to shut itself down.
    ///
    /// SIGTERM is catchable, so the viewer can release the display before
    /// exiting. Signalling an already-reaped process is not an error.
    pub fn request_cancel(&self) {
        match kill(self.pid, Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => (),
            Err(err) => log::warn!("failed to signal viewer {}: {err}", self.pid),
        }
    }

    /// Kills the viewer unconditionally.
    pub fn force_kill(&self) {
        match kill(self.pid, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => (),
            Err(err) => log::warn!("failed to kill viewer {}: {err}", self.pid),
        }
    }

    /// Drives the viewer to a confirmed death.
    ///
    /// Cooperative cancel first; escalates to SIGKILL once [`GRACE`] has
    /// elapsed. Returns only after the child has been reaped.
    pub async fn shutdown(&mut self) {
        self.request_cancel();
        let died = smol::future::race(
            async {
                let _ = self.child.status().await;
                true
            },
            async {
                Timer::after(GRACE).await;
                false
            },
        )
        .await;
        if !died {
            log::warn!("viewer {} ignored cancel, killing it", self.pid);
            self.force_kill();
            let _ = self.child.status().await;
        }
    }
}
