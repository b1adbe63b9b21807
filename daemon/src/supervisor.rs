//! Owns the lifecycle of at most one display job.
//!
//! Working cycle of the supervisor:
//! 1. `start` drives whatever viewer is still alive through its termination
//!    sequence, then spawns the new child.
//! 2. A watcher task races the natural exit, the duration deadline and the
//!    cancel channel; whichever resolves first decides the [`ExitOutcome`].
//! 3. The watcher reaps the child, deletes the media file and marks the
//!    slot finished, no matter how the race went.
//!
//! All transitions serialize through one lock; the watcher never takes that
//! lock, so preempting under it cannot deadlock.

use smol::Task;
use smol::Timer;
use smol::channel::{Receiver, Sender};
use smol::lock::Mutex;
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::job::{ExitOutcome, Job, MediaKind};
use crate::player::{self, Player};
use crate::viewer::ViewerHandle;

pub struct Supervisor<P: Player> {
    player: P,
    state: Mutex<State>,
}

struct State {
    active: Option<ActiveViewer>,
}

/// The record of the job currently on screen.
struct ActiveViewer {
    kind: MediaKind,
    started_at: Instant,
    duration: Duration,
    cancel_tx: Sender<()>,
    /// Set by the watcher once the child is dead and the media file gone.
    finished: Arc<AtomicBool>,
    watcher: Task<ExitOutcome>,
}

/// Read-only picture of the supervisor for status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSnapshot {
    Idle,
    Showing {
        kind: MediaKind,
        elapsed: Duration,
        remaining: Duration,
    },
}

impl<P: Player> Supervisor<P> {
    #[must_use]
    pub fn new(player: P) -> Self {
        Self {
            player,
            state: Mutex::new(State { active: None }),
        }
    }

    /// Starts a display job, preempting any job still on screen.
    ///
    /// On success the returned channel yields the job's terminal outcome
    /// once it resolves. The media file is deleted when the job ends, on
    /// every path.
    ///
    /// # Errors
    /// [`ExitOutcome::PlayerMissing`] when the player binary cannot be
    /// found, [`ExitOutcome::LaunchFailed`] for any other spawn failure.
    /// The media file is deleted before returning.
    pub async fn start(&self, job: Job) -> Result<Receiver<ExitOutcome>, ExitOutcome> {
        let mut state = self.state.lock().await;
        Self::terminate_active(&mut state).await;

        let mut cmd = self.player.command(&job);
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                let outcome = if err.kind() == io::ErrorKind::NotFound {
                    ExitOutcome::PlayerMissing
                } else {
                    ExitOutcome::LaunchFailed
                };
                log::error!(
                    "cannot spawn viewer for {}: {err}",
                    job.media_path.to_string_lossy()
                );
                discard_media(&job.media_path);
                return Err(outcome);
            }
        };
        log::info!(
            "viewer up: {} {} for {}s",
            job.kind,
            job.media_path.to_string_lossy(),
            job.duration.as_secs()
        );

        let (cancel_tx, cancel_rx) = smol::channel::bounded(1);
        let (outcome_tx, outcome_rx) = smol::channel::bounded(1);
        let finished = Arc::new(AtomicBool::new(false));
        let kind = job.kind;
        let duration = job.duration;
        let watcher = smol::spawn(watch(
            ViewerHandle::new(child),
            job,
            cancel_rx,
            outcome_tx,
            finished.clone(),
        ));
        state.active = Some(ActiveViewer {
            kind,
            started_at: Instant::now(),
            duration,
            cancel_tx,
            finished,
            watcher,
        });
        Ok(outcome_rx)
    }

    /// Closes the current job, if any. Cancelling an idle supervisor is a
    /// no-op, not an error.
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        Self::terminate_active(&mut state).await;
    }

    /// Reports what is on screen right now.
    ///
    /// Reads supervisor-held state only; never waits on the child itself.
    pub async fn status(&self) -> StatusSnapshot {
        let state = self.state.lock().await;
        match &state.active {
            Some(active) if !active.finished.load(Ordering::Acquire) => {
                let elapsed = active.started_at.elapsed();
                StatusSnapshot::Showing {
                    kind: active.kind,
                    elapsed,
                    remaining: active.duration.saturating_sub(elapsed),
                }
            }
            _ => StatusSnapshot::Idle,
        }
    }

    /// Drives the active job, if any, to a confirmed end and waits for its
    /// watcher to finish cleanup.
    async fn terminate_active(state: &mut State) {
        if let Some(active) = state.active.take() {
            // No-op if the watcher already resolved; awaiting then only reaps
            let _ = active.cancel_tx.try_send(());
            active.watcher.await;
        }
    }
}

/// What ended the race for a running viewer.
enum WatchEvent {
    Exited(io::Result<ExitStatus>),
    Deadline,
    Cancelled,
}

/// The dedicated waiter for one viewer process.
///
/// Owns the child from spawn to reap so the supervisor's control path never
/// blocks on it.
async fn watch(
    mut viewer: ViewerHandle,
    job: Job,
    cancel_rx: Receiver<()>,
    outcome_tx: Sender<ExitOutcome>,
    finished: Arc<AtomicBool>,
) -> ExitOutcome {
    let event = smol::future::race(
        smol::future::race(
            async { WatchEvent::Exited(viewer.wait().await) },
            async {
                Timer::after(job.duration).await;
                WatchEvent::Deadline
            },
        ),
        async {
            let _ = cancel_rx.recv().await;
            WatchEvent::Cancelled
        },
    )
    .await;

    let outcome = match event {
        WatchEvent::Exited(Ok(status)) => player::classify_exit(job.kind, status),
        WatchEvent::Exited(Err(err)) => {
            log::warn!("lost track of viewer: {err}");
            ExitOutcome::LaunchFailed
        }
        WatchEvent::Deadline => {
            viewer.shutdown().await;
            ExitOutcome::TimedOut
        }
        WatchEvent::Cancelled => {
            viewer.shutdown().await;
            ExitOutcome::Cancelled
        }
    };

    log::info!("viewer ended: {outcome}");
    discard_media(&job.media_path);
    finished.store(true, Ordering::Release);
    let _ = outcome_tx.try_send(outcome);
    outcome
}

/// Temp media belongs to its job; it must not outlive it.
fn discard_media(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            log::warn!("failed to remove {}: {err}", path.to_string_lossy());
        }
    }
}
