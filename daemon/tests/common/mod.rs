//! Shared fixtures for supervisor integration tests.

use smol::process::{Command, Stdio};
use splashd::job::{Job, MediaKind};
use splashd::player::Player;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

pub fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A player that runs a shell snippet instead of a real viewer.
///
/// The snippet sees the job's media path as `$MEDIA`.
pub struct ScriptPlayer {
    pub script: &'static str,
}

impl Player for ScriptPlayer {
    fn command(&self, job: &Job) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(self.script)
            .env("MEDIA", &job.media_path);
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

/// A player whose binary does not exist, for the spawn-failure paths.
pub struct MissingPlayer;

impl Player for MissingPlayer {
    fn command(&self, _job: &Job) -> Command {
        Command::new("/nonexistent/splashd-viewer")
    }
}

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Creates a throwaway media file and returns its path.
pub fn temp_media(tag: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "splashd-test-{tag}-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::write(&path, b"media").expect("cannot create temp media");
    path
}

pub fn job(kind: MediaKind, media_path: PathBuf, secs: u64) -> Job {
    Job::new(kind, media_path, Duration::from_secs(secs))
}
