//! Builds the viewer invocations for each media kind.
//!
//! Exit codes are the contract with the viewer processes; they are the only
//! channel a viewer has to report what went wrong:
//! video: 0 ok, 7 player missing, 8 playback error;
//! audio: 0 ok, 5 no audio backend, 6 file error.

use smol::process::{Command, Stdio};
use std::process::ExitStatus;

use crate::job::{ExitOutcome, Job, MediaKind};
use crate::player::Player;

pub struct FfPlayer {
    player: Option<String>,
    image_viewer: Option<String>,
}

impl FfPlayer {
    #[must_use]
    pub fn new(player: Option<String>, image_viewer: Option<String>) -> Self {
        Self {
            player,
            image_viewer,
        }
    }

    /// Program followed by its arguments.
    fn argv(&self, job: &Job) -> Vec<String> {
        let media = job.media_path.to_string_lossy().to_string();
        match job.kind {
            MediaKind::Image => vec![
                self.image_viewer.as_deref().unwrap_or("splash-view").to_string(),
                media,
                job.duration.as_secs().to_string(),
            ],
            MediaKind::Video => vec![
                self.player.as_deref().unwrap_or("ffplay").to_string(),
                String::from("-fs"),
                String::from("-autoexit"),
                String::from("-v"),
                String::from("quiet"),
                media,
            ],
            MediaKind::Audio => vec![
                self.player.as_deref().unwrap_or("ffplay").to_string(),
                String::from("-nodisp"),
                String::from("-autoexit"),
                String::from("-v"),
                String::from("quiet"),
                media,
            ],
        }
    }
}

impl Player for FfPlayer {
    fn command(&self, job: &Job) -> Command {
        let argv = self.argv(job);
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]);
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        cmd
    }
}

/// Maps a viewer's exit status to an outcome.
#[must_use]
pub fn classify_exit(kind: MediaKind, status: ExitStatus) -> ExitOutcome {
    let Some(code) = status.code() else {
        // Killed by a signal the supervisor did not send
        return ExitOutcome::Cancelled;
    };
    match (kind, code) {
        (_, 0) => ExitOutcome::Completed,
        (MediaKind::Video, 7) | (MediaKind::Audio, 5) => ExitOutcome::PlayerMissing,
        _ => ExitOutcome::MediaCorrupt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::path::PathBuf;
    use std::time::Duration;

    fn job(kind: MediaKind) -> Job {
        Job::new(kind, PathBuf::from("/tmp/media.bin"), Duration::from_secs(15))
    }

    fn exit_code(code: i32) -> ExitStatus {
        ExitStatus::from_raw(code << 8)
    }

    #[test]
    fn getting_argv() {
        let ffplay = FfPlayer::new(None, None);
        assert_eq!(
            ffplay.argv(&job(MediaKind::Image)),
            vec!["splash-view", "/tmp/media.bin", "15"]
        );
        assert_eq!(
            ffplay.argv(&job(MediaKind::Video)),
            vec!["ffplay", "-fs", "-autoexit", "-v", "quiet", "/tmp/media.bin"]
        );
        assert_eq!(
            ffplay.argv(&job(MediaKind::Audio)),
            vec!["ffplay", "-nodisp", "-autoexit", "-v", "quiet", "/tmp/media.bin"]
        );
    }

    #[test]
    fn overriding_binaries() {
        let ffplay = FfPlayer::new(
            Some(String::from("/opt/ffmpeg/bin/ffplay")),
            Some(String::from("/usr/local/bin/imgview")),
        );
        assert_eq!(ffplay.argv(&job(MediaKind::Video))[0], "/opt/ffmpeg/bin/ffplay");
        assert_eq!(ffplay.argv(&job(MediaKind::Image))[0], "/usr/local/bin/imgview");
    }

    #[test]
    fn classifying_exits() {
        assert_eq!(
            classify_exit(MediaKind::Video, exit_code(0)),
            ExitOutcome::Completed
        );
        assert_eq!(
            classify_exit(MediaKind::Video, exit_code(7)),
            ExitOutcome::PlayerMissing
        );
        assert_eq!(
            classify_exit(MediaKind::Video, exit_code(8)),
            ExitOutcome::MediaCorrupt
        );
        assert_eq!(
            classify_exit(MediaKind::Audio, exit_code(5)),
            ExitOutcome::PlayerMissing
        );
        assert_eq!(
            classify_exit(MediaKind::Audio, exit_code(6)),
            ExitOutcome::MediaCorrupt
        );
        assert_eq!(
            classify_exit(MediaKind::Image, exit_code(3)),
            ExitOutcome::MediaCorrupt
        );
        // Torn down by an outside signal
        assert_eq!(
            classify_exit(MediaKind::Image, ExitStatus::from_raw(9)),
            ExitOutcome::Cancelled
        );
    }
}
