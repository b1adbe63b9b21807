//! Display jobs and their terminal outcomes.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// What kind of media a job carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("unknown media kind")]
pub struct UnknownKind;

impl FromStr for MediaKind {
    type Err = UnknownKind;
    fn from_str(value: &str) -> Result<Self, UnknownKind> {
        match value {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            _ => Err(UnknownKind),
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// One display request.
///
/// The media file belongs to the job alone; whoever terminates the job
/// deletes it.
#[derive(Debug, Clone)]
pub struct Job {
    pub kind: MediaKind,
    pub media_path: PathBuf,
    /// Image/Audio: hard upper bound on display time.
    /// Video: fallback bound in case the player hangs.
    pub duration: Duration,
}

impl Job {
    #[must_use]
    pub fn new(kind: MediaKind, media_path: PathBuf, duration: Duration) -> Self {
        Self {
            kind,
            media_path,
            duration,
        }
    }
}

/// How a job ended. Every accepted job resolves to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The viewer exited on its own with a zero status.
    Completed,
    /// A cancel request (or preemption by a newer job) closed the viewer.
    Cancelled,
    /// The display time elapsed and the supervisor closed the viewer.
    TimedOut,
    /// The player binary is not installed.
    PlayerMissing,
    /// The viewer gave up on the media file.
    MediaCorrupt,
    /// The viewer could not be launched at all.
    LaunchFailed,
}

impl Display for ExitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "media played to completion"),
            Self::Cancelled => write!(f, "display cancelled"),
            Self::TimedOut => write!(f, "display time elapsed"),
            Self::PlayerMissing => write!(f, "player binary is not installed"),
            Self::MediaCorrupt => write!(f, "media file could not be played"),
            Self::LaunchFailed => write!(f, "viewer failed to launch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_kinds() {
        assert_eq!("image".parse(), Ok(MediaKind::Image));
        assert_eq!("video".parse(), Ok(MediaKind::Video));
        assert_eq!("audio".parse(), Ok(MediaKind::Audio));
        assert_eq!("slideshow".parse::<MediaKind>(), Err(UnknownKind));
        assert_eq!("Image".parse::<MediaKind>(), Err(UnknownKind));
    }
}
