//! Handles the control socket and the daemon command language.
//!
//! One request line per connection, read to EOF; the daemon writes one
//! human-readable reply line back. `splashctl` is the usual client, but
//! anything that can write to a unix socket works.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::space1;
use nom::combinator::{map, map_res};
use nom::{IResult, Parser};

use smol::Timer;
use smol::io::{AsyncReadExt, AsyncWriteExt};
use smol::net::unix::UnixListener;
use smol::stream::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::daemon::CFG;
use crate::job::{ExitOutcome, Job, MediaKind};
use crate::player::Player;
use crate::supervisor::{StatusSnapshot, Supervisor};

/// Display time bounds enforced before a job ever reaches the supervisor.
const MIN_DURATION: Duration = Duration::from_secs(1);
const MAX_DURATION: Duration = Duration::from_secs(3600);

/// How long a freshly started viewer gets to fail fast before the reply
/// claims success.
const EARLY_EXIT_WINDOW: Duration = Duration::from_millis(350);

/// Possible daemon commands.
#[derive(Debug, PartialEq)]
pub enum DaemonCmd {
    /// Display a media file for a bounded time.
    Show {
        kind: MediaKind,
        path: PathBuf,
        duration: Duration,
    },
    /// Close whatever is on screen.
    Cancel,
    /// Report what is on screen.
    Status,
    /// Reject new jobs and close the current viewer.
    Pause,
    /// Accept jobs again.
    Resume,
    /// Quit `splashd`
    Quit,
}

#[derive(Debug, PartialEq, Error)]
pub enum SocketError {
    #[error("failed to initialise socket")]
    InitFailed,
    #[error("unrecognised command")]
    UnknownCmd,
}

pub struct Socket {
    listener: UnixListener,
}

impl Socket {
    /// Binds the control socket at the configured path.
    ///
    /// # Errors
    /// [`SocketError::InitFailed`] if the path cannot be bound.
    pub fn new() -> Result<Self, SocketError> {
        Self::bind(CFG.socket.as_path())
    }

    /// Binds a control socket at an explicit path.
    ///
    /// # Errors
    /// [`SocketError::InitFailed`] if the path cannot be bound.
    pub fn bind(path: &Path) -> Result<Self, SocketError> {
        // A stale socket file from a crashed daemon would fail the bind
        let _ = std::fs::remove_file(path);
        Ok(Self {
            listener: UnixListener::bind(path).map_err(|_| SocketError::InitFailed)?,
        })
    }

    /// Listens for connections and drives the supervisor.
    ///
    /// Requests are handled one at a time, in arrival order. Returns once a
    /// `quit` command arrives.
    pub async fn listen<P: Player>(&self, supervisor: &Supervisor<P>) {
        let mut paused = false;
        let mut incoming = self.listener.incoming();
        while let Some(Ok(mut conn)) = incoming.next().await {
            let mut content = String::new();
            let _ = conn.read_to_string(&mut content).await;
            let reply = match parse_cmd(content.trim()) {
                Ok((_, DaemonCmd::Quit)) => {
                    let _ = conn.write_all(b"bye\n").await;
                    break;
                }
                Ok((_, cmd)) => handle_cmd(cmd, supervisor, &mut paused).await,
                Err(_) => {
                    log::error!("unrecognised command: {}", content.trim());
                    format!("error: {}", SocketError::UnknownCmd)
                }
            };
            let _ = conn.write_all(reply.as_bytes()).await;
            let _ = conn.write_all(b"\n").await;
        }
    }
}

async fn handle_cmd<P: Player>(
    cmd: DaemonCmd,
    supervisor: &Supervisor<P>,
    paused: &mut bool,
) -> String {
    match cmd {
        DaemonCmd::Show {
            kind,
            path,
            duration,
        } => {
            if *paused {
                return String::from("paused; resume before sending media");
            }
            let job = Job::new(kind, path, duration.clamp(MIN_DURATION, MAX_DURATION));
            show(supervisor, job).await
        }
        DaemonCmd::Cancel => {
            supervisor.cancel().await;
            String::from("display closed")
        }
        DaemonCmd::Status => render_status(*paused, supervisor.status().await),
        DaemonCmd::Pause => {
            *paused = true;
            supervisor.cancel().await;
            String::from("paused; new media will be rejected")
        }
        DaemonCmd::Resume => {
            *paused = false;
            String::from("active again")
        }
        DaemonCmd::Quit => unreachable!("quit is handled by the listen loop"),
    }
}

/// Starts the job and gives the viewer a moment to fail fast, so a missing
/// player or a corrupt file is reported instead of a false success.
async fn show<P: Player>(supervisor: &Supervisor<P>, job: Job) -> String {
    let kind = job.kind;
    match supervisor.start(job).await {
        Ok(outcome_rx) => {
            let early = smol::future::race(
                async { outcome_rx.recv().await.ok() },
                async {
                    Timer::after(EARLY_EXIT_WINDOW).await;
                    None
                },
            )
            .await;
            match early {
                Some(outcome) if outcome != ExitOutcome::Completed => {
                    format!("error: {outcome}")
                }
                _ => format!("showing {kind}"),
            }
        }
        Err(outcome) => format!("error: {outcome}"),
    }
}

fn render_status(paused: bool, snapshot: StatusSnapshot) -> String {
    let state = if paused { "paused" } else { "active" };
    match snapshot {
        StatusSnapshot::Idle => format!("{state}; nothing on screen"),
        StatusSnapshot::Showing {
            kind,
            elapsed,
            remaining,
        } => format!(
            "{state}; showing {kind}, {}s elapsed, {}s remaining",
            elapsed.as_secs(),
            remaining.as_secs()
        ),
    }
}

fn parse_quit(input: &str) -> IResult<&str, DaemonCmd> {
    map(tag("quit"), |_| DaemonCmd::Quit).parse(input)
}
fn parse_status(input: &str) -> IResult<&str, DaemonCmd> {
    map(tag("status"), |_| DaemonCmd::Status).parse(input)
}
fn parse_cancel(input: &str) -> IResult<&str, DaemonCmd> {
    map(tag("cancel"), |_| DaemonCmd::Cancel).parse(input)
}
fn parse_pause(input: &str) -> IResult<&str, DaemonCmd> {
    map(tag("pause"), |_| DaemonCmd::Pause).parse(input)
}
fn parse_resume(input: &str) -> IResult<&str, DaemonCmd> {
    map(tag("resume"), |_| DaemonCmd::Resume).parse(input)
}

fn parse_show(input: &str) -> IResult<&str, DaemonCmd> {
    let (input, _) = tag("show")(input)?;
    let (input, _) = space1(input)?;
    let (input, kind) = map_res(
        take_till1(|c: char| c.is_whitespace()),
        str::parse::<MediaKind>,
    )
    .parse(input)?;
    let (input, _) = space1(input)?;
    let (input, path) = map_res(
        take_till1(|c: char| c.is_whitespace()),
        str::parse::<PathBuf>,
    )
    .parse(input)?;
    let (input, _) = space1(input)?;
    let (input, duration) = map_res(take_till1(|c: char| c.is_whitespace()), |value| {
        duration_str::parse(value)
    })
    .parse(input)?;
    Ok((
        input,
        DaemonCmd::Show {
            kind,
            path,
            duration,
        },
    ))
}

/// Parse commands from clients
fn parse_cmd(input: &str) -> IResult<&str, DaemonCmd> {
    alt((
        parse_show,
        parse_cancel,
        parse_status,
        parse_pause,
        parse_resume,
        parse_quit,
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::FfPlayer;
    use smol::io::AsyncWriteExt;

    #[test]
    fn test_parse_cmd() {
        let cmd = "show image /tmp/photo.jpg 10s";
        assert_eq!(
            parse_cmd(cmd),
            Ok((
                "",
                DaemonCmd::Show {
                    kind: MediaKind::Image,
                    path: PathBuf::from("/tmp/photo.jpg"),
                    duration: Duration::from_secs(10),
                }
            ))
        );

        let cmd = "show video /tmp/clip.mp4 5m";
        assert_eq!(
            parse_cmd(cmd),
            Ok((
                "",
                DaemonCmd::Show {
                    kind: MediaKind::Video,
                    path: PathBuf::from("/tmp/clip.mp4"),
                    duration: Duration::from_secs(5 * 60),
                }
            ))
        );

        let cmd = "cancel";
        assert_eq!(parse_cmd(cmd), Ok(("", DaemonCmd::Cancel)));
        let cmd = "status";
        assert_eq!(parse_cmd(cmd), Ok(("", DaemonCmd::Status)));
        let cmd = "pause";
        assert_eq!(parse_cmd(cmd), Ok(("", DaemonCmd::Pause)));
        let cmd = "resume";
        assert_eq!(parse_cmd(cmd), Ok(("", DaemonCmd::Resume)));
        let cmd = "quit";
        assert_eq!(parse_cmd(cmd), Ok(("", DaemonCmd::Quit)));
    }

    #[test]
    fn rejecting_garbage() {
        assert!(parse_cmd("display /tmp/photo.jpg").is_err());
        assert!(parse_cmd("show slideshow /tmp/photo.jpg 10s").is_err());
        assert!(parse_cmd("show image /tmp/photo.jpg soon").is_err());
        assert!(parse_cmd("").is_err());
    }

    #[test]
    fn rendering_status() {
        assert_eq!(
            render_status(false, StatusSnapshot::Idle),
            "active; nothing on screen"
        );
        assert_eq!(
            render_status(true, StatusSnapshot::Idle),
            "paused; nothing on screen"
        );
        assert_eq!(
            render_status(
                false,
                StatusSnapshot::Showing {
                    kind: MediaKind::Video,
                    elapsed: Duration::from_secs(3),
                    remaining: Duration::from_secs(27),
                }
            ),
            "active; showing video, 3s elapsed, 27s remaining"
        );
    }

    #[test]
    fn sending_quit() {
        let socket = Socket::bind(Path::new("/tmp/splashd-test.sock")).unwrap();

        let _quit = smol::spawn(async {
            let mut conn = smol::net::unix::UnixStream::connect("/tmp/splashd-test.sock")
                .await
                .unwrap();
            conn.write_all(b"quit").await.unwrap();
        });

        smol::block_on(async {
            let supervisor = Supervisor::new(FfPlayer::new(None, None));
            smol::future::race(
                async {
                    socket.listen(&supervisor).await;
                    std::fs::remove_file("/tmp/splashd-test.sock").unwrap();
                },
                async {
                    Timer::after(Duration::from_secs(1)).await;
                    std::fs::remove_file("/tmp/splashd-test.sock").unwrap();
                    panic!("timeout waiting for `quit` command");
                },
            )
            .await;
        });
    }
}
