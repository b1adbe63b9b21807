//! `splashd` entry
//!
//! The daemon that throws remotely pushed media onto the local screen.
//! It owns at most one viewer process at any instant; jobs arrive over the
//! control socket and preempt whatever is currently showing.

use clap::Parser;
use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::player::FfPlayer;
use crate::socket::Socket;
use crate::supervisor::Supervisor;

pub static CFG: LazyLock<Config> = LazyLock::new(parse);

#[derive(Parser)]
#[command(
    version = "0.1.0",
    about = "A daemon that displays remotely pushed media fullscreen for a bounded time"
)]
struct Cli {
    #[arg(
        short = 's',
        long = "socket",
        value_name = "PATH",
        help = "Path to the control socket."
    )]
    socket: Option<PathBuf>,

    #[arg(
        short = 'p',
        long = "player",
        value_name = "PATH",
        help = "Path to the ffplay binary used for video and audio."
    )]
    player: Option<String>,

    #[arg(
        short = 'i',
        long = "image-viewer",
        value_name = "PATH",
        help = "Path to the fullscreen image viewer binary."
    )]
    image_viewer: Option<String>,
}

pub struct Config {
    pub socket: PathBuf,
    pub player: Option<String>,
    pub image_viewer: Option<String>,
}
fn parse() -> Config {
    let parsed = Cli::parse();
    let socket = if let Some(value) = parsed.socket {
        value
    } else {
        sys_socket_path()
    };
    Config {
        socket,
        player: parsed.player,
        image_viewer: parsed.image_viewer,
    }
}

fn sys_socket_path() -> PathBuf {
    if let Ok(mut value) = env::var("XDG_RUNTIME_DIR") {
        value.push_str("/splashd.sock");
        return PathBuf::from(value);
    }
    // Not great, but the daemon is single-user anyhow
    PathBuf::from("/tmp/splashd.sock")
}

fn setup_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                message
            ));
        })
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

/// The real start.
///
/// # Errors
/// Fatal errors that will cause the program to exit will be returned here.
pub async fn start() -> Result<(), Box<dyn Error>> {
    setup_logger()?;

    let supervisor = Supervisor::new(FfPlayer::new(
        CFG.player.clone(),
        CFG.image_viewer.clone(),
    ));
    let socket =
        Socket::new().inspect_err(|err| eprintln!("failed to create unix socket: {err}"))?;
    log::info!("listening on {}", CFG.socket.to_string_lossy());

    socket.listen(&supervisor).await;

    // A viewer may still be on screen when quit arrives
    supervisor.cancel().await;
    let _ = std::fs::remove_file(CFG.socket.as_path());
    Ok(())
}
