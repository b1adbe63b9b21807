//! `splashctl` entry
//!
//! The cli program to communicate with splashd.

mod cli;

use clap::Parser;
use std::env;
use std::error::Error;
use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use crate::cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let request = render_request(cli.command)?;

    let mut conn = UnixStream::connect(socket_path())
        .inspect_err(|_| eprintln!("cannot reach splashd, is it running?"))?;
    conn.write_all(request.as_bytes())?;
    conn.shutdown(Shutdown::Write)?;

    let mut reply = String::new();
    conn.read_to_string(&mut reply)?;
    print!("{reply}");
    Ok(())
}

/// Renders a subcommand into one request line for the daemon.
///
/// Media paths are canonicalized so the daemon sees them from its own
/// working directory.
fn render_request(command: Commands) -> Result<String, Box<dyn Error>> {
    Ok(match command {
        Commands::Show {
            kind,
            path,
            duration,
        } => {
            let path = std::fs::canonicalize(&path)
                .inspect_err(|_| eprintln!("no such file: {}", path.to_string_lossy()))?;
            format!("show {kind} {} {duration}", path.to_string_lossy())
        }
        Commands::Cancel => String::from("cancel"),
        Commands::Status => String::from("status"),
        Commands::Pause => String::from("pause"),
        Commands::Resume => String::from("resume"),
        Commands::Quit => String::from("quit"),
    })
}

fn socket_path() -> PathBuf {
    if let Ok(mut value) = env::var("XDG_RUNTIME_DIR") {
        value.push_str("/splashd.sock");
        return PathBuf::from(value);
    }
    PathBuf::from("/tmp/splashd.sock")
}
