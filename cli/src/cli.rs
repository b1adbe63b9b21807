//! cli parameters

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    version = "0.1.0",
    about = "CLI tool for pushing media to splashd.",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Display a media file fullscreen")]
    Show {
        #[arg(help = "Media kind: image, video or audio")]
        kind: String,
        #[arg(help = "Path to the media file")]
        path: PathBuf,
        #[arg(
            default_value = "10s",
            help = "How long to keep it on screen; videos and audio stop earlier when playback ends"
        )]
        duration: String,
    },
    #[command(about = "Close whatever is on screen")]
    Cancel,
    #[command(about = "Show splashd status")]
    Status,
    #[command(about = "Pause splashd; new media is rejected")]
    Pause,
    #[command(about = "Resume splashd")]
    Resume,
    #[command(about = "Quit the daemon")]
    Quit,
}
