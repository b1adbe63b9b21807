mod ffplay;

pub use ffplay::{FfPlayer, classify_exit};

use crate::job::Job;
use smol::process::Command;

/// General trait of a media player backend.
pub trait Player {
    /// Gets the [`Command`] that displays the given job.
    fn command(&self, job: &Job) -> Command;
}
