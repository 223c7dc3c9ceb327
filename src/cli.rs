use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CliOverrides;

#[derive(Debug, Parser)]
#[command(name = "shotput")]
#[command(about = "Screenshot capture and upload for Wayland compositors")]
pub struct Cli {
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// File name for the screenshot instead of the generated one.
    #[arg(long)]
    pub file_name: Option<String>,

    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture a selected region and upload it.
    Partial {
        #[command(flatten)]
        capture: CaptureArgs,

        /// Upload service to use.
        #[arg(long, short = 's')]
        service: Option<String>,
    },
    /// Capture the whole screen and upload it.
    Fullscreen {
        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Capture the active window and upload it.
    Window {
        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Upload the image currently on the clipboard.
    Clipboard {
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// Show upload history.
    History,
    /// Clear upload history.
    ClearHistory,
    /// Check that the tool is ready to capture and upload.
    Doctor {
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn to_overrides(&self) -> CliOverrides {
        CliOverrides {
            verbose: self.verbose_flag(),
        }
    }

    // The flag only raises verbosity; absence defers to config.
    fn verbose_flag(&self) -> Option<bool> {
        let flagged = match &self.command {
            Command::Partial { capture, .. }
            | Command::Fullscreen { capture }
            | Command::Window { capture } => capture.verbose,
            Command::Clipboard { verbose } => *verbose,
            Command::History | Command::ClearHistory | Command::Doctor { .. } => false,
        };
        flagged.then_some(true)
    }
}
