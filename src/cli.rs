//! CLI argument parsing for the clinicdesk-api binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clinicdesk-api", about = "Clinic admin dashboard backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server (default if no subcommand given)
    Serve,
    /// Write the normalized leads sheet to a CSV file and exit
    ExportLeads {
        /// Destination file
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Poll a running server's message log and log inbox updates
    WatchInbox {
        /// Base URL of the server, e.g. http://localhost:3001
        #[arg(long)]
        url: String,
    },
    /// Print which upstreams are configured and exit
    CheckConfig,
}
