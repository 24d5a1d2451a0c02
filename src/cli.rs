//! CLI argument parsing using clap.

use clap::Parser;
use url::Url;

/// `lingo` - chat with an AI study backend from the terminal.
///
/// Connects to the backend's `/chat` and `/upload` endpoints. All
/// conversation state lives in memory for the life of the process.
#[derive(Parser, Debug)]
#[command(name = "lingo", version, about, long_about = None)]
pub struct Args {
    /// Base address of the study backend.
    #[arg(long, default_value = "http://localhost:8000")]
    pub backend: Url,
}
