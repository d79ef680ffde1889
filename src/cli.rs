use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "playgate")]
#[command(author, version, about = "Playback source resolver and streaming relay")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides `[server] host`)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides `[server] port`)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Follow a link's redirects and print the playback directive
    Resolve {
        /// Link to resolve
        #[arg(required = true)]
        url: String,

        /// Provider label the link was offered under
        #[arg(long, default_value = "")]
        provider: String,
    },

    /// Classify a link as-is and print the playback directive
    Classify {
        /// Link to classify
        #[arg(required = true)]
        url: String,

        /// Provider label the link was offered under
        #[arg(long, default_value = "")]
        provider: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
