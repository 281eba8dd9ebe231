//! Karaoke CLI: parse timed lyrics, inspect render graphs, and render videos.
//!
//! Usage:
//!   karaoke generate [OPTIONS]   Render a karaoke video
//!   karaoke parse <FILE>         Print the parsed lyric schedule as JSON
//!   karaoke graph <FILE>         Print the ffmpeg filtergraph for a lyric file
//!   karaoke check                Check renderer availability
//!   karaoke init                 Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "karaoke",
    about = "Karaoke video generation from audio and timed lyrics",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a karaoke video
    Generate {
        /// Audio track
        #[arg(short, long)]
        audio: PathBuf,

        /// Lyrics file, `[MM:SS.mm]` tagged or plain lines
        #[arg(short, long)]
        lyrics: PathBuf,

        /// Background image (a black canvas is used when omitted)
        #[arg(short, long)]
        background: Option<PathBuf>,

        /// Song title
        #[arg(short, long)]
        title: String,

        /// Artist name
        #[arg(long)]
        artist: String,

        /// Skip the title card
        #[arg(long)]
        no_intro: bool,

        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print the parsed lyric schedule as JSON
    Parse {
        /// Lyrics file
        path: PathBuf,

        /// Print as LRC instead of JSON
        #[arg(long)]
        lrc: bool,
    },

    /// Print the ffmpeg filtergraph for a lyric file
    Graph {
        /// Lyrics file
        path: PathBuf,

        /// Song title
        #[arg(short, long, default_value = "Untitled")]
        title: String,

        /// Artist name
        #[arg(long, default_value = "Unknown")]
        artist: String,

        /// Skip the title card
        #[arg(long)]
        no_intro: bool,

        /// Serialize for an image background instead of the canvas
        #[arg(long)]
        background: bool,
    },

    /// Check renderer availability
    Check,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = karaoke_common::config::AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if cli.json_logs {
        logging.json = true;
    }
    karaoke_common::logging::init_logging(&logging);

    if !matches!(cli.command, Commands::Init { .. }) {
        config.validate()?;
    }

    match cli.command {
        Commands::Generate {
            audio,
            lyrics,
            background,
            title,
            artist,
            no_intro,
            output_dir,
        } => {
            commands::generate::run(
                &config,
                audio,
                lyrics,
                background,
                title,
                artist,
                !no_intro,
                output_dir,
            )
            .await
        }
        Commands::Parse { path, lrc } => commands::parse::run(path, lrc),
        Commands::Graph {
            path,
            title,
            artist,
            no_intro,
            background,
        } => commands::graph::run(&config, path, title, artist, !no_intro, background),
        Commands::Check => commands::check::run(&config),
        Commands::Init { force } => commands::init::run(force),
    }
}
