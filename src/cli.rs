use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full captioning pipeline on a single video file
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for all generated files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Whisper model to use (tiny, base, small, medium, large)
        #[arg(short, long)]
        model: Option<String>,

        /// Source language hint (default: auto-detect)
        #[arg(short, long)]
        language: Option<String>,

        /// Transcription engine (whisper-cpp, openai)
        #[arg(long)]
        engine: Option<String>,

        /// Also burn a karaoke-style video with per-word highlighting
        #[arg(long)]
        karaoke: bool,

        /// Skip word-level timing extraction
        #[arg(long)]
        no_word_level: bool,
    },

    /// Run the captioning pipeline on every video file in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for all generated files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Whisper model to use (tiny, base, small, medium, large)
        #[arg(short, long)]
        model: Option<String>,

        /// Transcription engine (whisper-cpp, openai)
        #[arg(long)]
        engine: Option<String>,
    },

    /// Extract audio from a video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file (16 kHz mono WAV)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe an audio file into transcript, SRT and word timing files
    Transcribe {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for generated files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Whisper model to use (tiny, base, small, medium, large)
        #[arg(short, long)]
        model: Option<String>,

        /// Source language hint (default: auto-detect)
        #[arg(short, long)]
        language: Option<String>,

        /// Transcription engine (whisper-cpp, openai)
        #[arg(long)]
        engine: Option<String>,
    },

    /// Burn subtitles into a video file
    Burn {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,

        /// Subtitle file: SRT, or word timing JSON with --karaoke
        #[arg(short, long)]
        subtitles: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,

        /// Karaoke mode: per-word highlighting from a word timing JSON file
        #[arg(long)]
        karaoke: bool,
    },

    /// List available whisper models and their status
    Models {
        /// Download all missing models
        #[arg(long)]
        download: bool,
    },

    /// Check external dependencies and working directories
    Doctor,

    /// Remove intermediate working files
    Clean {
        /// Also remove generated captions and burned videos
        #[arg(long)]
        all: bool,
    },
}
