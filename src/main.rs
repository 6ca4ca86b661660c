//! Capgen - Automated Video Captioning Workflow
//!
//! This is the main entry point for the capgen application: upload a video,
//! transcribe its speech with whisper, generate subtitle files, and burn the
//! subtitles into a re-encoded copy of the video using ffmpeg.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use capgen::cli::{Args, Commands};
use capgen::config::{Config, TranscriberEngine};
use capgen::error::CapgenError;
use capgen::setup::SetupManager;
use capgen::workflow::{ProcessReport, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;
    info!("Starting capgen");

    // Load configuration: explicit path, capgen.toml in the working
    // directory, or built-in defaults
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("capgen.toml").exists() {
                info!("Found capgen.toml in current directory, loading...");
                Config::from_file("capgen.toml")?
            } else {
                Config::default()
            }
        }
    };

    let setup_manager = SetupManager::new()?;

    match args.command {
        Commands::Process {
            input,
            output_dir,
            model,
            language,
            engine,
            karaoke,
            no_word_level,
        } => {
            info!("Processing video file: {}", input.display());

            apply_overrides(&mut config, model, language, engine.as_deref())?;
            setup_manager.ensure_model(&mut config).await?;

            let workflow = Workflow::new(config)?;
            let report = workflow
                .process_video(&input, output_dir.as_deref(), karaoke, !no_word_level)
                .await?;

            print_report(&report);
        }
        Commands::Batch {
            input_dir,
            output_dir,
            model,
            engine,
        } => {
            info!("Processing directory: {}", input_dir.display());

            apply_overrides(&mut config, model, None, engine.as_deref())?;
            setup_manager.ensure_model(&mut config).await?;

            let workflow = Workflow::new(config)?;
            let processed = workflow
                .process_directory(&input_dir, output_dir.as_deref())
                .await?;

            println!("Processed {} video files", processed);
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());

            let workflow = Workflow::new(config)?;
            workflow.extract_audio(&input, &output).await?;

            println!("Audio extracted to {}", output.display());
        }
        Commands::Transcribe {
            input,
            output_dir,
            model,
            language,
            engine,
        } => {
            info!("Transcribing audio: {}", input.display());

            apply_overrides(&mut config, model, language, engine.as_deref())?;
            setup_manager.ensure_model(&mut config).await?;

            let workflow = Workflow::new(config)?;
            let report = workflow
                .transcribe_audio(&input, output_dir.as_deref())
                .await?;

            print_report(&report);
        }
        Commands::Burn {
            video,
            subtitles,
            output,
            karaoke,
        } => {
            info!("Burning subtitles into video: {}", video.display());

            let workflow = Workflow::new(config)?;
            workflow.burn(&video, &subtitles, &output, karaoke).await?;

            println!("Burned video written to {}", output.display());
        }
        Commands::Models { download } => {
            let models = setup_manager.available_models();

            println!("\nAvailable Whisper Models:");
            println!("{:<12} {:<22} {:<10} {:<10}", "Name", "Filename", "Size (MB)", "Status");
            println!("{}", "-".repeat(56));

            let models_dir = setup_manager.models_dir();
            for model in &models {
                let status = if models_dir.join(&model.filename).exists() {
                    "Downloaded"
                } else {
                    "Missing"
                };
                println!(
                    "{:<12} {:<22} {:<10.1} {:<10}",
                    model.name, model.filename, model.size_mb, status
                );
            }

            if download {
                info!("Downloading all missing models...");
                for model in &models {
                    if !models_dir.join(&model.filename).exists() {
                        setup_manager.download_model(model).await?;
                    }
                }
                println!("All models downloaded");
            }
        }
        Commands::Doctor => {
            println!("\nChecking dependencies...");

            let reports = setup_manager.run_diagnostics(&config).await;
            let mut failures = 0;
            for report in &reports {
                let mark = if report.ok { "ok" } else { "FAIL" };
                println!("  [{:<4}] {:<28} {}", mark, report.name, report.detail);
                if !report.ok {
                    failures += 1;
                }
            }

            if failures > 0 {
                anyhow::bail!("{} dependency check(s) failed", failures);
            }
            println!("\nAll checks passed");
        }
        Commands::Clean { all } => {
            let workflow = Workflow::new(config)?;
            let removed = workflow.clean(all).await?;
            println!("Removed {} files", removed);
        }
    }

    info!("capgen finished successfully");
    Ok(())
}

/// Setup logging to both console and a daily-rolling file under the app dir
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::path::Path::new(".capgen").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "capgen.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Apply command-line overrides onto the loaded configuration
fn apply_overrides(
    config: &mut Config,
    model: Option<String>,
    language: Option<String>,
    engine: Option<&str>,
) -> Result<()> {
    if let Some(model) = model {
        config.transcriber.model = model;
    }
    if let Some(language) = language {
        config.transcriber.language = Some(language);
    }
    if let Some(engine) = engine {
        config.transcriber.engine = parse_engine(engine)?;
    }
    Ok(())
}

/// Parse transcription engine from string
fn parse_engine(engine: &str) -> Result<TranscriberEngine> {
    match engine.to_lowercase().as_str() {
        "whisper-cpp" | "whisper_cpp" => Ok(TranscriberEngine::WhisperCpp),
        "openai" => Ok(TranscriberEngine::OpenAi),
        _ => Err(CapgenError::Config(format!(
            "Invalid engine '{}'. Valid engines: whisper-cpp, openai",
            engine
        ))
        .into()),
    }
}

fn print_report(report: &ProcessReport) {
    println!("\nTranscript summary:");
    println!("  Language:     {}", report.language);
    println!("  Words:        {}", report.stats.word_count);
    println!("  Characters:   {}", report.stats.char_count);
    println!("  Duration:     {:.2}s", report.stats.duration_secs);
    println!("  Avg word:     {:.3}s", report.stats.avg_word_secs);

    println!("\nGenerated files:");
    println!("  Transcript:   {}", report.transcript_path.display());
    println!("  Subtitles:    {}", report.srt_path.display());
    if let Some(path) = &report.word_srt_path {
        println!("  Word SRT:     {}", path.display());
    }
    if let Some(path) = &report.word_timing_path {
        println!("  Word timing:  {}", path.display());
    }
    if report.output_video_path.as_os_str().is_empty() {
        return;
    }
    println!("  Video:        {}", report.output_video_path.display());
    if let Some(path) = &report.karaoke_video_path {
        println!("  Karaoke:      {}", path.display());
    }
}
