use std::path::{Path, PathBuf};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, CapgenError};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::subtitle::{self, karaoke, style};
use crate::transcribe::{Transcriber, TranscriberFactory, TranscriptStats};

/// Input formats accepted by the pipeline
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "flv", "wmv", "webm"];

/// Artifact paths and summary of one completed pipeline run
#[derive(Debug)]
pub struct ProcessReport {
    pub transcript_path: PathBuf,
    pub srt_path: PathBuf,
    pub word_srt_path: Option<PathBuf>,
    pub word_timing_path: Option<PathBuf>,
    pub output_video_path: PathBuf,
    pub karaoke_video_path: Option<PathBuf>,
    pub language: String,
    pub stats: TranscriptStats,
}

/// Unique naming scope for one run: timestamp plus a short id so two runs in
/// the same second cannot collide.
struct RunScope {
    timestamp: String,
    run_id: String,
}

impl RunScope {
    fn new() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self {
            timestamp: Local::now().format("%Y%m%d_%H%M%S").to_string(),
            run_id: uuid[..8].to_string(),
        }
    }

    fn file_name(&self, base: &str, extension: &str) -> String {
        format!("{}_{}_{}.{}", base, self.timestamp, self.run_id, extension)
    }
}

pub struct Workflow {
    config: Config,
    transcriber: Box<dyn Transcriber>,
    media: Box<dyn MediaProcessorTrait>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriberFactory::create(config.transcriber.clone());
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        media.check_availability()?;

        Ok(Self {
            config,
            transcriber,
            media,
        })
    }

    /// Assemble a workflow from pre-built components
    pub fn with_components(
        config: Config,
        transcriber: Box<dyn Transcriber>,
        media: Box<dyn MediaProcessorTrait>,
    ) -> Self {
        Self {
            config,
            transcriber,
            media,
        }
    }

    /// Run the full pipeline on one video: extract audio, transcribe,
    /// generate subtitle artifacts, burn subtitles into a new video.
    pub async fn process_video<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_dir: Option<&Path>,
        karaoke_video: bool,
        word_level: bool,
    ) -> Result<ProcessReport> {
        let input_path = input_path.as_ref();
        info!("Processing video: {}", input_path.display());

        self.validate_input(input_path)?;

        let (video_dir, audio_dir, captions_dir) = self.resolve_dirs(output_dir).await?;
        let scope = RunScope::new();

        let progress = ProgressBar::new(4);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:30.cyan/blue}] step {pos}/{len}: {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        // Step 1: extract audio
        progress.set_message("Extracting audio from video...");
        let audio_path = audio_dir.join(scope.file_name("extracted_audio", "wav"));
        self.media.extract_audio(input_path, &audio_path).await?;
        progress.inc(1);

        // Step 2: transcribe
        progress.set_message("Transcribing audio...");
        let transcription = self
            .transcriber
            .transcribe(&audio_path, self.config.transcriber.language.as_deref())
            .await?;
        progress.inc(1);

        // Step 3: subtitle artifacts
        progress.set_message("Generating subtitle files...");
        let transcript_path = captions_dir.join(scope.file_name("transcript", "txt"));
        fs::write(&transcript_path, &transcription.text).await?;

        let srt_path = captions_dir.join(scope.file_name("captions", "srt"));
        subtitle::generate_srt(&transcription, &srt_path).await?;

        let words = transcription.word_timings_or_estimated();
        let word_timing_path = if word_level {
            let path = captions_dir.join(scope.file_name("word_timing", "json"));
            subtitle::save_word_timings(&words, &path).await?;
            Some(path)
        } else {
            None
        };
        progress.inc(1);

        // Step 4: burn subtitles
        progress.set_message("Burning subtitles into video...");
        let output_video_path = video_dir.join(scope.file_name("output_burned", "mp4"));
        let force_style = style::force_style(&self.config.subtitle)?;
        self.media
            .burn_subtitles(input_path, &srt_path, &output_video_path, &force_style)
            .await?;

        let karaoke_video_path = if karaoke_video {
            let ass_path = captions_dir.join(scope.file_name("karaoke", "ass"));
            karaoke::generate_karaoke_ass(&words, &self.config.subtitle, &ass_path).await?;

            let path = video_dir.join(scope.file_name("output_karaoke", "mp4"));
            self.media.burn_ass(input_path, &ass_path, &path).await?;
            Some(path)
        } else {
            None
        };
        progress.inc(1);
        progress.finish_with_message("Processing complete");

        if self.config.storage.auto_cleanup {
            let _ = fs::remove_file(&audio_path).await;
        }

        Ok(ProcessReport {
            transcript_path,
            srt_path,
            word_srt_path: None,
            word_timing_path,
            output_video_path,
            karaoke_video_path,
            language: transcription.language.clone(),
            stats: transcription.stats(),
        })
    }

    /// Run the pipeline over every video file found under a directory.
    /// Returns the number of successfully processed files.
    pub async fn process_directory<P: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Option<&Path>,
    ) -> Result<u64> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(CapgenError::Config(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        let mut video_files = Vec::new();
        for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
            if is_video_file(entry.path()) {
                video_files.push(entry.path().to_path_buf());
            }
        }
        video_files.sort();

        info!("Found {} video files to process", video_files.len());

        let mut processed = 0;
        for video_path in video_files {
            match self.process_video(&video_path, output_dir, false, true).await {
                Ok(report) => {
                    info!(
                        "Successfully processed {} -> {}",
                        video_path.display(),
                        report.output_video_path.display()
                    );
                    processed += 1;
                }
                Err(e) => warn!("Failed to process {}: {}", video_path.display(), e),
            }
        }

        Ok(processed)
    }

    /// Extract audio from a video file to an explicit location
    pub async fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> Result<()> {
        let video_path = video_path.as_ref();
        if !video_path.exists() {
            return Err(CapgenError::FileNotFound(video_path.display().to_string()));
        }

        self.media.extract_audio(video_path, audio_path.as_ref()).await
    }

    /// Transcribe an audio file and write transcript, SRT and word timing
    /// artifacts. Returns the report with the subtitle paths filled in.
    pub async fn transcribe_audio<P: AsRef<Path>>(
        &self,
        audio_path: P,
        output_dir: Option<&Path>,
    ) -> Result<ProcessReport> {
        let audio_path = audio_path.as_ref();
        if !audio_path.exists() {
            return Err(CapgenError::FileNotFound(audio_path.display().to_string()));
        }

        let (_, _, captions_dir) = self.resolve_dirs(output_dir).await?;
        let scope = RunScope::new();

        let transcription = self
            .transcriber
            .transcribe(audio_path, self.config.transcriber.language.as_deref())
            .await?;

        let transcript_path = captions_dir.join(scope.file_name("transcript", "txt"));
        fs::write(&transcript_path, &transcription.text).await?;

        let srt_path = captions_dir.join(scope.file_name("captions", "srt"));
        subtitle::generate_srt(&transcription, &srt_path).await?;

        let word_srt_path = captions_dir.join(scope.file_name("captions_words", "srt"));
        subtitle::generate_word_srt(&transcription, &word_srt_path).await?;

        let words = transcription.word_timings_or_estimated();
        let word_timing_path = captions_dir.join(scope.file_name("word_timing", "json"));
        subtitle::save_word_timings(&words, &word_timing_path).await?;

        Ok(ProcessReport {
            transcript_path,
            srt_path,
            word_srt_path: Some(word_srt_path),
            word_timing_path: Some(word_timing_path),
            output_video_path: PathBuf::new(),
            karaoke_video_path: None,
            language: transcription.language.clone(),
            stats: transcription.stats(),
        })
    }

    /// Burn a subtitle file into a video. In karaoke mode the subtitle file
    /// is a word timing JSON, rendered through a generated ASS document.
    pub async fn burn<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitle_path: P,
        output_path: P,
        karaoke_mode: bool,
    ) -> Result<()> {
        let video_path = video_path.as_ref();
        let subtitle_path = subtitle_path.as_ref();
        let output_path = output_path.as_ref();

        if !video_path.exists() {
            return Err(CapgenError::FileNotFound(video_path.display().to_string()));
        }
        if !subtitle_path.exists() {
            return Err(CapgenError::FileNotFound(subtitle_path.display().to_string()));
        }

        if karaoke_mode {
            let words = subtitle::load_word_timings(subtitle_path).await?;

            let scratch = tempfile::tempdir()
                .map_err(|e| CapgenError::Subtitle(format!("Failed to create temp directory: {}", e)))?;
            let ass_path = scratch.path().join("karaoke.ass");
            karaoke::generate_karaoke_ass(&words, &self.config.subtitle, &ass_path).await?;

            self.media.burn_ass(video_path, &ass_path, output_path).await
        } else {
            let force_style = style::force_style(&self.config.subtitle)?;
            self.media
                .burn_subtitles(video_path, subtitle_path, output_path, &force_style)
                .await
        }
    }

    /// Remove intermediate audio files; with `all` set, also remove
    /// generated captions and burned videos. Returns removed file count.
    pub async fn clean(&self, all: bool) -> Result<u64> {
        let mut dirs = vec![self.config.storage.audio_dir.clone()];
        if all {
            dirs.push(self.config.storage.captions_dir.clone());
            dirs.push(self.config.storage.video_dir.clone());
        }

        let mut removed = 0;
        for dir in dirs {
            if let Ok(mut entries) = fs::read_dir(&dir).await {
                while let Ok(Some(entry)) = entries.next_entry().await {
                    if entry.path().is_file() && fs::remove_file(entry.path()).await.is_ok() {
                        removed += 1;
                    }
                }
            }
        }

        Ok(removed)
    }

    fn validate_input(&self, input_path: &Path) -> Result<()> {
        if !input_path.exists() {
            return Err(CapgenError::FileNotFound(input_path.display().to_string()));
        }

        if !is_video_file(input_path) {
            return Err(CapgenError::UnsupportedFormat(format!(
                "{} (supported: {})",
                input_path.display(),
                VIDEO_EXTENSIONS.join(", ")
            )));
        }

        let size_mb = std::fs::metadata(input_path)?.len() / (1024 * 1024);
        if size_mb > self.config.storage.max_input_mb {
            return Err(CapgenError::Config(format!(
                "Input file is {} MB, exceeding the configured limit of {} MB",
                size_mb, self.config.storage.max_input_mb
            )));
        }

        Ok(())
    }

    /// Output locations: an explicit output directory collects everything,
    /// otherwise artifacts go into the configured working directories.
    async fn resolve_dirs(&self, output_dir: Option<&Path>) -> Result<(PathBuf, PathBuf, PathBuf)> {
        match output_dir {
            Some(dir) => {
                fs::create_dir_all(dir).await?;
                Ok((dir.to_path_buf(), dir.to_path_buf(), dir.to_path_buf()))
            }
            None => {
                self.config.storage.ensure_directories()?;
                Ok((
                    self.config.storage.video_dir.clone(),
                    self.config.storage.audio_dir.clone(),
                    self.config.storage.captions_dir.clone(),
                ))
            }
        }
    }
}

fn is_video_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaProcessorTrait;
    use crate::transcribe::{MockTranscriber, Transcription, TranscriptionSegment, WordTiming};

    fn sample_transcription() -> Transcription {
        Transcription {
            text: "Hello world".to_string(),
            segments: vec![TranscriptionSegment {
                id: 0,
                start: 0.0,
                end: 1.5,
                text: "Hello world".to_string(),
                words: vec![
                    WordTiming { word: "Hello".to_string(), start: 0.0, end: 0.7, confidence: 0.99 },
                    WordTiming { word: "world".to_string(), start: 0.8, end: 1.4, confidence: 0.98 },
                ],
            }],
            language: "en".to_string(),
        }
    }

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.storage.video_dir = root.join("Video");
        config.storage.audio_dir = root.join("Audio");
        config.storage.captions_dir = root.join("captions");
        config
    }

    fn input_video(root: &Path) -> PathBuf {
        let path = root.join("input.mp4");
        std::fs::write(&path, b"not really a video").unwrap();
        path
    }

    #[tokio::test]
    async fn test_process_video_produces_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_video(dir.path());

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .times(1)
            .returning(|_, _| Ok(sample_transcription()));

        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().times(1).returning(|_, _| Ok(()));
        media
            .expect_burn_subtitles()
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let workflow = Workflow::with_components(
            test_config(dir.path()),
            Box::new(transcriber),
            Box::new(media),
        );

        let report = workflow.process_video(&input, None, false, true).await.unwrap();

        assert!(report.transcript_path.exists());
        assert!(report.srt_path.exists());
        assert!(report.word_timing_path.as_ref().unwrap().exists());
        assert_eq!(report.language, "en");
        assert_eq!(report.stats.word_count, 2);

        let srt = std::fs::read_to_string(&report.srt_path).unwrap();
        assert!(srt.contains("00:00:00,000 --> 00:00:01,500"));
        assert!(srt.contains("Hello world"));
    }

    #[tokio::test]
    async fn test_process_video_karaoke_burns_second_video() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_video(dir.path());

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .returning(|_, _| Ok(sample_transcription()));

        let mut media = MockMediaProcessorTrait::new();
        media.expect_extract_audio().returning(|_, _| Ok(()));
        media.expect_burn_subtitles().returning(|_, _, _, _| Ok(()));
        media.expect_burn_ass().times(1).returning(|_, _, _| Ok(()));

        let workflow = Workflow::with_components(
            test_config(dir.path()),
            Box::new(transcriber),
            Box::new(media),
        );

        let report = workflow.process_video(&input, None, true, true).await.unwrap();
        let karaoke_video = report.karaoke_video_path.unwrap();
        assert!(karaoke_video.to_string_lossy().contains("output_karaoke"));
    }

    #[tokio::test]
    async fn test_unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, b"text").unwrap();

        let workflow = Workflow::with_components(
            test_config(dir.path()),
            Box::new(MockTranscriber::new()),
            Box::new(MockMediaProcessorTrait::new()),
        );

        let err = workflow.process_video(&input, None, false, true).await.unwrap_err();
        assert!(matches!(err, CapgenError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_oversized_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("big.mp4");
        std::fs::write(&input, vec![0u8; 2 * 1024 * 1024]).unwrap();

        let mut config = test_config(dir.path());
        config.storage.max_input_mb = 1;

        let workflow = Workflow::with_components(
            config,
            Box::new(MockTranscriber::new()),
            Box::new(MockMediaProcessorTrait::new()),
        );

        let err = workflow.process_video(&input, None, false, true).await.unwrap_err();
        assert!(matches!(err, CapgenError::Config(_)));
    }

    #[tokio::test]
    async fn test_missing_input_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let workflow = Workflow::with_components(
            test_config(dir.path()),
            Box::new(MockTranscriber::new()),
            Box::new(MockMediaProcessorTrait::new()),
        );

        let err = workflow
            .process_video(dir.path().join("missing.mp4"), None, false, true)
            .await
            .unwrap_err();
        assert!(matches!(err, CapgenError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_transcribe_audio_writes_subtitle_set() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("speech.wav");
        std::fs::write(&audio, b"RIFF").unwrap();

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .returning(|_, _| Ok(sample_transcription()));

        let workflow = Workflow::with_components(
            test_config(dir.path()),
            Box::new(transcriber),
            Box::new(MockMediaProcessorTrait::new()),
        );

        let out_dir = dir.path().join("out");
        let report = workflow.transcribe_audio(&audio, Some(&out_dir)).await.unwrap();

        assert!(report.transcript_path.exists());
        assert!(report.srt_path.exists());
        assert!(report.word_srt_path.as_ref().unwrap().exists());
        assert!(report.word_timing_path.as_ref().unwrap().exists());

        let word_srt = std::fs::read_to_string(report.word_srt_path.unwrap()).unwrap();
        assert!(word_srt.contains("Hello"));
        assert!(word_srt.contains("00:00:00,800 --> 00:00:01,400"));
    }

    #[tokio::test]
    async fn test_burn_karaoke_from_word_timing_json() {
        let dir = tempfile::tempdir().unwrap();
        let video = input_video(dir.path());

        let words = sample_transcription().word_timings();
        let json_path = dir.path().join("word_timing.json");
        subtitle::save_word_timings(&words, &json_path).await.unwrap();

        let mut media = MockMediaProcessorTrait::new();
        media.expect_burn_ass().times(1).returning(|_, _, _| Ok(()));

        let workflow = Workflow::with_components(
            test_config(dir.path()),
            Box::new(MockTranscriber::new()),
            Box::new(media),
        );

        workflow
            .burn(&video, &json_path, &dir.path().join("out.mp4"), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_clean_removes_working_audio() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        config.storage.ensure_directories().unwrap();
        std::fs::write(config.storage.audio_dir.join("stale.wav"), b"x").unwrap();
        std::fs::write(config.storage.captions_dir.join("keep.srt"), b"x").unwrap();

        let workflow = Workflow::with_components(
            config.clone(),
            Box::new(MockTranscriber::new()),
            Box::new(MockMediaProcessorTrait::new()),
        );

        let removed = workflow.clean(false).await.unwrap();
        assert_eq!(removed, 1);
        assert!(config.storage.captions_dir.join("keep.srt").exists());
    }
}
