use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, CapgenError};

fn default_context_words_after() -> usize {
    3
}

fn default_context_words_before() -> usize {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub subtitle: SubtitleConfig,
    pub media: MediaConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Engine used for speech recognition
    pub engine: TranscriberEngine,
    /// Path to the whisper.cpp binary (whisper-cli)
    pub whisper_cpp_binary: String,
    /// Path to the OpenAI Whisper command-line tool
    pub openai_binary: String,
    /// Model to use for transcription (name or path to a ggml file)
    pub model: String,
    /// Source language hint; unset means auto-detect
    pub language: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Request per-word timestamps from the engine
    pub word_timestamps: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriberEngine {
    /// whisper.cpp via the whisper-cli binary
    WhisperCpp,
    /// OpenAI Whisper Python command-line tool
    OpenAi,
}

impl std::fmt::Display for TranscriberEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriberEngine::WhisperCpp => write!(f, "whisper-cpp"),
            TranscriberEngine::OpenAi => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleConfig {
    /// Font family used for burned-in subtitles
    pub font: String,
    /// Font size in points
    pub font_size: u32,
    /// Subtitle text color as #RRGGBB
    pub text_color: String,
    /// Background style behind the text
    pub background: BackgroundStyle,
    /// Color of the currently spoken word in karaoke mode
    pub highlight_color: String,
    /// Color of surrounding context words in karaoke mode
    pub context_color: String,
    /// Upcoming words shown after the current word in karaoke mode
    #[serde(default = "default_context_words_after")]
    pub context_words_after: usize,
    /// Already spoken words kept before the current word in karaoke mode
    #[serde(default = "default_context_words_before")]
    pub context_words_before: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundStyle {
    Black,
    White,
    Transparent,
    SemiTransparent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Video codec for re-encoding (libx264 is most compatible)
    pub video_codec: String,
    /// Audio codec for re-encoding
    pub audio_codec: String,
    /// Constant rate factor, 0-51, lower is better quality
    pub crf: u32,
    /// Encoder thread count, 0 means auto
    pub threads: u32,
    /// Additional encoder options appended to burn commands
    pub extra_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for input copies and burned output videos
    pub video_dir: PathBuf,
    /// Directory for extracted audio working files
    pub audio_dir: PathBuf,
    /// Directory for subtitle artifacts (SRT, word timing, transcripts)
    pub captions_dir: PathBuf,
    /// Maximum accepted input size in megabytes
    pub max_input_mb: u64,
    /// Remove extracted audio after a successful pipeline run
    pub auto_cleanup: bool,
}

impl StorageConfig {
    /// Create all working directories
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.video_dir, &self.audio_dir, &self.captions_dir] {
            std::fs::create_dir_all(dir)
                .map_err(|e| CapgenError::Config(format!(
                    "Failed to create directory {}: {}", dir.display(), e
                )))?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcriber: TranscriberConfig {
                engine: TranscriberEngine::WhisperCpp,
                whisper_cpp_binary: "whisper-cli".to_string(),
                openai_binary: "whisper".to_string(),
                model: "base".to_string(),
                language: None,
                temperature: 0.0,
                word_timestamps: true,
            },
            subtitle: SubtitleConfig {
                font: "Arial".to_string(),
                font_size: 28,
                text_color: "#FFFFFF".to_string(),
                background: BackgroundStyle::Black,
                highlight_color: "#FFFF00".to_string(),
                context_color: "#808080".to_string(),
                context_words_after: 3,
                context_words_before: 2,
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                video_codec: "libx264".to_string(),
                audio_codec: "aac".to_string(),
                crf: 23,
                threads: 0,
                extra_options: vec![
                    // Example options users can add:
                    // "-preset".to_string(), "medium".to_string(),   // Encoding speed
                    // "-pix_fmt".to_string(), "yuv420p".to_string(), // Player compatibility
                ],
            },
            storage: StorageConfig {
                video_dir: PathBuf::from("Video"),
                audio_dir: PathBuf::from("Audio"),
                captions_dir: PathBuf::from("captions"),
                max_input_mb: 1000,
                auto_cleanup: true,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CapgenError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| CapgenError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CapgenError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CapgenError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.transcriber.model, "base");
        assert_eq!(parsed.transcriber.engine, TranscriberEngine::WhisperCpp);
        assert_eq!(parsed.subtitle.font_size, 28);
        assert_eq!(parsed.media.crf, 23);
        assert_eq!(parsed.storage.video_dir, PathBuf::from("Video"));
    }

    #[test]
    fn test_partial_subtitle_section_uses_defaults() {
        let toml_str = r##"
            [transcriber]
            engine = "openai"
            whisper_cpp_binary = "whisper-cli"
            openai_binary = "whisper"
            model = "small"
            temperature = 0.0
            word_timestamps = true

            [subtitle]
            font = "Helvetica"
            font_size = 32
            text_color = "#FFFFFF"
            background = "semi-transparent"
            highlight_color = "#FFFF00"
            context_color = "#808080"

            [media]
            binary_path = "ffmpeg"
            video_codec = "libx264"
            audio_codec = "aac"
            crf = 20
            threads = 0
            extra_options = []

            [storage]
            video_dir = "Video"
            audio_dir = "Audio"
            captions_dir = "captions"
            max_input_mb = 500
            auto_cleanup = false
        "##;

        let parsed: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.transcriber.engine, TranscriberEngine::OpenAi);
        assert_eq!(parsed.subtitle.background, BackgroundStyle::SemiTransparent);
        assert_eq!(parsed.subtitle.context_words_after, 3);
        assert_eq!(parsed.subtitle.context_words_before, 2);
    }
}
