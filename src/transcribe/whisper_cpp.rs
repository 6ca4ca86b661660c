use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::config::TranscriberConfig;
use crate::error::{Result, CapgenError};
use crate::transcribe::{Transcriber, Transcription, TranscriptionSegment, WordTiming};

/// whisper.cpp full JSON output (--output-json-full)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCliOutput {
    pub result: WhisperCliResult,
    pub transcription: Vec<WhisperCliSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCliResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCliSegment {
    pub offsets: WhisperCliOffsets,
    pub text: String,
    #[serde(default)]
    pub tokens: Vec<WhisperCliToken>,
}

/// Millisecond offsets from the start of the audio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCliOffsets {
    pub from: i64,
    pub to: i64,
}

/// Token entry of the full JSON output. Depending on the whisper.cpp build,
/// timing arrives as millisecond offsets or as t0/t1 centiseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCliToken {
    pub text: String,
    pub p: Option<f64>,
    pub offsets: Option<WhisperCliOffsets>,
    pub t0: Option<i64>,
    pub t1: Option<i64>,
}

impl WhisperCliToken {
    fn span_secs(&self) -> Option<(f64, f64)> {
        if let Some(offsets) = &self.offsets {
            return Some((offsets.from as f64 / 1000.0, offsets.to as f64 / 1000.0));
        }
        match (self.t0, self.t1) {
            (Some(t0), Some(t1)) => Some((t0 as f64 / 100.0, t1 as f64 / 100.0)),
            _ => None,
        }
    }

    /// Special markers like [_BEG_] or <|endoftext|> carry no speech
    fn is_special(&self) -> bool {
        let text = self.text.trim();
        text.is_empty() || text.starts_with('[') || text.starts_with('<')
    }
}

/// Merge sub-word token pieces into words. A piece with leading whitespace
/// starts a new word; anything else extends the previous one.
fn collect_words(tokens: &[WhisperCliToken]) -> Vec<WordTiming> {
    let mut words: Vec<WordTiming> = Vec::new();

    for token in tokens {
        if token.is_special() {
            continue;
        }
        let Some((start, end)) = token.span_secs() else {
            continue;
        };
        let confidence = token.p.unwrap_or(1.0);

        let continues_word = !token.text.starts_with(char::is_whitespace);
        match words.last_mut() {
            Some(last) if continues_word => {
                last.word.push_str(token.text.trim_end());
                last.end = end.max(last.end);
                last.confidence = last.confidence.min(confidence);
            }
            _ => words.push(WordTiming {
                word: token.text.trim().to_string(),
                start,
                end,
                confidence,
            }),
        }
    }

    words
}

impl From<WhisperCliOutput> for Transcription {
    fn from(output: WhisperCliOutput) -> Self {
        let language = output.result.language;

        let text = output
            .transcription
            .iter()
            .map(|seg| seg.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let segments = output
            .transcription
            .into_iter()
            .enumerate()
            .map(|(id, seg)| TranscriptionSegment {
                id: id as i32,
                start: seg.offsets.from as f64 / 1000.0,
                end: seg.offsets.to as f64 / 1000.0,
                text: seg.text.trim().to_string(),
                words: collect_words(&seg.tokens),
            })
            .collect();

        Transcription {
            text,
            segments,
            language,
        }
    }
}

/// whisper.cpp implementation driving the whisper-cli binary
pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe<'a>(&self, audio_path: &Path, language: Option<&'a str>) -> Result<Transcription> {
        info!("Transcribing {} with whisper-cli", audio_path.display());

        let temp_dir = tempfile::tempdir()
            .map_err(|e| CapgenError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_base = temp_dir.path().join("transcription");

        let mut cmd = Command::new(&self.config.whisper_cpp_binary);
        cmd.arg("-m").arg(&self.config.model)
            .arg("-f").arg(audio_path)
            .arg("-l").arg(language.unwrap_or("auto"))
            .arg("-of").arg(&output_base);

        if self.config.word_timestamps {
            cmd.arg("--output-json-full")
                .arg("--split-on-word");
        } else {
            cmd.arg("--output-json");
        }

        debug!("Running {:?}", cmd);
        let output = cmd.output()
            .map_err(|e| CapgenError::Transcriber(format!("Failed to execute whisper-cli: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CapgenError::Transcriber(format!(
                "whisper-cli failed: {}",
                stderr
            )));
        }

        let json_path = output_base.with_extension("json");
        let json_content = std::fs::read_to_string(&json_path)
            .map_err(|e| CapgenError::Transcriber(format!("Failed to read whisper-cli output: {}", e)))?;

        let parsed: WhisperCliOutput = serde_json::from_str(&json_content)
            .map_err(|e| CapgenError::Transcriber(format!("Failed to parse whisper-cli JSON: {}", e)))?;

        Ok(parsed.into())
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.whisper_cpp_binary)
            .arg("--help")
            .output()
            .map_err(|e| CapgenError::Transcriber(format!(
                "whisper-cli not found ({}): {}",
                self.config.whisper_cpp_binary, e
            )))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CapgenError::Transcriber(
                "whisper-cli is present but not runnable".to_string(),
            ))
        }
    }

    fn engine_name(&self) -> &'static str {
        "whisper-cpp"
    }
}
