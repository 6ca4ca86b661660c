// OpenAI Whisper Python implementation
//
// Drives the `whisper` command-line tool and parses its JSON output,
// including per-word timestamps when requested.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::config::TranscriberConfig;
use crate::error::{Result, CapgenError};
use crate::transcribe::{Transcriber, Transcription, TranscriptionSegment, WordTiming};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiWhisperOutput {
    pub text: String,
    pub segments: Vec<OpenAiWhisperSegment>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiWhisperSegment {
    pub id: u64,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Vec<OpenAiWhisperWord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiWhisperWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub probability: Option<f64>,
}

impl From<OpenAiWhisperOutput> for Transcription {
    fn from(output: OpenAiWhisperOutput) -> Self {
        let segments = output
            .segments
            .into_iter()
            .map(|seg| TranscriptionSegment {
                id: seg.id as i32,
                start: seg.start,
                end: seg.end,
                text: seg.text.trim().to_string(),
                words: seg
                    .words
                    .into_iter()
                    .map(|w| WordTiming {
                        word: w.word.trim().to_string(),
                        start: w.start,
                        end: w.end,
                        confidence: w.probability.unwrap_or(1.0),
                    })
                    .collect(),
            })
            .collect();

        Transcription {
            text: output.text.trim().to_string(),
            segments,
            language: output.language.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

pub struct OpenAiTranscriber {
    config: TranscriberConfig,
}

impl OpenAiTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe<'a>(&self, audio_path: &Path, language: Option<&'a str>) -> Result<Transcription> {
        info!(
            "Transcribing {} with OpenAI Whisper (model: {})",
            audio_path.display(),
            self.config.model
        );

        // Whisper writes <stem>.json into the output directory
        let temp_dir = tempfile::tempdir()
            .map_err(|e| CapgenError::Transcriber(format!("Failed to create temp directory: {}", e)))?;

        let mut cmd = Command::new(&self.config.openai_binary);
        cmd.arg(audio_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_dir").arg(temp_dir.path())
            .arg("--output_format").arg("json")
            .arg("--temperature").arg(self.config.temperature.to_string());

        if self.config.word_timestamps {
            cmd.arg("--word_timestamps").arg("True");
        }
        if let Some(lang) = language {
            cmd.arg("--language").arg(lang);
        }

        debug!("Running {:?}", cmd);
        let output = cmd.output()
            .map_err(|e| CapgenError::Transcriber(format!("Failed to execute whisper: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CapgenError::Transcriber(format!(
                "OpenAI Whisper failed: {}",
                stderr
            )));
        }

        let audio_stem = audio_path
            .file_stem()
            .ok_or_else(|| CapgenError::Transcriber("Invalid audio filename".to_string()))?;
        let json_path = temp_dir
            .path()
            .join(format!("{}.json", audio_stem.to_string_lossy()));

        let json_content = std::fs::read_to_string(&json_path)
            .map_err(|e| CapgenError::Transcriber(format!("Failed to read whisper output: {}", e)))?;

        let parsed: OpenAiWhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| CapgenError::Transcriber(format!("Failed to parse whisper JSON: {}", e)))?;

        Ok(parsed.into())
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.openai_binary)
            .arg("--help")
            .output()
            .map_err(|e| CapgenError::Transcriber(format!(
                "whisper not found ({}): {}. Install with: pip install openai-whisper",
                self.config.openai_binary, e
            )))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CapgenError::Transcriber(
                "whisper is present but not runnable".to_string(),
            ))
        }
    }

    fn engine_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_with_words() {
        let json = r#"{
            "text": " Hello there.",
            "segments": [
                {
                    "id": 0,
                    "seek": 0,
                    "start": 0.0,
                    "end": 1.2,
                    "text": " Hello there.",
                    "temperature": 0.0,
                    "avg_logprob": -0.2,
                    "words": [
                        { "word": " Hello", "start": 0.0, "end": 0.5, "probability": 0.99 },
                        { "word": " there.", "start": 0.6, "end": 1.1, "probability": 0.97 }
                    ]
                }
            ],
            "language": "en"
        }"#;

        let parsed: OpenAiWhisperOutput = serde_json::from_str(json).unwrap();
        let transcription: Transcription = parsed.into();

        assert_eq!(transcription.text, "Hello there.");
        assert_eq!(transcription.language, "en");
        let words = &transcription.segments[0].words;
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "Hello");
        assert!((words[1].confidence - 0.97).abs() < 1e-9);
    }

    #[test]
    fn test_parse_output_without_words() {
        let json = r#"{
            "text": "Short clip",
            "segments": [
                { "id": 0, "start": 0.0, "end": 2.0, "text": "Short clip" }
            ],
            "language": null
        }"#;

        let parsed: OpenAiWhisperOutput = serde_json::from_str(json).unwrap();
        let transcription: Transcription = parsed.into();

        assert_eq!(transcription.language, "unknown");
        assert!(transcription.segments[0].words.is_empty());
    }
}
