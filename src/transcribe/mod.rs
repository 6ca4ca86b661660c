// Modular transcription architecture
//
// Speech recognition is delegated entirely to external whisper programs;
// each implementation invokes one engine and maps its JSON output into the
// engine-agnostic Transcription model:
// - WhisperCpp: whisper.cpp via the whisper-cli binary
// - OpenAi: OpenAI Whisper Python command-line tool

pub mod common;
pub mod openai;
pub mod whisper_cpp;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;

use crate::config::{TranscriberConfig, TranscriberEngine};
use crate::error::Result;

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file, optionally with a source language hint
    async fn transcribe<'a>(&self, audio_path: &Path, language: Option<&'a str>) -> Result<Transcription>;

    /// Check that the engine binary can be executed
    fn check_availability(&self) -> Result<()>;

    /// Human-readable engine name for logs and diagnostics
    fn engine_name(&self) -> &'static str;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create(config: TranscriberConfig) -> Box<dyn Transcriber> {
        match config.engine {
            TranscriberEngine::WhisperCpp => {
                Box::new(whisper_cpp::WhisperCppTranscriber::new(config))
            }
            TranscriberEngine::OpenAi => Box::new(openai::OpenAiTranscriber::new(config)),
        }
    }
}
