// Modular media processing architecture
//
// All video and audio handling is delegated to ffmpeg:
// - Commands: ffmpeg argument builders
// - Processor: ffmpeg-backed implementation of the processing trait

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Extract the audio track into a 16 kHz mono WAV file
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Burn SRT subtitles into the video, styled with a force_style override
    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
        force_style: &str,
    ) -> Result<()>;

    /// Burn a pre-styled ASS subtitle file into the video
    async fn burn_ass(
        &self,
        video_path: &Path,
        ass_path: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Check that ffmpeg can be executed
    fn check_availability(&self) -> Result<()>;

    /// First line of ffmpeg version output
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (ffmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::FfmpegProcessor::new(config))
    }
}
