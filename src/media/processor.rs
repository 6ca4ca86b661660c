use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, CapgenError};
use super::{MediaCommandBuilder, MediaProcessorTrait};

/// ffmpeg-backed media processor
pub struct FfmpegProcessor {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl FfmpegProcessor {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(config.clone());

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for FfmpegProcessor {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!(
            "Extracting audio from {} to {}",
            video_path.display(),
            audio_path.display()
        );

        let command = self.command_builder.extract_audio(video_path, audio_path);
        match command.execute().await {
            // ffmpeg reports a video without sound as an output with no streams
            Err(CapgenError::Media(msg)) if msg.contains("does not contain any stream") => {
                Err(CapgenError::Media(format!(
                    "No audio track found in {}",
                    video_path.display()
                )))
            }
            other => other,
        }?;

        info!("Audio extraction completed");
        Ok(())
    }

    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
        force_style: &str,
    ) -> Result<()> {
        info!(
            "Burning subtitles from {} into {} -> {}",
            subtitle_path.display(),
            video_path.display(),
            output_path.display()
        );

        let command =
            self.command_builder
                .burn_srt(video_path, subtitle_path, output_path, force_style);
        command.execute().await?;

        info!("Subtitle burn-in completed");
        Ok(())
    }

    async fn burn_ass(
        &self,
        video_path: &Path,
        ass_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Burning karaoke subtitles from {} into {} -> {}",
            ass_path.display(),
            video_path.display(),
            output_path.display()
        );

        let command = self
            .command_builder
            .burn_ass(video_path, ass_path, output_path);
        command.execute().await?;

        info!("Karaoke burn-in completed");
        Ok(())
    }

    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| CapgenError::Media(format!("ffmpeg not found: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CapgenError::Media(
                "ffmpeg version check failed".to_string(),
            ))
        }
    }

    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting ffmpeg version information");

        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| CapgenError::Media(format!("Failed to execute ffmpeg: {}", e)))?;

        if output.status.success() {
            let version_info = String::from_utf8_lossy(&output.stdout);
            let first_line = version_info.lines().next().unwrap_or("Unknown version");
            Ok(first_line.to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(CapgenError::Media(format!(
                "ffmpeg version check failed: {}",
                stderr
            )))
        }
    }
}
