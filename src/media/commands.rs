use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::config::MediaConfig;
use crate::error::{Result, CapgenError};

/// Abstract ffmpeg command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .map_err(|e| CapgenError::Media(format!("Failed to execute ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CapgenError::Media(format!(
                "{} failed: {}",
                self.description, stderr
            )));
        }

        Ok(())
    }
}

/// Quote a path for use inside an ffmpeg filter argument. The filtergraph
/// parser splits on unquoted colons and commas.
fn quote_filter_value(value: &str) -> String {
    format!("'{}'", value.replace('\\', "/").replace('\'', "\\'"))
}

/// Builder for the ffmpeg operations capgen needs
pub struct MediaCommandBuilder {
    config: MediaConfig,
}

impl MediaCommandBuilder {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Extraction targeted at whisper input: 16 kHz mono 16-bit PCM
    pub fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> MediaCommand {
        MediaCommand::new(&self.config.binary_path, "Audio extraction")
            .input(video_path)
            .no_video()
            .audio_codec("pcm_s16le")
            .audio_sample_rate(16000)
            .audio_channels(1)
            .overwrite()
            .output(audio_path)
    }

    /// Burn SRT cues via the subtitles filter with a force_style override
    pub fn burn_srt<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitle_path: P,
        output_path: P,
        force_style: &str,
    ) -> MediaCommand {
        let filter = format!(
            "subtitles=filename={}:force_style='{}'",
            quote_filter_value(&subtitle_path.as_ref().to_string_lossy()),
            force_style,
        );
        self.burn_with_filter(video_path, output_path, filter, "Subtitle burn-in")
    }

    /// Burn a pre-styled ASS document via the ass filter
    pub fn burn_ass<P: AsRef<Path>>(
        &self,
        video_path: P,
        ass_path: P,
        output_path: P,
    ) -> MediaCommand {
        let filter = format!(
            "ass=filename={}",
            quote_filter_value(&ass_path.as_ref().to_string_lossy()),
        );
        self.burn_with_filter(video_path, output_path, filter, "Karaoke subtitle burn-in")
    }

    fn burn_with_filter<P: AsRef<Path>>(
        &self,
        video_path: P,
        output_path: P,
        filter: String,
        description: &str,
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.config.binary_path, description)
            .overwrite()
            .input(video_path)
            .video_filter(filter)
            .video_codec(&self.config.video_codec)
            .arg("-crf")
            .arg(self.config.crf.to_string());

        if self.config.threads > 0 {
            cmd = cmd.arg("-threads").arg(self.config.threads.to_string());
        }

        cmd.args(self.config.extra_options.iter().cloned())
            .audio_codec(&self.config.audio_codec)
            .output(output_path)
    }

    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.config.binary_path, "Version check").arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn builder() -> MediaCommandBuilder {
        MediaCommandBuilder::new(MediaConfig {
            binary_path: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            crf: 23,
            threads: 0,
            extra_options: vec![],
        })
    }

    #[test]
    fn test_extract_audio_args() {
        let cmd = builder().extract_audio(PathBuf::from("in.mp4"), PathBuf::from("out.wav"));
        assert_eq!(
            cmd.args,
            vec![
                "-i", "in.mp4", "-vn", "-c:a", "pcm_s16le", "-ar", "16000", "-ac", "1", "-y",
                "out.wav"
            ]
        );
    }

    #[test]
    fn test_burn_srt_args() {
        let cmd = builder().burn_srt(
            PathBuf::from("in.mp4"),
            PathBuf::from("captions/subs.srt"),
            PathBuf::from("out.mp4"),
            "FontSize=28",
        );

        let vf_pos = cmd.args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(
            cmd.args[vf_pos + 1],
            "subtitles=filename='captions/subs.srt':force_style='FontSize=28'"
        );
        assert!(cmd.args.contains(&"-crf".to_string()));
        assert!(cmd.args.contains(&"aac".to_string()));
        assert_eq!(cmd.args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_burn_threads_and_extra_options() {
        let config = MediaConfig {
            binary_path: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            crf: 20,
            threads: 4,
            extra_options: vec!["-preset".to_string(), "fast".to_string()],
        };

        let cmd = MediaCommandBuilder::new(config).burn_ass(
            PathBuf::from("in.mp4"),
            PathBuf::from("words.ass"),
            PathBuf::from("out.mp4"),
        );

        assert!(cmd.args.windows(2).any(|w| w == ["-threads", "4"]));
        assert!(cmd.args.windows(2).any(|w| w == ["-preset", "fast"]));
        let vf_pos = cmd.args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(cmd.args[vf_pos + 1], "ass=filename='words.ass'");
    }

    #[test]
    fn test_filter_path_quoting() {
        assert_eq!(quote_filter_value("a'b.srt"), "'a\\'b.srt'");
        assert_eq!(quote_filter_value("C:\\clips\\a.srt"), "'C:/clips/a.srt'");
    }
}
