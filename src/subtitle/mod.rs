pub mod karaoke;
pub mod style;

use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{Result, CapgenError};
use crate::transcribe::{Transcription, WordTiming};

/// Generate a segment-level SRT subtitle file from a transcription
pub async fn generate_srt<P: AsRef<Path>>(
    transcription: &Transcription,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    fs::write(output_path, segment_srt(transcription))
        .await
        .map_err(CapgenError::Io)?;

    Ok(())
}

/// Generate a word-level SRT subtitle file (one cue per word)
pub async fn generate_word_srt<P: AsRef<Path>>(
    transcription: &Transcription,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating word-level SRT file: {}", output_path.display());

    fs::write(output_path, word_srt(transcription))
        .await
        .map_err(CapgenError::Io)?;

    Ok(())
}

/// Compose segment-level SRT content
pub fn segment_srt(transcription: &Transcription) -> String {
    let mut content = String::new();
    for (index, segment) in transcription.segments.iter().enumerate() {
        push_cue(&mut content, index + 1, segment.start, segment.end, segment.text.trim());
    }
    content
}

/// Compose word-level SRT content. Segments without word detail fall back to
/// one cue for the whole segment.
pub fn word_srt(transcription: &Transcription) -> String {
    let mut content = String::new();
    let mut index = 1;

    for segment in &transcription.segments {
        if segment.words.is_empty() {
            push_cue(&mut content, index, segment.start, segment.end, segment.text.trim());
            index += 1;
        } else {
            for word in &segment.words {
                push_cue(&mut content, index, word.start, word.end, word.word.trim());
                index += 1;
            }
        }
    }

    content
}

fn push_cue(content: &mut String, index: usize, start: f64, end: f64, text: &str) {
    content.push_str(&format!(
        "{}\n{} --> {}\n{}\n\n",
        index,
        format_srt_time(start),
        format_srt_time(end),
        text
    ));
}

/// Save word timing records as pretty-printed JSON
pub async fn save_word_timings<P: AsRef<Path>>(words: &[WordTiming], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Saving word timing JSON: {}", output_path.display());

    let json = serde_json::to_string_pretty(words)?;
    fs::write(output_path, json).await.map_err(CapgenError::Io)?;

    Ok(())
}

/// Load word timing records from a JSON file
pub async fn load_word_timings<P: AsRef<Path>>(path: P) -> Result<Vec<WordTiming>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CapgenError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path).await.map_err(CapgenError::Io)?;
    Ok(serde_json::from_str(&content)?)
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::TranscriptionSegment;

    fn sample() -> Transcription {
        Transcription {
            text: "Hello world Goodbye".to_string(),
            segments: vec![
                TranscriptionSegment {
                    id: 0,
                    start: 0.0,
                    end: 1.5,
                    text: "Hello world".to_string(),
                    words: vec![
                        WordTiming { word: "Hello".to_string(), start: 0.0, end: 0.7, confidence: 0.99 },
                        WordTiming { word: "world".to_string(), start: 0.8, end: 1.4, confidence: 0.98 },
                    ],
                },
                TranscriptionSegment {
                    id: 1,
                    start: 2.0,
                    end: 3.0,
                    text: "Goodbye".to_string(),
                    words: vec![],
                },
            ],
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[test]
    fn test_segment_srt() {
        let srt = segment_srt(&sample());
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:01,500\nHello world\n\n\
             2\n00:00:02,000 --> 00:00:03,000\nGoodbye\n\n"
        );
    }

    #[test]
    fn test_word_srt_with_segment_fallback() {
        let srt = word_srt(&sample());
        // Two word cues from the first segment, one fallback cue from the second
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:00,700\nHello\n\n"));
        assert!(srt.contains("2\n00:00:00,800 --> 00:00:01,400\nworld\n\n"));
        assert!(srt.ends_with("3\n00:00:02,000 --> 00:00:03,000\nGoodbye\n\n"));
    }

    #[test]
    fn test_empty_transcription_yields_empty_srt() {
        let transcription = Transcription {
            text: String::new(),
            segments: vec![],
            language: "en".to_string(),
        };
        assert!(segment_srt(&transcription).is_empty());
        assert!(word_srt(&transcription).is_empty());
    }

    #[tokio::test]
    async fn test_word_timing_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("word_timing.json");

        let words = sample().word_timings();
        save_word_timings(&words, &path).await.unwrap();
        let loaded = load_word_timings(&path).await.unwrap();

        assert_eq!(loaded, words);
    }
}
