//! Karaoke-style subtitle generation.
//!
//! Builds an ASS document with one dialogue event per spoken word: the
//! current word highlighted, a couple of already-spoken words and a preview
//! of upcoming words rendered dimmed around it.

use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::config::SubtitleConfig;
use crate::error::{Result, CapgenError};
use crate::subtitle::style::{ass_style_line, inline_color};
use crate::transcribe::WordTiming;

/// Shortest visible span for a single word event
const MIN_WORD_SECS: f64 = 0.1;

/// Generate a karaoke ASS subtitle file from word timing records
pub async fn generate_karaoke_ass<P: AsRef<Path>>(
    words: &[WordTiming],
    config: &SubtitleConfig,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(
        "Generating karaoke subtitles ({} words): {}",
        words.len(),
        output_path.display()
    );

    fs::write(output_path, ass_document(words, config)?)
        .await
        .map_err(CapgenError::Io)?;

    Ok(())
}

/// Compose the complete ASS document
pub fn ass_document(words: &[WordTiming], config: &SubtitleConfig) -> Result<String> {
    let mut doc = String::new();

    doc.push_str(
        "[Script Info]\n\
         Title: Karaoke Captions\n\
         ScriptType: v4.00+\n\
         PlayResX: 1280\n\
         PlayResY: 720\n\
         WrapStyle: 0\n\
         ScaledBorderAndShadow: yes\n\n",
    );

    doc.push_str(
        "[V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
         BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
         BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
    );
    doc.push_str(&ass_style_line(config)?);
    doc.push_str("\n\n");

    doc.push_str(
        "[Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
    );

    for (idx, word) in words.iter().enumerate() {
        let text = display_line(words, idx, config)?;
        let end = word.end.max(word.start + MIN_WORD_SECS);

        doc.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            format_ass_time(word.start),
            format_ass_time(end),
            text
        ));
    }

    Ok(doc)
}

/// Build the styled text for one word event: dimmed trailing context, the
/// highlighted current word, dimmed upcoming preview.
fn display_line(words: &[WordTiming], idx: usize, config: &SubtitleConfig) -> Result<String> {
    let dim = inline_color(&config.context_color)?;
    let highlight = inline_color(&config.highlight_color)?;

    let mut parts = Vec::new();

    let before_start = idx.saturating_sub(config.context_words_before);
    if before_start < idx {
        let previous = words[before_start..idx]
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        parts.push(format!("{}{}", dim, previous));
    }

    parts.push(format!("{}{{\\b1}}{}{{\\b0}}", highlight, words[idx].word));

    let after_end = (idx + 1 + config.context_words_after).min(words.len());
    if idx + 1 < after_end {
        let upcoming = words[idx + 1..after_end]
            .iter()
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        parts.push(format!("{}{}", dim, upcoming));
    }

    Ok(parts.join(" "))
}

/// Format time in seconds to ASS time format (H:MM:SS.cc)
pub fn format_ass_time(seconds: f64) -> String {
    let total_centiseconds = (seconds * 100.0).round() as u64;
    let hours = total_centiseconds / 360_000;
    let minutes = (total_centiseconds % 360_000) / 6_000;
    let secs = (total_centiseconds % 6_000) / 100;
    let centis = total_centiseconds % 100;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}
