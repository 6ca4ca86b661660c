//! Styling for burned-in subtitles.
//!
//! ffmpeg renders SRT cues through libass, so styling is expressed as an ASS
//! `force_style` override string. ASS colours are `&HAABBGGRR` with an
//! inverted alpha channel (00 = opaque).

use crate::config::{BackgroundStyle, SubtitleConfig};
use crate::error::{Result, CapgenError};

/// Convert a `#RRGGBB` hex colour to the ASS BGR byte order
pub fn hex_to_ass_bgr(hex: &str) -> Result<String> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CapgenError::Subtitle(format!("Invalid color: {}", hex)));
    }

    let (r, g, b) = (&digits[0..2], &digits[2..4], &digits[4..6]);
    Ok(format!("{}{}{}", b, g, r).to_uppercase())
}

/// Opaque ASS colour for style definitions, e.g. `&H00FFFFFF`
pub fn ass_color(hex: &str) -> Result<String> {
    Ok(format!("&H00{}", hex_to_ass_bgr(hex)?))
}

/// Inline colour override tag for dialogue text, e.g. `{\c&HFFFFFF&}`
pub fn inline_color(hex: &str) -> Result<String> {
    Ok(format!("{{\\c&H{}&}}", hex_to_ass_bgr(hex)?))
}

/// Background box colour and border style for a background choice.
/// Returns (BorderStyle, BackColour); BorderStyle 3 draws an opaque box,
/// BorderStyle 1 draws outline only.
fn background_ass(background: BackgroundStyle) -> (u8, &'static str) {
    match background {
        BackgroundStyle::Black => (3, "&H00000000"),
        BackgroundStyle::White => (3, "&H00FFFFFF"),
        BackgroundStyle::SemiTransparent => (3, "&H80000000"),
        BackgroundStyle::Transparent => (1, "&H00000000"),
    }
}

/// Build the libass `force_style` override string for segment-level burns
pub fn force_style(config: &SubtitleConfig) -> Result<String> {
    let (border_style, back_color) = background_ass(config.background);

    Ok(format!(
        "FontName={},FontSize={},PrimaryColour={},BorderStyle={},BackColour={},Alignment=2",
        config.font,
        config.font_size,
        ass_color(&config.text_color)?,
        border_style,
        back_color,
    ))
}

/// Build the `[V4+ Styles]` line used by generated ASS documents
pub fn ass_style_line(config: &SubtitleConfig) -> Result<String> {
    let (border_style, back_color) = background_ass(config.background);

    Ok(format!(
        "Style: Default,{},{},{},&H000000FF,&H00000000,{},1,0,0,0,100,100,0,0,{},2,0,2,20,20,40,1",
        config.font,
        config.font_size,
        ass_color(&config.text_color)?,
        back_color,
        border_style,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SubtitleConfig {
        SubtitleConfig {
            font: "Arial".to_string(),
            font_size: 28,
            text_color: "#FFFFFF".to_string(),
            background: BackgroundStyle::Black,
            highlight_color: "#FFFF00".to_string(),
            context_color: "#808080".to_string(),
            context_words_after: 3,
            context_words_before: 2,
        }
    }

    #[test]
    fn test_hex_to_ass_bgr_swaps_channels() {
        assert_eq!(hex_to_ass_bgr("#FFFF00").unwrap(), "00FFFF");
        assert_eq!(hex_to_ass_bgr("#123456").unwrap(), "563412");
        assert_eq!(hex_to_ass_bgr("808080").unwrap(), "808080");
    }

    #[test]
    fn test_invalid_color_rejected() {
        assert!(hex_to_ass_bgr("#FFF").is_err());
        assert!(hex_to_ass_bgr("#GGHHII").is_err());
    }

    #[test]
    fn test_force_style_black_box() {
        let style = force_style(&config()).unwrap();
        assert!(style.contains("FontName=Arial"));
        assert!(style.contains("FontSize=28"));
        assert!(style.contains("PrimaryColour=&H00FFFFFF"));
        assert!(style.contains("BorderStyle=3"));
        assert!(style.contains("BackColour=&H00000000"));
    }

    #[test]
    fn test_force_style_transparent_background() {
        let mut cfg = config();
        cfg.background = BackgroundStyle::Transparent;
        let style = force_style(&cfg).unwrap();
        assert!(style.contains("BorderStyle=1"));
    }

    #[test]
    fn test_inline_color() {
        assert_eq!(inline_color("#FFFF00").unwrap(), "{\\c&H00FFFF&}");
    }
}
