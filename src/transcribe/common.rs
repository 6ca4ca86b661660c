use serde::{Deserialize, Serialize};

/// Engine-agnostic transcription result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<TranscriptionSegment>,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    pub id: i32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
    /// Per-word timing, empty when the engine returned none
    pub words: Vec<WordTiming>,
}

/// A single word with its spoken time span.
///
/// Serialized as the word timing JSON artifact, so field names are part of
/// the output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
}

/// Summary numbers shown after transcription
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptStats {
    pub word_count: usize,
    pub char_count: usize,
    pub duration_secs: f64,
    pub avg_word_secs: f64,
}

impl Transcription {
    /// Flatten the per-word timing of all segments, in spoken order.
    pub fn word_timings(&self) -> Vec<WordTiming> {
        self.segments
            .iter()
            .flat_map(|seg| seg.words.iter().cloned())
            .collect()
    }

    /// Like [`word_timings`](Self::word_timings), but segments without word
    /// detail contribute evenly-spaced estimates derived from the segment
    /// span, so the result covers the whole transcript.
    pub fn word_timings_or_estimated(&self) -> Vec<WordTiming> {
        let mut words = Vec::new();
        for seg in &self.segments {
            if seg.words.is_empty() {
                words.extend(estimate_segment_words(seg));
            } else {
                words.extend(seg.words.iter().cloned());
            }
        }
        words
    }

    pub fn stats(&self) -> TranscriptStats {
        let words = self.word_timings_or_estimated();
        let word_count = words.len();
        let duration_secs = words.last().map(|w| w.end).unwrap_or(0.0);
        let avg_word_secs = if word_count > 0 {
            duration_secs / word_count as f64
        } else {
            0.0
        };

        TranscriptStats {
            word_count,
            char_count: self.text.chars().count(),
            duration_secs,
            avg_word_secs,
        }
    }
}

/// Split a segment's text on whitespace and spread the words evenly over the
/// segment span. Used when an engine returns segment timing only.
fn estimate_segment_words(segment: &TranscriptionSegment) -> Vec<WordTiming> {
    let parts: Vec<&str> = segment.text.split_whitespace().collect();
    if parts.is_empty() {
        return Vec::new();
    }

    let duration = (segment.end - segment.start).max(0.0);
    let per_word = duration / parts.len() as f64;

    parts
        .iter()
        .enumerate()
        .map(|(i, part)| WordTiming {
            word: part.trim().to_string(),
            start: segment.start + i as f64 * per_word,
            end: segment.start + (i + 1) as f64 * per_word,
            confidence: 1.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str, words: Vec<WordTiming>) -> TranscriptionSegment {
        TranscriptionSegment {
            id: 0,
            start,
            end,
            text: text.to_string(),
            words,
        }
    }

    fn word(word: &str, start: f64, end: f64) -> WordTiming {
        WordTiming {
            word: word.to_string(),
            start,
            end,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_estimated_words_spread_over_segment() {
        let transcription = Transcription {
            text: "one two three four".to_string(),
            segments: vec![segment(10.0, 12.0, "one two three four", vec![])],
            language: "en".to_string(),
        };

        let words = transcription.word_timings_or_estimated();
        assert_eq!(words.len(), 4);
        assert_eq!(words[0].word, "one");
        assert!((words[0].start - 10.0).abs() < 1e-9);
        assert!((words[0].end - 10.5).abs() < 1e-9);
        assert!((words[3].end - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_real_words_preferred_over_estimates() {
        let transcription = Transcription {
            text: "hello world".to_string(),
            segments: vec![segment(
                0.0,
                2.0,
                "hello world",
                vec![word("hello", 0.0, 0.8), word("world", 0.9, 1.7)],
            )],
            language: "en".to_string(),
        };

        assert_eq!(transcription.word_timings(), transcription.word_timings_or_estimated());
        assert_eq!(transcription.word_timings()[1].start, 0.9);
    }

    #[test]
    fn test_stats() {
        let transcription = Transcription {
            text: "hello world".to_string(),
            segments: vec![segment(
                0.0,
                2.0,
                "hello world",
                vec![word("hello", 0.0, 1.0), word("world", 1.0, 2.0)],
            )],
            language: "en".to_string(),
        };

        let stats = transcription.stats();
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.char_count, 11);
        assert!((stats.duration_secs - 2.0).abs() < 1e-9);
        assert!((stats.avg_word_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty_transcription() {
        let transcription = Transcription {
            text: String::new(),
            segments: vec![],
            language: "en".to_string(),
        };

        let stats = transcription.stats();
        assert_eq!(stats.word_count, 0);
        assert_eq!(stats.avg_word_secs, 0.0);
    }
}
