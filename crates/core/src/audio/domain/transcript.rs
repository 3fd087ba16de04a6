#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Result of one recognition pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Transcription {
    pub segments: Vec<TranscriptSegment>,
    pub language: String,
}

impl Transcription {
    pub fn new(segments: Vec<TranscriptSegment>, language: impl Into<String>) -> Self {
        Self {
            segments,
            language: language.into(),
        }
    }

    /// Full text: segment texts concatenated in order, as emitted by the model.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// True when no segment carries any non-whitespace text.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, start_time: f64, end_time: f64) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start_time,
            end_time,
        }
    }

    #[test]
    fn test_text_concatenates_segments_in_order() {
        let t = Transcription::new(
            vec![
                segment(" Guten Morgen.", 0.0, 1.2),
                segment(" Wie geht es dir?", 1.2, 2.5),
            ],
            "de",
        );
        assert_eq!(t.text(), " Guten Morgen. Wie geht es dir?");
        assert_eq!(t.language, "de");
    }

    #[test]
    fn test_text_of_no_segments_is_empty() {
        let t = Transcription::new(Vec::new(), "de");
        assert_eq!(t.text(), "");
        assert!(t.is_empty());
    }

    #[test]
    fn test_whitespace_only_segments_count_as_empty() {
        let t = Transcription::new(vec![segment(" ", 0.0, 1.0)], "de");
        assert!(t.is_empty());
    }

    #[test]
    fn test_any_spoken_segment_is_not_empty() {
        let t = Transcription::new(
            vec![segment(" ", 0.0, 1.0), segment(" Ja.", 1.0, 1.4)],
            "de",
        );
        assert!(!t.is_empty());
    }
}
