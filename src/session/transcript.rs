//! Ordered store of finalized segment texts.

/// Accumulates the texts of finalized segments and produces the running full
/// transcript. Interim probes never touch this; only final segments append.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    segments: Vec<String>,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permanently appends a finalized segment's text. Empty texts are
    /// dropped.
    pub fn push(&mut self, text: &str) {
        if !text.is_empty() {
            self.segments.push(text.to_string());
        }
    }

    /// The full transcript: segment texts concatenated without separator.
    pub fn full_text(&self) -> String {
        self.segments.concat()
    }

    /// Full transcript with an interim probe's text appended, without
    /// mutating the accumulator.
    pub fn preview(&self, interim: &str) -> String {
        let mut text = self.full_text();
        text.push_str(interim);
        text
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}
