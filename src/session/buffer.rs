//! Segment buffer for one streaming session.
//!
//! Accumulates raw audio bytes and decides segment boundaries. Two triggers,
//! checked in priority order once the buffer holds enough data:
//! - silence: no new bytes for `silence_threshold` ⇒ the segment is final,
//!   the utterance ended;
//! - interval: speech keeps flowing, but `max_interval` has passed since the
//!   last trigger ⇒ an interim probe into the still-growing buffer.
//!
//! Interim extraction leaves the buffer untouched: the growing prefix is
//! re-transcribed on every probe, trading recomputation for always-fresh
//! preview text.

use crate::defaults;
use std::time::{Duration, Instant};

/// Configuration for segment boundary decisions.
#[derive(Debug, Clone)]
pub struct SegmentBufferConfig {
    /// Threshold below which transcription is never attempted.
    pub min_segment_bytes: usize,
    /// Elapsed time since the last byte that marks an utterance boundary.
    pub silence_threshold: Duration,
    /// Maximum time between forced interim transcriptions during continuous
    /// speech.
    pub max_interval: Duration,
}

impl Default for SegmentBufferConfig {
    fn default() -> Self {
        Self {
            min_segment_bytes: defaults::MIN_SEGMENT_BYTES,
            silence_threshold: defaults::SILENCE_THRESHOLD,
            max_interval: defaults::MAX_INTERVAL,
        }
    }
}

/// An immutable byte block handed to the transcriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub bytes: Vec<u8>,
    /// True ⇒ ends an utterance; the buffer was cleared and the resulting
    /// text is permanently appended. False ⇒ interim probe; the buffer keeps
    /// accumulating.
    pub is_final: bool,
}

/// Accumulates audio bytes and decides when a segment is ready.
///
/// Bytes leave the buffer only through [`extract`](Self::extract) and
/// [`drain_remaining`](Self::drain_remaining).
#[derive(Debug)]
pub struct SegmentBuffer {
    config: SegmentBufferConfig,
    pending: Vec<u8>,
    last_data_at: Option<Instant>,
    last_trigger_at: Option<Instant>,
    next_is_final: bool,
}

impl SegmentBuffer {
    /// Creates a buffer with default thresholds.
    pub fn new() -> Self {
        Self::with_config(SegmentBufferConfig::default())
    }

    /// Creates a buffer with custom thresholds.
    pub fn with_config(config: SegmentBufferConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            last_data_at: None,
            last_trigger_at: None,
            next_is_final: false,
        }
    }

    /// Appends audio bytes. Never fails; no size limit other than memory.
    pub fn add_data(&mut self, bytes: &[u8]) {
        self.add_data_at(bytes, Instant::now());
    }

    /// Appends audio bytes with an explicit arrival time.
    pub fn add_data_at(&mut self, bytes: &[u8], now: Instant) {
        self.pending.extend_from_slice(bytes);
        self.last_data_at = Some(now);
    }

    /// Checks whether a segment boundary has been reached.
    ///
    /// Records the finality of the pending segment for the next
    /// [`extract`](Self::extract).
    pub fn is_ready(&mut self) -> bool {
        self.is_ready_at(Instant::now())
    }

    /// Trigger evaluation against an explicit clock.
    pub fn is_ready_at(&mut self, now: Instant) -> bool {
        if self.pending.len() < self.config.min_segment_bytes {
            return false;
        }

        // Silence trigger: the utterance ended.
        if let Some(last_data) = self.last_data_at {
            if now.saturating_duration_since(last_data) >= self.config.silence_threshold {
                self.next_is_final = true;
                self.last_trigger_at = Some(now);
                return true;
            }
        }

        // Interval trigger: continuous speech, bound the preview latency.
        match self.last_trigger_at {
            Some(last_trigger) => {
                if now.saturating_duration_since(last_trigger) >= self.config.max_interval {
                    self.next_is_final = false;
                    self.last_trigger_at = Some(now);
                    true
                } else {
                    false
                }
            }
            None => {
                // First crossing of the minimum counts as an immediate
                // interim trigger.
                self.next_is_final = false;
                self.last_trigger_at = Some(now);
                true
            }
        }
    }

    /// Takes the pending segment decided by the last trigger evaluation.
    ///
    /// Final segments clear the buffer; interim segments leave it untouched
    /// so future bytes extend the same prefix. Returns `None` on an empty
    /// buffer.
    pub fn extract(&mut self) -> Option<Segment> {
        if self.pending.is_empty() {
            return None;
        }

        let is_final = self.next_is_final;
        let bytes = if is_final {
            self.next_is_final = false;
            std::mem::take(&mut self.pending)
        } else {
            self.pending.clone()
        };

        Some(Segment { bytes, is_final })
    }

    /// Unconditionally takes and clears whatever remains, marked final.
    ///
    /// Used at session end regardless of thresholds; the caller applies its
    /// own minimum-size filter before transcribing. Returns `None` on an
    /// empty buffer.
    pub fn drain_remaining(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }
        self.next_is_final = false;
        Some(std::mem::take(&mut self.pending))
    }

    /// Number of pending bytes.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for SegmentBuffer {
    fn default() -> Self {
        Self::new()
    }
}
