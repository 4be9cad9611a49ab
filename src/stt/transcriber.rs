use crate::error::{Result, StreamscribeError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real engine vs mock). The
/// audio bytes are an opaque container (webm, wav, ...); the backend is
/// responsible for demuxing and resampling as needed.
///
/// Implementations must be safe to call concurrently from multiple sessions;
/// within one session the scheduler enforces at most one outstanding call.
pub trait Transcriber: Send + Sync {
    /// Transcribe a finite audio byte block to text.
    ///
    /// May block for the full duration of model inference; callers run it on
    /// a blocking thread pool.
    fn transcribe(&self, audio: &[u8], language: &str) -> Result<String>;

    /// Get the name of the backend
    fn name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across sessions.
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[u8], language: &str) -> Result<String> {
        (**self).transcribe(audio, language)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    name: String,
    response: String,
    scripted: Arc<Mutex<VecDeque<String>>>,
    delay: Duration,
    should_fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            response: "mock transcription".to_string(),
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            should_fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to return these responses in order, then fall back
    /// to the fixed response.
    pub fn with_script<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut scripted = self.scripted.lock().unwrap_or_else(|e| e.into_inner());
            scripted.extend(responses.into_iter().map(Into::into));
        }
        self
    }

    /// Configure the mock to sleep before answering, simulating slow
    /// inference.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of transcribe calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[u8], _language: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        if self.should_fail {
            return Err(StreamscribeError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }

        let next = self
            .scripted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        Ok(next.unwrap_or_else(|| self.response.clone()))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transcriber_returns_response() {
        let transcriber = MockTranscriber::new("test-model").with_response("Hello, this is a test");

        let audio = vec![0u8; 1000];
        let result = transcriber.transcribe(&audio, "en");

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Hello, this is a test");
    }

    #[test]
    fn test_mock_transcriber_returns_error_when_configured() {
        let transcriber = MockTranscriber::new("test-model").with_failure();

        let result = transcriber.transcribe(&[0u8; 100], "en");

        assert!(result.is_err());
        match result {
            Err(StreamscribeError::Transcription { message }) => {
                assert_eq!(message, "mock transcription failure");
            }
            _ => panic!("Expected Transcription error"),
        }
    }

    #[test]
    fn test_mock_transcriber_scripted_responses_in_order() {
        let transcriber = MockTranscriber::new("test-model")
            .with_script(["你好", "世界"])
            .with_response("fallback");

        assert_eq!(transcriber.transcribe(&[1], "zh").unwrap(), "你好");
        assert_eq!(transcriber.transcribe(&[2], "zh").unwrap(), "世界");
        assert_eq!(transcriber.transcribe(&[3], "zh").unwrap(), "fallback");
    }

    #[test]
    fn test_mock_transcriber_counts_calls() {
        let transcriber = MockTranscriber::new("test-model");
        assert_eq!(transcriber.calls(), 0);

        transcriber.transcribe(&[0u8; 10], "en").ok();
        transcriber.transcribe(&[0u8; 10], "en").ok();
        assert_eq!(transcriber.calls(), 2);
    }

    #[test]
    fn test_mock_transcriber_clone_shares_call_counter() {
        let transcriber = MockTranscriber::new("test-model");
        let clone = transcriber.clone();

        clone.transcribe(&[0u8; 10], "en").ok();
        assert_eq!(transcriber.calls(), 1);
    }

    #[test]
    fn test_mock_transcriber_is_ready() {
        let ready = MockTranscriber::new("test-model");
        assert!(ready.is_ready());

        let failing = MockTranscriber::new("test-model").with_failure();
        assert!(!failing.is_ready());
    }

    #[test]
    fn test_transcriber_trait_is_object_safe() {
        let transcriber: Box<dyn Transcriber> =
            Box::new(MockTranscriber::new("test-model").with_response("boxed test"));

        assert_eq!(transcriber.name(), "test-model");
        assert!(transcriber.is_ready());
        assert_eq!(transcriber.transcribe(&[0u8; 10], "en").unwrap(), "boxed test");
    }

    #[test]
    fn test_arc_dyn_transcriber_usable() {
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(MockTranscriber::new("shared").with_response("shared result"));

        let clone = Arc::clone(&transcriber);
        assert_eq!(clone.transcribe(&[0u8; 10], "zh").unwrap(), "shared result");
    }

    #[test]
    fn test_mock_transcriber_empty_audio() {
        let transcriber = MockTranscriber::new("test-model");
        assert!(transcriber.transcribe(&[], "en").is_ok());
    }
}
