//! External-command transcription backend.
//!
//! The segment bytes are written to a temp file and handed to a configurable
//! command line; the command prints the transcript on stdout. `{file}` in the
//! command line is replaced with the temp file path, `{lang}` with the
//! language hint. This keeps the actual ASR engine out of the process: any
//! CLI that can demux the container (whisper.cpp, an ffmpeg pipeline, ...)
//! plugs in.

use crate::error::{Result, StreamscribeError};
use crate::stt::transcriber::Transcriber;
use std::io::Write;
use std::path::Path;
use std::process::Command;

const FILE_PLACEHOLDER: &str = "{file}";
const LANG_PLACEHOLDER: &str = "{lang}";

/// Transcriber that shells out to an external ASR command.
pub struct CommandTranscriber {
    program: String,
    args: Vec<String>,
}

impl CommandTranscriber {
    /// Build a backend from a whitespace-separated command line.
    ///
    /// If no argument contains `{file}`, the temp file path is appended as
    /// the last argument.
    pub fn new(command_line: &str) -> Result<Self> {
        let mut tokens = command_line.split_whitespace().map(String::from);
        let program = tokens
            .next()
            .ok_or_else(|| StreamscribeError::ConfigInvalidValue {
                key: "stt.command".to_string(),
                message: "must not be empty".to_string(),
            })?;
        let mut args: Vec<String> = tokens.collect();

        if !args.iter().any(|a| a.contains(FILE_PLACEHOLDER)) {
            args.push(FILE_PLACEHOLDER.to_string());
        }

        Ok(Self { program, args })
    }

    fn resolve_args(&self, file: &Path, language: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace(FILE_PLACEHOLDER, &file.to_string_lossy())
                    .replace(LANG_PLACEHOLDER, language)
            })
            .collect()
    }
}

impl Transcriber for CommandTranscriber {
    fn transcribe(&self, audio: &[u8], language: &str) -> Result<String> {
        // The engine demuxes the container itself; keep the suffix browsers
        // use for MediaRecorder streams.
        let mut tmp = tempfile::Builder::new()
            .prefix("streamscribe-")
            .suffix(".webm")
            .tempfile()
            .map_err(|e| StreamscribeError::Transcription {
                message: format!("failed to create segment temp file: {}", e),
            })?;
        tmp.write_all(audio)
            .and_then(|_| tmp.flush())
            .map_err(|e| StreamscribeError::Transcription {
                message: format!("failed to write segment temp file: {}", e),
            })?;

        let args = self.resolve_args(tmp.path(), language);
        let output = Command::new(&self.program).args(&args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StreamscribeError::TranscriberNotReady {
                    name: self.program.clone(),
                }
            } else {
                StreamscribeError::Transcription {
                    message: format!("failed to run '{}': {}", self.program, e),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StreamscribeError::Transcription {
                message: format!(
                    "'{}' exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        &self.program
    }

    fn is_ready(&self) -> bool {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.exists();
        }
        std::env::var_os("PATH")
            .map(|paths| {
                std::env::split_paths(&paths).any(|dir| dir.join(&self.program).is_file())
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(CommandTranscriber::new("").is_err());
        assert!(CommandTranscriber::new("   ").is_err());
    }

    #[test]
    fn test_file_placeholder_appended_when_missing() {
        let backend = CommandTranscriber::new("cat").unwrap();
        assert_eq!(backend.args, vec!["{file}".to_string()]);
    }

    #[test]
    fn test_transcribe_captures_stdout() {
        // `cat {file}` echoes the segment bytes back as the "transcript".
        let backend = CommandTranscriber::new("cat {file}").unwrap();
        let text = backend.transcribe(b"hello segment", "en").unwrap();
        assert_eq!(text, "hello segment");
    }

    #[test]
    fn test_transcribe_trims_output() {
        let backend = CommandTranscriber::new("cat").unwrap();
        let text = backend.transcribe(b"  padded  \n", "en").unwrap();
        assert_eq!(text, "padded");
    }

    #[test]
    fn test_language_placeholder_substituted() {
        let backend = CommandTranscriber::new("echo {lang}").unwrap();
        let text = backend.transcribe(b"ignored", "zh").unwrap();
        assert!(text.starts_with("zh"), "got: {}", text);
    }

    #[test]
    fn test_nonzero_exit_is_transcription_error() {
        let backend = CommandTranscriber::new("false").unwrap();
        let result = backend.transcribe(b"audio", "en");
        assert!(matches!(
            result,
            Err(StreamscribeError::Transcription { .. })
        ));
    }

    #[test]
    fn test_missing_program_reports_not_ready() {
        let backend = CommandTranscriber::new("definitely-not-a-real-asr-binary").unwrap();
        let result = backend.transcribe(b"audio", "en");
        assert!(matches!(
            result,
            Err(StreamscribeError::TranscriberNotReady { .. })
        ));
    }

    #[test]
    fn test_is_ready_finds_program_on_path() {
        let backend = CommandTranscriber::new("cat {file}").unwrap();
        assert!(backend.is_ready());

        let missing = CommandTranscriber::new("definitely-not-a-real-asr-binary").unwrap();
        assert!(!missing.is_ready());
    }
}
