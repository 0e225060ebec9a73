//! Speech backed by external programs.
//!
//! Text-to-speech pipes the text into the configured command's stdin (for
//! example `espeak --stdin` or `say`). Speech-to-text runs the configured
//! command and takes its stdout as the transcript.

use async_trait::async_trait;
use smartops_core::speech::{SpeechInput, SpeechOutput};
use smartops_core::{Result, SmartOpsError};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Splits a command line on whitespace into program and arguments.
fn parse_command_line(command_line: &str) -> Result<(String, Vec<String>)> {
    let mut parts = command_line.split_whitespace().map(str::to_string);
    let program = parts
        .next()
        .ok_or_else(|| SmartOpsError::speech("speech command is empty"))?;
    Ok((program, parts.collect()))
}

pub struct CommandSpeechOutput {
    program: String,
    args: Vec<String>,
    current: Mutex<Option<Child>>,
}

impl CommandSpeechOutput {
    pub fn new(command_line: &str) -> Result<Self> {
        let (program, args) = parse_command_line(command_line)?;
        Ok(Self {
            program,
            args,
            current: Mutex::new(None),
        })
    }

    /// Waits for the utterance in progress, if any, to finish.
    pub async fn wait(&self) -> Result<()> {
        if let Some(mut child) = self.current.lock().await.take() {
            child
                .wait()
                .await
                .map_err(|err| SmartOpsError::speech(format!("{}: {err}", self.program)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechOutput for CommandSpeechOutput {
    async fn speak(&self, text: &str) -> Result<()> {
        let mut current = self.current.lock().await;
        if let Some(mut previous) = current.take() {
            // start_kill fails once the process has already exited
            let _ = previous.start_kill();
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| SmartOpsError::speech(format!("failed to start {}: {err}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|err| SmartOpsError::speech(format!("{}: {err}", self.program)))?;
        }

        tracing::trace!(program = %self.program, "speaking {} chars", text.len());
        *current = Some(child);
        Ok(())
    }
}

pub struct CommandSpeechInput {
    program: String,
    args: Vec<String>,
}

impl CommandSpeechInput {
    pub fn new(command_line: &str) -> Result<Self> {
        let (program, args) = parse_command_line(command_line)?;
        Ok(Self { program, args })
    }
}

#[async_trait]
impl SpeechInput for CommandSpeechInput {
    async fn transcribe(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| SmartOpsError::speech(format!("failed to start {}: {err}", self.program)))?;

        if !output.status.success() {
            return Err(SmartOpsError::speech(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(CommandSpeechOutput::new("   ").is_err());
        assert!(CommandSpeechInput::new("").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcribe_takes_trimmed_stdout() {
        let input = CommandSpeechInput::new("echo  email Alice about launch ").unwrap();
        assert_eq!(input.transcribe().await.unwrap(), "email Alice about launch");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcribe_reports_failing_command() {
        let input = CommandSpeechInput::new("false").unwrap();
        assert!(input.transcribe().await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_speak_pipes_text_to_command() {
        let output = CommandSpeechOutput::new("cat").unwrap();
        output.speak("Mission accomplished.").await.unwrap();
        output.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_program_is_a_speech_error() {
        let output = CommandSpeechOutput::new("smartops-no-such-tts-binary").unwrap();
        let err = output.speak("hello").await.unwrap_err();
        assert!(matches!(err, SmartOpsError::Speech(_)));
    }
}
