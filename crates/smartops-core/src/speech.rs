//! Speech I/O ports.
//!
//! Both directions are best-effort: the console keeps working text-only when
//! no speech backend is available or when a backend fails.

use crate::error::Result;
use async_trait::async_trait;
use strum::EnumIter;

/// Fixed system announcements read aloud when voice output is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Announcement {
    VoiceActive,
    Analyzing,
    PlanReady,
    Dispatching,
    MissionAccomplished,
    ExecutionError,
    LinkFailure,
    RecordPurged,
    ReloadingPlan,
}

impl Announcement {
    pub fn text(&self) -> &'static str {
        match self {
            Self::VoiceActive => "Vocal system active.",
            Self::Analyzing => "Analyzing request.",
            Self::PlanReady => "Plan formulated. Human approval required.",
            Self::Dispatching => "Dispatching sequences.",
            Self::MissionAccomplished => "Mission accomplished.",
            Self::ExecutionError => "Execution error.",
            Self::LinkFailure => "System link failure.",
            Self::RecordPurged => "Operation record purged from database.",
            Self::ReloadingPlan => "Reloading operation parameters for modification.",
        }
    }
}

/// Text-to-speech output.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Reads `text` aloud, replacing anything still being spoken.
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Speech-to-text input.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Records one utterance and returns its transcript.
    async fn transcribe(&self) -> Result<String>;
}

/// Backend used when speech is disabled or unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeech;

#[async_trait]
impl SpeechOutput for SilentSpeech {
    async fn speak(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl SpeechInput for SilentSpeech {
    async fn transcribe(&self) -> Result<String> {
        Ok(String::new())
    }
}
