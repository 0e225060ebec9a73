use serde::{Deserialize, Serialize};

/// Where the operations backend listens when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Messages sent along with each analyze call.
pub const DEFAULT_HISTORY_LIMIT: usize = 6;

pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_tts_command() -> Option<String> {
    Some("espeak".to_string())
}

/// Contents of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Unset means requests never time out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            history_limit: default_history_limit(),
            log_level: default_log_level(),
            request_timeout_secs: None,
            speech: SpeechConfig::default(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SpeechConfig {
    /// Whether announcements are read aloud at startup.
    #[serde(default)]
    pub enabled: bool,
    /// Text-to-speech program; the text is written to its stdin.
    #[serde(default = "default_tts_command", skip_serializing_if = "Option::is_none")]
    pub tts_command: Option<String>,
    /// Speech-to-text program; its stdout is the transcript.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stt_command: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tts_command: default_tts_command(),
            stt_command: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: ConsoleConfig = toml::from_str(
            r#"
            api_base_url = "http://ops.internal:8000/api/v1"

            [speech]
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://ops.internal:8000/api/v1");
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.request_timeout_secs, None);
        assert!(config.speech.enabled);
        assert_eq!(config.speech.tts_command.as_deref(), Some("espeak"));
        assert_eq!(config.speech.stt_command, None);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: ConsoleConfig = toml::from_str("").unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }
}
