//! Configuration loading and management

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const SESSION_FILE: &str = "conversation_memory.json";

#[cfg(target_os = "macos")]
const DEFAULT_TTS: &str = "say";
#[cfg(not(target_os = "macos"))]
const DEFAULT_TTS: &str = "espeak";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY not found. Please set it in the environment")]
    MissingApiKey,

    #[error("cannot determine data directory: set VOICE_ASSISTANT_DATA_DIR or HOME")]
    NoDataDir,

    #[error("{0} is set but empty")]
    EmptyCommand(&'static str),
}

/// An external program and its leading arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split a command line on whitespace
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

/// Assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Language backend credential
    pub api_key: String,

    /// Gemini model name
    pub model: String,

    /// Directory for the persisted session
    pub data_dir: PathBuf,

    /// Speech output program
    pub tts: CommandLine,

    /// Speech capture program; stdin transcripts when absent
    pub stt: Option<CommandLine>,

    /// How long to wait for speech to start
    pub listen_timeout: Duration,

    /// Longest single utterance
    pub max_phrase: Duration,

    /// Pause before typing so the user can switch windows
    pub typing_delay: Duration,

    /// Pause between turns
    pub turn_pause: Duration,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve variables
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("GEMINI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let model = var("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string());

        let data_dir = match var("VOICE_ASSISTANT_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = var("HOME").ok_or(ConfigError::NoDataDir)?;
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("voice-assistant")
            }
        };

        let tts = match lookup("VOICE_ASSISTANT_TTS") {
            Some(line) => CommandLine::parse(&line)
                .ok_or(ConfigError::EmptyCommand("VOICE_ASSISTANT_TTS"))?,
            None => CommandLine {
                program: DEFAULT_TTS.to_string(),
                args: Vec::new(),
            },
        };

        let stt = match lookup("VOICE_ASSISTANT_STT") {
            Some(line) => Some(
                CommandLine::parse(&line)
                    .ok_or(ConfigError::EmptyCommand("VOICE_ASSISTANT_STT"))?,
            ),
            None => None,
        };

        Ok(Self {
            api_key,
            model,
            data_dir,
            tts,
            stt,
            listen_timeout: Duration::from_secs(5),
            max_phrase: Duration::from_secs(8),
            typing_delay: Duration::from_secs(2),
            turn_pause: Duration::from_millis(500),
        })
    }

    /// Path of the persisted session record
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
