use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::prompt::SummaryStyle;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_lang: Option<String>,
    pub default_style: Option<SummaryStyle>,
    pub default_word_limit: Option<u32>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    /// Translate transcripts whose caption language differs from the target
    pub translate: Option<bool>,
    /// Use the untranslated transcript when translation fails
    pub translation_fallback: Option<bool>,
    /// Reject transcripts longer than this many characters; unlimited when unset
    pub max_transcript_chars: Option<usize>,
    pub timeouts: Timeouts,
}

/// Per-collaborator time budgets, in seconds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Timeouts {
    pub transcript_secs: u64,
    pub translation_secs: u64,
    pub generation_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            transcript_secs: 20,
            translation_secs: 20,
            generation_secs: 120,
        }
    }
}

impl Timeouts {
    pub fn transcript(&self) -> Duration {
        Duration::from_secs(self.transcript_secs)
    }

    pub fn translation(&self) -> Duration {
        Duration::from_secs(self.translation_secs)
    }

    pub fn generation(&self) -> Duration {
        Duration::from_secs(self.generation_secs)
    }

    /// A zero budget would fail every request before it starts
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("transcript_secs", self.transcript_secs),
            ("translation_secs", self.translation_secs),
            ("generation_secs", self.generation_secs),
        ] {
            if secs == 0 {
                bail!("timeouts.{name} must be at least 1 second");
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            config.timeouts.validate()?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}
