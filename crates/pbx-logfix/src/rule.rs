//! Severity rules, rule files and built-in presets
//!
//! A rule file is TOML:
//!
//! ```toml
//! strip_prefix = "TTSService: "
//!
//! [[rule]]
//! pattern = "not configured"
//! level = "warning"
//! case_insensitive = true
//! ```

use crate::error::LogfixError;
use crate::level::Level;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Promote calls whose message matches `pattern` to `level`
///
/// `pattern` is a regex fragment matched anywhere inside the message
/// literal; a leading `^` anchors it at the start of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityRule {
    pattern: String,
    level: Level,
    #[serde(default)]
    case_insensitive: bool,
}

impl SeverityRule {
    /// Case-sensitive rule
    #[must_use]
    pub fn new(pattern: impl Into<String>, level: Level) -> Self {
        Self {
            pattern: pattern.into(),
            level,
            case_insensitive: false,
        }
    }

    /// Match regardless of case
    #[inline]
    #[must_use]
    pub fn ignore_case(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Pattern fragment
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Target level
    #[inline]
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether matching ignores case
    #[inline]
    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Regex for the whole message body, quotes excluded
    pub(crate) fn message_body(&self) -> String {
        match self.pattern.strip_prefix('^') {
            Some(anchored) => format!("{anchored}[^\"]*"),
            None => format!("[^\"]*{}[^\"]*", self.pattern),
        }
    }
}

/// Parsed rule file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFile {
    /// Logger variable name, `logger` when absent
    #[serde(default)]
    pub receiver: Option<String>,
    /// Level given to malformed calls, `debug` when absent
    #[serde(default)]
    pub default_level: Option<Level>,
    /// Literal message prefix to remove
    #[serde(default)]
    pub strip_prefix: Option<String>,
    /// Rules, in application order
    #[serde(default, rename = "rule")]
    pub rules: Vec<SeverityRule>,
}

impl RuleFile {
    /// Parse a rule file
    ///
    /// # Errors
    /// Returns `Config` for malformed TOML or unknown levels
    pub fn from_toml(text: &str) -> Result<Self, LogfixError> {
        Ok(toml::from_str(text)?)
    }
}

/// Built-in rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// App state logging (`AppState: ` prefix)
    App,
    /// Speech service logging (`TTSService: ` prefix)
    Tts,
}

impl Preset {
    /// Preset name as given on the command line
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Tts => "tts",
        }
    }

    /// Message prefix stripped by this preset
    #[inline]
    #[must_use]
    pub const fn strip_prefix(self) -> &'static str {
        match self {
            Self::App => "AppState: ",
            Self::Tts => "TTSService: ",
        }
    }

    /// Rules, most specific first
    #[must_use]
    pub fn rules(self) -> Vec<SeverityRule> {
        match self {
            Self::App => vec![
                SeverityRule::new("Error", Level::Error).ignore_case(),
                SeverityRule::new("Failed", Level::Error).ignore_case(),
                SeverityRule::new("No [^\"]* found", Level::Info).ignore_case(),
                SeverityRule::new("Processing", Level::Info),
                SeverityRule::new("Found", Level::Info),
                SeverityRule::new("Successfully", Level::Info),
                SeverityRule::new("loaded", Level::Info),
                SeverityRule::new("Cleaned up", Level::Info),
            ],
            Self::Tts => vec![
                SeverityRule::new("error", Level::Error).ignore_case(),
                SeverityRule::new("failed", Level::Error).ignore_case(),
                SeverityRule::new("invalid", Level::Error).ignore_case(),
                SeverityRule::new("not configured", Level::Warning).ignore_case(),
                SeverityRule::new("not properly", Level::Warning).ignore_case(),
                SeverityRule::new("^TTS[^:]*: generateAudio", Level::Info),
                SeverityRule::new("^TTS[^:]*: Received", Level::Info),
                SeverityRule::new("^TTS[^:]*: Audio saved", Level::Info),
            ],
        }
    }
}

impl FromStr for Preset {
    type Err = LogfixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Self::App),
            "tts" => Ok(Self::Tts),
            other => Err(LogfixError::UnknownPreset(other.to_string())),
        }
    }
}
