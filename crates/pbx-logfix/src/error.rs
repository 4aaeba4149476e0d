//! Error types for the severity rewriter

/// Errors raised while building or loading rewrite rules
#[derive(Debug, thiserror::Error)]
pub enum LogfixError {
    /// Unknown severity name
    #[error("unknown log level: '{0}'")]
    InvalidLevel(String),

    /// Unknown built-in rule set
    #[error("unknown preset: '{0}' (expected one of: app, tts)")]
    UnknownPreset(String),

    /// Receiver is not a Swift identifier
    #[error("invalid logger receiver: '{0}'")]
    InvalidReceiver(String),

    /// Rule pattern failed to compile
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Rule file is malformed
    #[error("invalid rule file: {0}")]
    Config(#[from] toml::de::Error),
}

impl LogfixError {
    /// Whether the rule set itself is at fault
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Pattern(_) | Self::InvalidLevel(_))
    }
}
