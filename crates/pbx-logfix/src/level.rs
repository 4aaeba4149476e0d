//! Swift `Logger` severity levels

use crate::error::LogfixError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Severity method on a Swift `os.Logger`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// `logger.debug`
    #[default]
    Debug,
    /// `logger.info`
    Info,
    /// `logger.notice`
    Notice,
    /// `logger.warning`
    Warning,
    /// `logger.error`
    Error,
    /// `logger.fault`
    Fault,
}

impl Level {
    /// All levels, least severe first
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Fault,
    ];

    /// Method name as written in source
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fault => "fault",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogfixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LogfixError::InvalidLevel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_method_names() {
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("ERROR".parse::<Level>().unwrap(), Level::Error);
        assert!("warn".parse::<Level>().is_err());
    }

    #[test]
    fn ordered_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Error < Level::Fault);
        assert_eq!(Level::default(), Level::Debug);
    }
}
