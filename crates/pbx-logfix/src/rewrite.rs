//! Severity rewriting pass
//!
//! ```text
//! logger."msg")                  → logger.debug("msg")      (normalize)
//! logger.debug("...failed...")   → logger.error("...")      (rules, in order)
//! logger.error("TTSService: x")  → logger.error("x")        (strip prefix)
//! ```
//!
//! Rules only touch calls still at the default level, so a call promoted by
//! an earlier rule is never re-promoted by a later one.

use crate::error::LogfixError;
use crate::level::Level;
use crate::rule::{Preset, RuleFile, SeverityRule};
use regex::{Captures, Regex};

/// Logger variable name used when none is configured
pub const DEFAULT_RECEIVER: &str = "logger";

/// Result of one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Rewritten source
    pub text: String,
    /// Malformed calls repaired
    pub normalized: usize,
    /// Calls promoted, one count per rule in rule order
    pub promoted: Vec<usize>,
    /// Prefixes removed
    pub stripped: usize,
}

impl Rewrite {
    /// Total promotions over all rules
    #[must_use]
    pub fn promoted_total(&self) -> usize {
        self.promoted.iter().sum()
    }

    /// Whether anything was rewritten
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.normalized + self.promoted_total() + self.stripped > 0
    }
}

/// Configured rewriter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRewriter {
    receiver: String,
    default_level: Level,
    rules: Vec<SeverityRule>,
    strip_prefix: Option<String>,
}

impl Default for LogRewriter {
    fn default() -> Self {
        Self {
            receiver: DEFAULT_RECEIVER.to_string(),
            default_level: Level::Debug,
            rules: Vec::new(),
            strip_prefix: None,
        }
    }
}

impl LogRewriter {
    /// Rewriter for `logger` with no rules
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in rule set, prefix included
    #[must_use]
    pub fn from_preset(preset: Preset) -> Self {
        Self::new()
            .with_rules(preset.rules())
            .with_strip_prefix(preset.strip_prefix())
    }

    /// Rewriter described by a rule file
    #[must_use]
    pub fn from_rule_file(file: RuleFile) -> Self {
        let mut rewriter = Self::new().with_rules(file.rules);
        if let Some(receiver) = file.receiver {
            rewriter = rewriter.with_receiver(receiver);
        }
        if let Some(level) = file.default_level {
            rewriter = rewriter.with_default_level(level);
        }
        if let Some(prefix) = file.strip_prefix {
            rewriter = rewriter.with_strip_prefix(prefix);
        }
        rewriter
    }

    /// Parse a TOML rule file
    ///
    /// # Errors
    /// Returns `Config` for malformed TOML
    pub fn from_toml(text: &str) -> Result<Self, LogfixError> {
        RuleFile::from_toml(text).map(Self::from_rule_file)
    }

    /// Logger variable name, e.g. `logger` or `self.log`
    #[inline]
    #[must_use]
    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = receiver.into();
        self
    }

    /// Level that malformed calls get and rules promote from
    #[inline]
    #[must_use]
    pub fn with_default_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Append a rule
    #[inline]
    #[must_use]
    pub fn with_rule(mut self, rule: SeverityRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append rules, keeping their order
    #[inline]
    #[must_use]
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = SeverityRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Remove this literal prefix from every message
    #[inline]
    #[must_use]
    pub fn with_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }

    /// Configured rules
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[SeverityRule] {
        &self.rules
    }

    /// Configured prefix
    #[inline]
    #[must_use]
    pub fn strip_prefix(&self) -> Option<&str> {
        self.strip_prefix.as_deref()
    }

    /// Run the pass over `text`
    ///
    /// # Errors
    /// - `InvalidReceiver` if the receiver is not an identifier path
    /// - `Pattern` if a rule pattern does not compile
    pub fn rewrite(&self, text: &str) -> Result<Rewrite, LogfixError> {
        validate_receiver(&self.receiver)?;
        let receiver = regex::escape(&self.receiver);
        let default = self.default_level.as_str();

        let malformed = Regex::new(&format!(r#"{receiver}\."([^"]+)"\)"#))?;
        let mut normalized = 0;
        let mut current = malformed
            .replace_all(text, |caps: &Captures<'_>| {
                normalized += 1;
                format!("{}.{default}(\"{}\")", self.receiver, &caps[1])
            })
            .into_owned();

        let mut promoted = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if rule.level() == self.default_level {
                promoted.push(0);
                continue;
            }
            let flags = if rule.is_case_insensitive() { "(?i)" } else { "" };
            let pattern = Regex::new(&format!(
                r#"{receiver}\.{default}\("({flags}{})"\)"#,
                rule.message_body()
            ))?;
            let mut count = 0;
            current = pattern
                .replace_all(&current, |caps: &Captures<'_>| {
                    count += 1;
                    format!("{}.{}(\"{}\")", self.receiver, rule.level(), &caps[1])
                })
                .into_owned();
            tracing::debug!(pattern = rule.pattern(), level = %rule.level(), count, "rule applied");
            promoted.push(count);
        }

        let mut stripped = 0;
        if let Some(prefix) = self.strip_prefix.as_deref().filter(|p| !p.is_empty()) {
            let pattern = Regex::new(&format!(r#"({receiver}\.\w+\()"{}"#, regex::escape(prefix)))?;
            current = pattern
                .replace_all(&current, |caps: &Captures<'_>| {
                    stripped += 1;
                    format!("{}\"", &caps[1])
                })
                .into_owned();
        }

        Ok(Rewrite {
            text: current,
            normalized,
            promoted,
            stripped,
        })
    }
}

/// Apply `rules` in order to the `logger` calls in `text`
///
/// # Errors
/// Returns `Pattern` if a rule pattern does not compile
pub fn rewrite_severities(text: &str, rules: &[SeverityRule]) -> Result<String, LogfixError> {
    LogRewriter::new()
        .with_rules(rules.iter().cloned())
        .rewrite(text)
        .map(|rewrite| rewrite.text)
}

fn validate_receiver(receiver: &str) -> Result<(), LogfixError> {
    let valid = !receiver.is_empty()
        && receiver.split('.').all(|part| {
            part.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(LogfixError::InvalidReceiver(receiver.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_calls_are_normalized() {
        let out = LogRewriter::new().rewrite("logger.\"hello\")\n").unwrap();
        assert_eq!(out.text, "logger.debug(\"hello\")\n");
        assert_eq!(out.normalized, 1);
    }

    #[test]
    fn earlier_rules_win() {
        let rules = [
            SeverityRule::new("not configured", Level::Warning),
            SeverityRule::new("configured", Level::Info),
        ];
        let out = rewrite_severities("logger.debug(\"key not configured\")", &rules).unwrap();
        assert_eq!(out, "logger.warning(\"key not configured\")");
    }

    #[test]
    fn case_insensitivity_is_per_rule() {
        let text = "logger.debug(\"Request FAILED\")\nlogger.debug(\"Processing done\")\n";
        let rules = [
            SeverityRule::new("failed", Level::Error).ignore_case(),
            SeverityRule::new("processing", Level::Info),
        ];
        assert_eq!(
            rewrite_severities(text, &rules).unwrap(),
            "logger.error(\"Request FAILED\")\nlogger.debug(\"Processing done\")\n"
        );
    }

    #[test]
    fn rules_to_default_level_are_noops() {
        let out = LogRewriter::new()
            .with_rule(SeverityRule::new("Looking for", Level::Debug))
            .with_rule(SeverityRule::new("Found", Level::Info))
            .rewrite("logger.debug(\"Looking for file, Found it\")")
            .unwrap();
        assert_eq!(out.text, "logger.info(\"Looking for file, Found it\")");
        assert_eq!(out.promoted, vec![0, 1]);
    }

    #[test]
    fn prefix_is_stripped_at_any_level() {
        let out = LogRewriter::new()
            .with_strip_prefix("AppState: ")
            .rewrite("logger.info(\"AppState: ready\")\nlogger.fault(\"AppState: boom\")\n")
            .unwrap();
        assert_eq!(out.text, "logger.info(\"ready\")\nlogger.fault(\"boom\")\n");
        assert_eq!(out.stripped, 2);
    }

    #[test]
    fn custom_receiver() {
        let out = LogRewriter::new()
            .with_receiver("self.log")
            .with_rule(SeverityRule::new("oops", Level::Error))
            .rewrite("self.log.\"oops\")\nlogger.\"oops\")\n")
            .unwrap();
        assert_eq!(out.text, "self.log.error(\"oops\")\nlogger.\"oops\")\n");
    }

    #[test]
    fn bad_receiver_is_rejected() {
        let err = LogRewriter::new().with_receiver("log(").rewrite("").unwrap_err();
        assert!(matches!(err, LogfixError::InvalidReceiver(_)));
    }

    #[test]
    fn untouched_text_is_unchanged() {
        let out = LogRewriter::from_preset(Preset::Tts)
            .rewrite("print(\"TTSService: hi\")\n")
            .unwrap();
        assert!(!out.is_changed());
        assert_eq!(out.text, "print(\"TTSService: hi\")\n");
    }
}
