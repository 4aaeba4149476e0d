//! Log severity rewriter
//!
//! A standalone pass over Swift sources: repairs malformed
//! `logger."..."` calls, promotes `logger.debug` calls to a higher severity
//! according to ordered content rules, and strips a shared message prefix.
//! Independent of the manifest core.
//!
//! # Example
//!
//! ```rust,ignore
//! use pbx_logfix::{LogRewriter, Preset};
//!
//! let rewrite = LogRewriter::from_preset(Preset::Tts).rewrite(&source)?;
//! println!("{} calls promoted", rewrite.promoted_total());
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod error;
pub mod level;
pub mod rewrite;
pub mod rule;

// Re-exports
pub use error::LogfixError;
pub use level::Level;
pub use rewrite::{rewrite_severities, LogRewriter, Rewrite, DEFAULT_RECEIVER};
pub use rule::{Preset, RuleFile, SeverityRule};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
