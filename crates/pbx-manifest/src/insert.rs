//! Section inserter
//!
//! Splices one record immediately after its anchor record. The anchor must
//! match exactly once; zero or several matches leave the buffer untouched.

use crate::error::InsertError;
use crate::section::Insertion;

/// Result of one successful splice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    /// Buffer with the record inserted
    pub text: String,
    /// Byte offset of the inserted line in `text`
    pub offset: usize,
    /// Byte length of the inserted line, terminator included
    pub len: usize,
}

/// Insert `insertion`'s record after its anchor
///
/// # Errors
/// - `InsertError::AnchorNotFound` if the anchor does not occur
/// - `InsertError::AmbiguousAnchor` if it occurs more than once
pub fn insert(buffer: &str, insertion: &Insertion) -> Result<String, InsertError> {
    splice(buffer, insertion).map(|s| s.text)
}

/// Insert and report where the new line landed
///
/// The new line copies the anchor line's leading whitespace and the
/// anchor's line terminator (`\n` or `\r\n`).
///
/// # Errors
/// Same as [`insert`]
pub fn splice(buffer: &str, insertion: &Insertion) -> Result<Splice, InsertError> {
    let matches = insertion.anchor().find_all(buffer);
    let anchor = match matches.as_slice() {
        [] => {
            return Err(InsertError::anchor_not_found(
                insertion.label(),
                insertion.anchor().as_str(),
            ))
        }
        [single] => single.clone(),
        many => {
            return Err(InsertError::ambiguous_anchor(
                insertion.label(),
                insertion.anchor().as_str(),
                many.len(),
            ))
        }
    };

    let matched = &buffer[anchor.clone()];
    let terminator = if matched.ends_with("\r\n") { "\r\n" } else { "\n" };
    let indent = line_indent(buffer, anchor.start);

    let record = insertion.record();
    let len = indent.len() + record.len() + terminator.len();
    let mut text = String::with_capacity(buffer.len() + len);
    text.push_str(&buffer[..anchor.end]);
    text.push_str(indent);
    text.push_str(record);
    text.push_str(terminator);
    text.push_str(&buffer[anchor.end..]);

    Ok(Splice {
        text,
        offset: anchor.end,
        len,
    })
}

/// Leading whitespace of the line containing `pos`
fn line_indent(buffer: &str, pos: usize) -> &str {
    let line_start = buffer[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line = &buffer[line_start..pos];
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..width]
}
