//! Presence check gating the whole insertion

/// Whether `display_name` already occurs anywhere in `buffer`
///
/// A plain substring test: display names are unique within a project, so
/// any occurrence means the entity was already registered.
#[inline]
#[must_use]
pub fn is_present(buffer: &str, display_name: &str) -> bool {
    buffer.contains(display_name)
}
