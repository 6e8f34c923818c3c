//! Engine warnings routed through the `log` facade.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the style and layout crates to report invariant faults that are
//! recovered from (a desynchronized descendant index, a stale handle handed
//! to a query) rather than turned into panics.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a recovered fault (emitted once per unique message)
///
/// Returns `true` if this call emitted the warning, `false` if the same
/// `[component] message` pair was already reported.
///
/// # Example
/// ```ignore
/// warn_once("Index", "positioned index entry without container mirror");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        log::warn!(target: "boxwood", "[{component}] {message}");
    }
    should_emit
}

/// Clear all recorded warnings (call when tearing down a document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        let message = "duplicate message for dedup test";
        assert!(warn_once("Test", message));
        assert!(!warn_once("Test", message));
        // Same message under another component is a distinct key.
        assert!(warn_once("Other", message));
    }
}
