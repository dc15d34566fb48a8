//! JSON-path style traces recorded for diagnostics (`$.columns[1].buttons[0]`).

/// Trace of the document root.
pub const ROOT: &str = "$";

/// Extends `parent` with an object key.
pub fn key(parent: &str, key: &str) -> String {
    format!("{parent}.{key}")
}

/// Extends `parent` with a sequence index.
pub fn index(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}
