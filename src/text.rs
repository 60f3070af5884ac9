/// Typed by an editor to force a field to stay empty, even if it could be auto-filled.
pub const SENTINEL: &str = "-";

/// Strips leading and trailing whitespace.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn is_sentinel(value: &str) -> bool {
    value == SENTINEL
}

/// Maps the sentinel marker to the empty string, returns everything else unchanged.
pub fn clear_sentinel(value: &str) -> String {
    if is_sentinel(value) {
        String::new()
    } else {
        value.to_string()
    }
}
