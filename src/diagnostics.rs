//! Non-fatal diagnostics collected while importing.
//!
//! Warnings never interrupt the import. They are kept in order and handed
//! back with the finished score so the caller can show them to the user.

use serde::Serialize;

/// Prefix of a warning that marks the import as incomplete.
pub const INCOMPLETE_PARSE: &str = "Didn't parse full score";

/// Ordered list of warning messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Warnings {
    messages: Vec<String>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "import warning");
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// True if any warning says the input was not fully understood.
    pub fn has_incomplete_parse(&self) -> bool {
        self.iter().any(|w| w.starts_with(INCOMPLETE_PARSE))
    }

    pub fn into_vec(self) -> Vec<String> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_keep_order() {
        let mut warnings = Warnings::new();
        warnings.push("first");
        warnings.push(String::from("second"));
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings.into_vec(), vec!["first", "second"]);
    }

    #[test]
    fn test_incomplete_parse_prefix() {
        let mut warnings = Warnings::new();
        warnings.push("Skipping rest");
        assert!(!warnings.has_incomplete_parse());
        warnings.push(format!("{}: irregular group was never closed", INCOMPLETE_PARSE));
        assert!(warnings.has_incomplete_parse());
    }
}
