//! Structural validation helpers

use std::fmt;

/// Accumulates zero or more human-readable validation messages.
///
/// An empty container means "no error"; use [`ValidationError::is_empty`]
/// or [`ValidationError::into_result`] for control flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record another failed check
    pub fn append(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// `Ok(())` when no message was recorded, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// True for the 36-character hyphenated UUID form, hex digits in either case
///
/// `6ba7b814-9dad-11d1-80b4-00c04fd430c8`; hyphens at 8, 13, 18 and 23.
pub fn is_uuid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    let hyphens_in_place = s
        .char_indices()
        .all(|(i, c)| matches!(i, 8 | 13 | 18 | 23) == (c == '-'));
    hyphens_in_place && uuid::Uuid::try_parse(s).is_ok()
}
