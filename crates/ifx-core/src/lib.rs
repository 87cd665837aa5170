//! Shared primitives used across InfraFix client crates.

use core::fmt;

/// Result alias used across the workspace.
pub type PageResult<T> = Result<T, PageError>;

/// Top-level error type for the page runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub code: &'static str,
    pub message: String,
}

impl PageError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PageError {}

#[cfg(test)]
mod tests {
    use super::PageError;

    #[test]
    fn formats_code_and_message() {
        let error = PageError::new("store.read_failed", "disk unhappy");
        assert_eq!(error.to_string(), "store.read_failed: disk unhappy");
    }
}
