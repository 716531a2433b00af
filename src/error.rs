//! Fatal-error type carried through every stage.
//!
//! Exit-code convention, matched by the shell wrappers around the pipeline:
//!
//! - `2` — missing or malformed top-level input, unwritable output
//! - `3` — zero usable rows after filtering where a stage needs at least one
//! - `4` — internal failure (rendering, debug-bundle I/O)
//!
//! Per-galaxy problems are *not* `AppError`s; they become `SkipReason`
//! entries in the stage summary and never abort a run.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Exit code for the process; `main` forwards it verbatim.
    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let err = AppError::new(2, "Fleet summary not found.");
        assert_eq!(err.to_string(), "Fleet summary not found.");
        assert_eq!(err.exit_code(), 2);
    }
}
