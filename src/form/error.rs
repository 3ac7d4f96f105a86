use thiserror::Error;

/// Failure of a population pass. Any of these discards the in-progress record.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("{field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    /// The user cancelled or interrupted a prompt
    #[error("Prompt aborted: {0}")]
    PromptAborted(String),

    /// The prompt could not be shown or read, e.g. stdin is not a terminal
    #[error("Prompt failed: {0}")]
    PromptFailed(String),

    #[error("Failed to fetch choices for '{field}': {reason}")]
    RemoteFetchFailed { field: String, reason: String },

    #[error("No choices available for '{field}'")]
    NoCandidates { field: String },
}
