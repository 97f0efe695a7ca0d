//! Pipeline error taxonomy.
//!
//! Everything below the presentation boundary propagates upward with `?`;
//! the server handler and the CLI are the only places these are caught.

use thiserror::Error;

use crate::crew::CrewError;
use crate::llm::LlmError;
use crate::tools::SearchError;

/// Top-level failure of a run request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// One or both required API keys could not be resolved from user
    /// input or the secret store. The pipeline is never invoked.
    #[error("missing credentials: {}", keys.join(", "))]
    MissingCredentials { keys: Vec<String> },

    /// The crew configuration is inconsistent.
    #[error("invalid crew: {0}")]
    InvalidCrew(#[from] CrewError),

    /// The search call made on behalf of the researcher failed.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// A language model call failed.
    #[error("language model call failed: {0}")]
    Llm(#[from] LlmError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_message_names_keys() {
        let err = PipelineError::MissingCredentials {
            keys: vec!["ANTHROPIC_API_KEY".to_string(), "SERPER_API_KEY".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("ANTHROPIC_API_KEY"));
        assert!(message.contains("SERPER_API_KEY"));
    }
}
