//! Error types for the automation engine.
//!
//! Build-time and lookup failures surface synchronously to the caller;
//! action failures during a triggered run are folded into that run's
//! execution record and never escape `trigger_workflows`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutomationError {
    /// A workflow definition failed validation before registration.
    #[error("invalid workflow definition: {0}")]
    Definition(String),

    /// Referenced workflow id is not registered.
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    /// Referenced template id does not exist in the catalog.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// An effect port returned an error while running an action.
    #[error("action '{action}' failed: {message}")]
    ActionFailed {
        action: &'static str,
        message: String,
    },

    /// A workflow export could not be produced or parsed.
    #[error("invalid workflow payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Result type alias for automation operations
pub type Result<T> = std::result::Result<T, AutomationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AutomationError::WorkflowNotFound("workflow_123".to_string());
        assert_eq!(err.to_string(), "workflow not found: workflow_123");

        let err = AutomationError::ActionFailed {
            action: "send_email",
            message: "smtp unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "action 'send_email' failed: smtp unavailable");
    }

    #[test]
    fn test_payload_error_from_serde() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AutomationError = parse.unwrap_err().into();
        assert!(matches!(err, AutomationError::Payload(_)));
    }
}
