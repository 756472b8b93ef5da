//! Generic error handling utilities
//!
//! Provides unified error reporting across the configuration, plugin and
//! startup error types while keeping each domain's own error enum.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a message the user can act on (fix the config file,
/// correct a plugin name). When it returns `false`, `user_message()` should
/// return `None` and the caller falls back to its operation context.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message that should be shown to the user as-is
    ///
    /// Examples of user-actionable errors:
    /// - Missing or malformed configuration
    /// - Unknown plugin or instance names
    ///
    /// Examples of system errors:
    /// - IO failures
    /// - Network and token exchange failures
    fn is_user_actionable(&self) -> bool;

    /// Returns the user message if this is a user-actionable error
    fn user_message(&self) -> Option<String>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors are shown with their own message; system errors
/// show the operation context together with the underlying error. The full
/// debug representation is always available at debug level.
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("FATAL: {}", user_msg);
        }
        _ => {
            log::error!("FATAL: {} ({})", operation_context, error);
        }
    }
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct TestUserError {
        message: String,
    }

    impl fmt::Display for TestUserError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestUserError {}

    impl ContextualError for TestUserError {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<String> {
            Some(self.message.clone())
        }
    }

    #[derive(Debug)]
    struct TestSystemError {
        internal_details: String,
    }

    impl fmt::Display for TestSystemError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "System error: {}", self.internal_details)
        }
    }

    impl std::error::Error for TestSystemError {}

    impl ContextualError for TestSystemError {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_user_actionable_error_shows_specific_message() {
        let error = TestUserError {
            message: "Credential 'ga' was not found".to_string(),
        };

        assert!(error.is_user_actionable());
        assert_eq!(
            error.user_message().as_deref(),
            Some("Credential 'ga' was not found")
        );
        log_error_with_context(&error, "Loading collectors");
    }

    #[test]
    fn test_system_error_uses_generic_context() {
        let error = TestSystemError {
            internal_details: "Connection refused".to_string(),
        };

        assert!(!error.is_user_actionable());
        assert_eq!(error.user_message(), None);
        log_error_with_context(&error, "Token exchange");
    }
}
