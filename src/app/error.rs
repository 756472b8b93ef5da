//! Errors surfacing at the process boundary

use crate::app::config::ConfigError;
use crate::core::error_handling::ContextualError;
use crate::plugin::api::{LifecycleError, PluginError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Startup(#[from] LifecycleError),

    #[error(transparent)]
    Execution(#[from] PluginError),

    #[error("A collector name is required: use --name <COLLECTOR>")]
    MissingCollectorName,
}

impl ContextualError for AppError {
    fn is_user_actionable(&self) -> bool {
        match self {
            AppError::Config(e) => e.is_user_actionable(),
            AppError::Startup(e) => e.is_user_actionable(),
            AppError::Execution(e) => e.is_user_actionable(),
            AppError::MissingCollectorName => true,
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Startup(e) => e.user_message(),
            AppError::Execution(e) => e.user_message(),
            AppError::MissingCollectorName => Some(self.to_string()),
        }
    }
}
